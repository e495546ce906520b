// src/services.rs

pub mod classification;
pub mod ledger_service;
pub mod report;
pub mod view_state;
