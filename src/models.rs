// src/models.rs

pub mod dashboard;
pub mod ledger;
