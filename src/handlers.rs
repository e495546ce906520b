// src/handlers.rs

pub mod dashboard;
pub mod records;
