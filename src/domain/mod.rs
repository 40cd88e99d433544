//! Core domain types and logic.

pub mod backtest;
pub mod company;
pub mod config_validation;
pub mod error;
pub mod hit_rate;
pub mod pe;
pub mod peer;
pub mod store;
pub mod universe;
pub mod valuation;
