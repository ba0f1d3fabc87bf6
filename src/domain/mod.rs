//! Core domain types and logic.

pub mod universe;
pub mod weights;
pub mod price_table;
pub mod returns;
pub mod allocation;
pub mod metrics;
pub mod backtest;
pub mod adjustment;
pub mod profile;
pub mod config;
pub mod error;
