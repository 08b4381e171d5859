//! Daily activity dashboard. Lays recorded app intervals out on a timeline, aggregates usage
//! per app and category, and turns the day into xp and levels.
//!

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod metrics;
pub mod tracking;
pub mod utils;
