//! Core domain types and the pairs-trading pipeline.

pub mod price;
pub mod pair_data;
pub mod stats;
pub mod hedge_ratio;
pub mod spread;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod pipeline;
pub mod config_validation;
pub mod error;
