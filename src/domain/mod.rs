//! Core domain types and logic.

pub mod ohlcv;
pub mod price_series;
pub mod indicator;
pub mod frame;
pub mod signal;
pub mod simulator;
pub mod metrics;
pub mod strategy;
pub mod pipeline;
pub mod sentiment;
pub mod config_validation;
pub mod error;
