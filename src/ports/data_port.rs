//! Market data access port trait.

use crate::domain::error::QuantsignalError;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_PERIOD: &str = "6mo";
pub const DEFAULT_INTERVAL: &str = "1d";

/// How much history to request and at what bar size, e.g. `6mo` of `1d` bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub period: String,
    pub interval: String,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }
}

pub trait DataPort {
    /// Returns a chronologically ordered series. An empty series means the
    /// provider has no data for the symbol.
    fn fetch_series(&self, symbol: &str, request: &FetchRequest) -> Result<PriceSeries, QuantsignalError>;
}
