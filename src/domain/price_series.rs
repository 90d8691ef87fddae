//! Chronologically ordered price series.
//!
//! Every indicator window is defined over bar order, so a [`PriceSeries`] can
//! only be built from bars whose timestamps strictly increase.

use crate::domain::error::QuantsignalError;
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, QuantsignalError> {
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(QuantsignalError::UnsortedSeries {
                    index: i + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort by timestamp and drop later duplicates before building the series.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Drops bars with non-tradable closes, returning the cleaned series and
    /// one `InvalidPrice` error per rejected bar.
    pub fn retain_valid_prices(self) -> (PriceSeries, Vec<QuantsignalError>) {
        let mut rejected = Vec::new();
        let mut kept = Vec::with_capacity(self.bars.len());

        for bar in self.bars {
            if bar.is_tradable_price() {
                kept.push(bar);
            } else {
                tracing::warn!(timestamp = %bar.timestamp, close = bar.close, "rejecting bar with invalid price");
                rejected.push(QuantsignalError::InvalidPrice {
                    timestamp: bar.timestamp,
                    close: bar.close,
                });
            }
        }

        (PriceSeries { bars: kept }, rejected)
    }
}
