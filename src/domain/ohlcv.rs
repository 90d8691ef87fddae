//! OHLCV bar representation.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// A bar can be traded on only if its close is a finite, strictly positive price.
    pub fn is_tradable_price(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar(close: f64) -> PriceBar {
        PriceBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close,
            volume: 50_000.0,
        }
    }

    #[test]
    fn positive_close_is_tradable() {
        assert!(sample_bar(105.0).is_tradable_price());
        assert!(sample_bar(0.0001).is_tradable_price());
    }

    #[test]
    fn zero_negative_and_nan_closes_are_not_tradable() {
        assert!(!sample_bar(0.0).is_tradable_price());
        assert!(!sample_bar(-3.0).is_tradable_price());
        assert!(!sample_bar(f64::NAN).is_tradable_price());
        assert!(!sample_bar(f64::INFINITY).is_tradable_price());
    }
}
