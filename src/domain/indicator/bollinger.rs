//! Bollinger bands around a simple moving average.
//!
//! The middle band is the SMA over `period` closes; the outer bands sit
//! `multiplier` population standard deviations above and below it. All three
//! bands share the SMA's warm-up.

use crate::domain::indicator::{calculate_sma, calculate_stddev};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());

    for (mid, sd) in middle.iter().zip(stddev.iter()) {
        match (mid, sd) {
            (Some(mid), Some(sd)) => {
                upper.push(Some(mid + multiplier * sd));
                lower.push(Some(mid - multiplier * sd));
            }
            _ => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}
