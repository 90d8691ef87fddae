//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with the SMA of its first
//! `signal` defined values
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is undefined for the first max(fast, slow) - 1 bars, the
//! signal and histogram for a further signal - 1 bars.

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Index of the first bar with a defined histogram.
pub fn histogram_warmup(fast: usize, slow: usize, signal: usize) -> usize {
    fast.max(slow).saturating_sub(1) + signal.saturating_sub(1)
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let n = closes.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdSeries {
            line: vec![None; n],
            signal: vec![None; n],
            histogram: vec![None; n],
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let mut signal: Vec<Option<f64>> = vec![None; n];
    let line_start = fast.max(slow) - 1;
    let seed_end = line_start + signal_period;

    if seed_end <= n {
        let k = 2.0 / (signal_period as f64 + 1.0);
        let seed: f64 = line[line_start..seed_end].iter().flatten().sum();
        let mut signal_ema = seed / signal_period as f64;
        signal[seed_end - 1] = Some(signal_ema);

        for i in seed_end..n {
            if let Some(value) = line[i] {
                signal_ema = value * k + signal_ema * (1.0 - k);
                signal[i] = Some(signal_ema);
            }
        }
    }

    let histogram = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_warmup_default() {
        let series = calculate_macd(&rising(40), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);

        let warmup = histogram_warmup(DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        assert_eq!(warmup, 33);
        for i in 0..warmup {
            assert!(series.histogram[i].is_none(), "Index {} should be undefined", i);
        }
        assert!(series.histogram[warmup].is_some());
        assert!(series.line[DEFAULT_SLOW - 1].is_some());
        assert!(series.line[DEFAULT_SLOW - 2].is_none());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let series = calculate_macd(&rising(40), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);

        for i in 0..40 {
            if let (Some(l), Some(s), Some(h)) = (series.line[i], series.signal[i], series.histogram[i]) {
                assert_abs_diff_eq!(h, l - s, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let closes = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let series = calculate_macd(&closes, 3, 5, 2);

        let ema_fast = calculate_ema(&closes, 3);
        let ema_slow = calculate_ema(&closes, 5);

        for i in 4..closes.len() {
            let expected = ema_fast[i].unwrap() - ema_slow[i].unwrap();
            assert_abs_diff_eq!(series.line[i].unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn macd_signal_seed_is_mean_of_line() {
        let closes = [10.0, 12.0, 11.0, 15.0, 14.0, 18.0, 17.0, 21.0];
        let series = calculate_macd(&closes, 2, 4, 3);

        // Line starts at index 3, signal seed covers indices 3..=5.
        let seed = (series.line[3].unwrap() + series.line[4].unwrap() + series.line[5].unwrap()) / 3.0;
        assert!(series.signal[4].is_none());
        assert_abs_diff_eq!(series.signal[5].unwrap(), seed, epsilon = 1e-12);

        let k = 2.0 / 4.0;
        let next = series.line[6].unwrap() * k + seed * (1.0 - k);
        assert_abs_diff_eq!(series.signal[6].unwrap(), next, epsilon = 1e-12);
    }

    #[test]
    fn macd_fast_longer_than_slow_still_aligned() {
        let series = calculate_macd(&rising(20), 6, 3, 2);
        assert!(series.line[4].is_none());
        assert!(series.line[5].is_some());
        assert!(series.histogram[5].is_none());
        assert!(series.histogram[6].is_some());
    }

    #[test]
    fn macd_empty_and_short() {
        let empty = calculate_macd(&[], 12, 26, 9);
        assert!(empty.line.is_empty());

        let short = calculate_macd(&rising(10), 12, 26, 9);
        assert_eq!(short.histogram.len(), 10);
        assert!(short.histogram.iter().all(Option::is_none));
    }

    #[test]
    fn macd_zero_period() {
        let closes = [100.0, 101.0, 102.0];
        assert!(calculate_macd(&closes, 0, 26, 9).line.iter().all(Option::is_none));
        assert!(calculate_macd(&closes, 12, 0, 9).signal.iter().all(Option::is_none));
        assert!(calculate_macd(&closes, 12, 26, 0).histogram.iter().all(Option::is_none));
    }

    #[test]
    fn macd_default_constants() {
        assert_eq!(DEFAULT_FAST, 12);
        assert_eq!(DEFAULT_SLOW, 26);
        assert_eq!(DEFAULT_SIGNAL, 9);
    }
}
