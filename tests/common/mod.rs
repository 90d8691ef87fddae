#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use quantsignal::domain::error::QuantsignalError;
pub use quantsignal::domain::ohlcv::PriceBar;
use quantsignal::domain::price_series::PriceSeries;
use quantsignal::ports::data_port::{DataPort, FetchRequest};
use quantsignal::ports::news_port::NewsPort;
use quantsignal::ports::notify_port::NotifyPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str, _request: &FetchRequest) -> Result<PriceSeries, QuantsignalError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantsignalError::DataSource {
                reason: reason.clone(),
            });
        }
        PriceSeries::new(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockNotifyPort {
    pub sent: RefCell<Vec<String>>,
    pub fail: bool,
}

impl MockNotifyPort {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }
}

impl NotifyPort for MockNotifyPort {
    fn send(&self, message: &str) -> Result<(), QuantsignalError> {
        if self.fail {
            return Err(QuantsignalError::Notification {
                reason: "webhook unreachable".into(),
            });
        }
        self.sent.borrow_mut().push(message.to_string());
        Ok(())
    }
}

pub struct MockNewsPort {
    pub headlines: HashMap<String, Vec<String>>,
}

impl NewsPort for MockNewsPort {
    fn headlines(&self, symbol: &str) -> Result<Vec<String>, QuantsignalError> {
        self.headlines
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuantsignalError::DataSource {
                reason: format!("no feed for {symbol}"),
            })
    }
}

pub fn ts(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    bar_at(ts(date), close)
}

pub fn bar_at(timestamp: NaiveDateTime, close: f64) -> PriceBar {
    PriceBar {
        timestamp,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000.0,
    }
}

/// Daily bars starting 2024-01-01, one per close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = ts("2024-01-01");
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| bar_at(start + Duration::days(i as i64), close))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(bars_from_closes(closes)).unwrap()
}

/// Oscillating closes with a slow drift; swings wide enough to touch the bands.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 12.0 * (t * 0.3).sin() + 6.0 * (t * 0.11).cos() + 0.05 * t
        })
        .collect()
}

/// A long slide that stalls, then a two-bar flush below the lower band
/// while the MACD histogram is still positive from the stall, then a slow
/// recovery. With default indicators the flush bar (index 75) is a
/// confirmation BUY.
pub fn capitulation_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 150.0 - 2.0 * i as f64).collect();
    closes.extend(std::iter::repeat(32.0).take(14));
    closes.extend([29.0, 26.0]);
    closes.extend((1..=10).map(|i| 26.0 + 0.5 * i as f64));
    closes
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
