//! CSV file data adapter.
//!
//! One file per symbol, `{symbol}.csv`, with a header row and the columns
//! `timestamp,open,high,low,close,volume`. Timestamps are either dates
//! (`YYYY-MM-DD`) or date-times (`YYYY-MM-DD HH:MM:SS`).

use crate::domain::error::QuantsignalError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::{DataPort, FetchRequest};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    pub fn list_symbols(&self) -> Result<Vec<String>, QuantsignalError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| QuantsignalError::DataSource {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| QuantsignalError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Start of a lookback window such as `5d`, `1wk`, `6mo`, `2y`, `ytd` or
/// `max`, counted back from `end`. `None` means no lower bound.
pub fn period_start(period: &str, end: NaiveDateTime) -> Result<Option<NaiveDateTime>, QuantsignalError> {
    let period = period.trim().to_lowercase();
    let invalid = || QuantsignalError::ConfigInvalid {
        section: "data".into(),
        key: "period".into(),
        reason: format!("unrecognised period '{}'", period),
    };

    if period == "max" {
        return Ok(None);
    }
    if period == "ytd" {
        return Ok(NaiveDate::from_ymd_opt(end.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)));
    }

    let split = period.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (count, unit) = period.split_at(split);
    let count: u32 = count.parse().map_err(|_| invalid())?;

    let start = match unit {
        "d" => end.checked_sub_signed(Duration::days(count as i64)),
        "wk" => end.checked_sub_signed(Duration::weeks(count as i64)),
        "mo" => end.checked_sub_months(Months::new(count)),
        "y" => end.checked_sub_months(Months::new(count * 12)),
        _ => return Err(invalid()),
    };
    Ok(start)
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, QuantsignalError> {
    record
        .get(index)
        .ok_or_else(|| QuantsignalError::DataSource {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| QuantsignalError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str, request: &FetchRequest) -> Result<PriceSeries, QuantsignalError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| QuantsignalError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| QuantsignalError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(0).ok_or_else(|| QuantsignalError::DataSource {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| QuantsignalError::DataSource {
                reason: format!("invalid timestamp '{}'", raw_ts),
            })?;

            bars.push(PriceBar {
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        let series = PriceSeries::from_unsorted(bars);
        let Some(last) = series.last().map(|b| b.timestamp) else {
            return Ok(series);
        };

        match period_start(&request.period, last)? {
            Some(start) => {
                let kept: Vec<PriceBar> = series
                    .bars()
                    .iter()
                    .filter(|b| b.timestamp >= start)
                    .cloned()
                    .collect();
                PriceSeries::new(kept)
            }
            None => Ok(series),
        }
    }
}
