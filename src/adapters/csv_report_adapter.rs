//! CSV report adapter: one row per bar with its indicators and signal.

use crate::domain::error::QuantsignalError;
use crate::domain::frame::COLUMNS;
use crate::domain::pipeline::Analysis;
use crate::domain::signal::Signal;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use std::collections::HashMap;

pub struct CsvReportAdapter;

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, analysis: &Analysis, output_path: &str) -> Result<(), QuantsignalError> {
        let csv_err = |e: csv::Error| QuantsignalError::Io(std::io::Error::other(e));
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_err)?;

        let mut header = vec!["timestamp", "open", "high", "low", "close", "volume"];
        header.extend(COLUMNS);
        header.push("signal");
        wtr.write_record(&header).map_err(csv_err)?;

        let signals: HashMap<NaiveDateTime, Signal> = analysis
            .signals
            .iter()
            .map(|s| (s.timestamp, s.signal))
            .collect();

        for row in &analysis.frame.rows {
            let bar = &row.bar;
            let mut record = vec![
                bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            record.extend(row.values.as_array().into_iter().map(cell));
            record.push(
                signals
                    .get(&bar.timestamp)
                    .map(|s| s.as_i8().to_string())
                    .unwrap_or_default(),
            );
            wtr.write_record(&record).map_err(csv_err)?;
        }

        wtr.flush()?;
        tracing::info!(symbol = %analysis.symbol, path = %output_path, rows = analysis.frame.len(), "report written");
        Ok(())
    }
}
