//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for quantsignal.
#[derive(Debug, thiserror::Error)]
pub enum QuantsignalError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid price {close} at {timestamp}")]
    InvalidPrice {
        timestamp: NaiveDateTime,
        close: f64,
    },

    #[error("misaligned series: {reason}")]
    MisalignedSeries { reason: String },

    #[error("series not strictly increasing at bar {index} ({timestamp})")]
    UnsortedSeries {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("notification failed: {reason}")]
    Notification { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantsignalError {
    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            QuantsignalError::Io(_) => 1,
            QuantsignalError::ConfigParse { .. }
            | QuantsignalError::ConfigMissing { .. }
            | QuantsignalError::ConfigInvalid { .. } => 2,
            QuantsignalError::DataSource { .. } | QuantsignalError::Notification { .. } => 3,
            QuantsignalError::InvalidPrice { .. }
            | QuantsignalError::MisalignedSeries { .. }
            | QuantsignalError::UnsortedSeries { .. } => 4,
            QuantsignalError::NoData { .. } | QuantsignalError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&QuantsignalError> for std::process::ExitCode {
    fn from(err: &QuantsignalError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
