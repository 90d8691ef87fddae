//! Headline source for the mood score.

use crate::domain::error::QuantsignalError;
use crate::domain::sentiment::mood_score;

pub trait NewsPort {
    fn headlines(&self, symbol: &str) -> Result<Vec<String>, QuantsignalError>;
}

/// Mood score for a symbol; any provider failure reads as neutral.
pub fn symbol_mood(port: &dyn NewsPort, symbol: &str) -> f64 {
    match port.headlines(symbol) {
        Ok(headlines) => mood_score(&headlines),
        Err(e) => {
            tracing::warn!(%symbol, "headlines unavailable: {e}");
            0.0
        }
    }
}
