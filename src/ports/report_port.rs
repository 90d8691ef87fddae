//! Report generation port trait.

use crate::domain::error::QuantsignalError;
use crate::domain::pipeline::Analysis;

/// Port for handing an analysis to the presentation layer.
pub trait ReportPort {
    fn write(&self, analysis: &Analysis, output_path: &str) -> Result<(), QuantsignalError>;
}
