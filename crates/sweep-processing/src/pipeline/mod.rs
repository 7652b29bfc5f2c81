//! Conversion pipeline.
//!
//! Each file flows `parse -> (clean)* -> serialize`. The functions here are
//! stateless; the caller decides which cleaning steps run and in what order.
//!
//! ```rust,ignore
//! use sweep_processing::config::TargetFormat;
//! use sweep_processing::pipeline;
//! use sweep_processing::types::ConversionRequest;
//!
//! let table = pipeline::parse(bytes, ".csv")?;
//! let (table, _) = pipeline::remove_duplicates(table)?;
//! let request = ConversionRequest::new("data.csv", ".csv", TargetFormat::Excel);
//! let artifact = pipeline::convert(&table, request)?;
//! ```

use crate::cleaner::DataCleaner;
use crate::config::TargetFormat;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::table::Table;
use crate::types::{ConversionRequest, DuplicateReport, FillOutcome, OutputArtifact};
use tracing::{debug, info};

pub use crate::reader::parse;
pub use crate::writer::serialize;

/// Remove exact duplicate rows. See [`DataCleaner::remove_duplicates`].
pub fn remove_duplicates(table: Table) -> Result<(Table, DuplicateReport)> {
    DataCleaner::remove_duplicates(table)
}

/// Mean-fill numeric columns. See [`StatisticalImputer::fill_missing_numeric`].
pub fn fill_missing_numeric(table: Table) -> Result<(Table, FillOutcome)> {
    StatisticalImputer::fill_missing_numeric(table)
}

/// The first `n` rows of a table.
pub fn preview(table: &Table, n: usize) -> Table {
    table.head(n)
}

/// Derive the download name for a converted file.
///
/// Only a trailing `original_ext` (ASCII case-insensitive) is replaced, so
/// `csv_data.csv` becomes `csv_data.xlsx`. When the name does not end with
/// the extension the target extension is appended.
pub fn derive_output_name(original_name: &str, original_ext: &str, target: TargetFormat) -> String {
    let stem_len = original_name.len().saturating_sub(original_ext.len());
    let suffix_matches = !original_ext.is_empty()
        && original_name.len() >= original_ext.len()
        && original_name.is_char_boundary(stem_len)
        && original_name[stem_len..].eq_ignore_ascii_case(original_ext);

    let stem = if suffix_matches {
        &original_name[..stem_len]
    } else {
        original_name
    };
    format!("{}{}", stem, target.extension())
}

/// Serialize a table per `request` and package it for download.
pub fn convert(table: &Table, request: ConversionRequest) -> Result<OutputArtifact> {
    info!(
        "Converting {} rows x {} columns to {}",
        table.height(),
        table.width(),
        request.target_format
    );

    let bytes = serialize(table, request.target_format)
        .context(format!("Failed to write '{}'", request.output_name))?;
    debug!("Serialized '{}': {} bytes", request.output_name, bytes.len());

    Ok(OutputArtifact {
        filename: request.output_name,
        mime_type: request.mime_type,
        bytes,
    })
}
