//! Input readers.
//!
//! This module turns uploaded bytes into a [`Table`]:
//! - CSV via the Polars CSV reader with delimiter detection
//! - XLSX via calamine, first worksheet only

mod csv;
mod xlsx;

pub use csv::read_csv;
pub use xlsx::read_xlsx;

use crate::error::{Result, SweepError};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Resolve a file extension (`.csv`, `csv`, `.XLSX`, ...).
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(SweepError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

/// Parse raw bytes according to their file extension.
pub fn parse(bytes: &[u8], extension: &str) -> Result<Table> {
    match SourceFormat::from_extension(extension)? {
        SourceFormat::Csv => read_csv(bytes),
        SourceFormat::Xlsx => read_xlsx(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceFormat::from_extension(".csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_extension("csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_extension(".XLSX").unwrap(), SourceFormat::Xlsx);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SourceFormat::from_extension(".txt").unwrap_err();
        assert!(err.is_unsupported_format());
        assert_eq!(err.to_string(), "Unsupported file type: .txt");
    }

    #[test]
    fn test_parse_rejects_unknown_extension_without_reading() {
        let err = parse(b"a,b\n1,2\n", ".xls").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }
}
