//! Custom error types for the conversion pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for
//! parsing, cleaning, serialization and delivery failures.
//!
//! Errors are serializable so a front end can display them as
//! `{ code, message }` pairs next to the file that produced them.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the conversion pipeline.
#[derive(Error, Debug)]
pub enum SweepError {
    /// File extension is not one of the supported input formats.
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    /// The spreadsheet contains no worksheet to read.
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// The download sink rejected an artifact.
    #[error("Failed to deliver '{filename}': {reason}")]
    Delivery { filename: String, reason: String },

    /// Internal invariant violated.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Spreadsheet parsing error.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// ZIP container error while packaging a spreadsheet.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML writer error while packaging a spreadsheet.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SweepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::EmptyWorkbook => "EMPTY_WORKBOOK",
            Self::Delivery { .. } => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Zip(_) => "ZIP_ERROR",
            Self::Xml(_) => "XML_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an unsupported extension.
    pub fn is_unsupported_format(&self) -> bool {
        match self {
            Self::UnsupportedFormat { .. } => true,
            Self::WithContext { source, .. } => source.is_unsupported_format(),
            _ => false,
        }
    }

    /// Check if this error is recoverable, i.e. the file can simply be
    /// skipped with a message and the batch continues unchanged.
    pub fn is_recoverable(&self) -> bool {
        self.is_unsupported_format()
    }
}

impl Serialize for SweepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SweepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SweepError::Polars(e).with_context(context))
    }
}
