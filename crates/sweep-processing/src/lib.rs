//! Tabular File Conversion Library
//!
//! Converts uploaded CSV and XLSX files into CSV or XLSX, optionally cleaning
//! them on the way, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Reading**: CSV with delimiter detection, XLSX (first worksheet) via calamine
//! - **Cleaning**: Exact duplicate row removal, mean imputation of numeric columns
//! - **Writing**: CSV, or a single-sheet XLSX workbook
//! - **Batch Sessions**: Per-file reports and user messages, with unsupported or
//!   broken files skipped without stopping the batch
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sweep_processing::{ConversionOptions, TargetFormat, UploadedFile};
//! use sweep_processing::session::{process_batch, DirectorySink};
//!
//! let files = vec![UploadedFile::new("sales.csv", std::fs::read("sales.csv")?)];
//!
//! let options = ConversionOptions::builder()
//!     .clean(true)
//!     .remove_duplicates(true)
//!     .fill_missing(true)
//!     .target_format(TargetFormat::Excel)
//!     .build()?;
//!
//! let mut sink = DirectorySink::new("./outputs");
//! let report = process_batch(&files, &options, &mut sink);
//!
//! for file in &report.files {
//!     for message in &file.messages {
//!         println!("[{}] {}", message.level, message.text);
//!     }
//! }
//! ```
//!
//! # Single Tables
//!
//! The [`pipeline`] functions work on one table at a time:
//!
//! ```rust,ignore
//! use sweep_processing::pipeline;
//!
//! let table = pipeline::parse(&bytes, ".xlsx")?;
//! let (table, outcome) = pipeline::fill_missing_numeric(table)?;
//! let csv_bytes = pipeline::serialize(&table, TargetFormat::Csv)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod reader;
pub mod session;
pub mod table;
pub mod types;
pub mod utils;
pub mod writer;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    CleaningStep, ConfigValidationError, ConversionOptions, ConversionOptionsBuilder,
    TargetFormat,
};
pub use error::{Result as SweepResult, ResultExt, SweepError};
pub use imputers::StatisticalImputer;
pub use reader::SourceFormat;
pub use session::{
    BatchProcessor, BatchProcessorBuilder, ClosureMessageReporter, DirectorySink, DownloadSink,
    MemorySink, MessageReporter, process_batch,
};
pub use table::{Cell, ColumnKind, Table};
pub use types::{
    BatchReport, ConversionRequest, DuplicateReport, FileOutcome, FileReport, FillOutcome,
    FillReport, FilledColumn, MessageLevel, OutputArtifact, TablePreview, UploadedFile,
    UserMessage,
};
