//! Batch driver for uploaded files.
//!
//! Files are processed one after another and independently: a file that
//! cannot be read or written gets an error message and a `Skipped` or
//! `Failed` outcome, and the batch moves on to the next one.
//!
//! # Example
//!
//! ```rust,ignore
//! use sweep_processing::session::{BatchProcessor, MemorySink};
//!
//! let processor = BatchProcessor::builder()
//!     .options(options)
//!     .on_message(|file, message| println!("[{}] {}: {}", message.level, file, message.text))
//!     .build()?;
//!
//! let mut sink = MemorySink::new();
//! let report = processor.process(&files, &mut sink);
//! ```

mod sink;

pub use sink::{DirectorySink, DownloadSink, MemorySink};

use crate::config::{CleaningStep, ConfigValidationError, ConversionOptions};
use crate::error::Result;
use crate::pipeline;
use crate::table::Table;
use crate::types::{
    BatchReport, ConversionRequest, FileOutcome, FileReport, FillOutcome, UploadedFile,
    UserMessage,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DUPLICATES_REMOVED: &str = "Duplicates removed!";
pub const MISSING_VALUES_FILLED: &str = "Missing values filled!";
pub const NO_NUMERIC_COLUMNS: &str = "No numeric columns found!";

/// Receives user-facing messages as soon as they are produced.
pub trait MessageReporter: Send + Sync {
    fn report(&self, file_name: &str, message: &UserMessage);
}

/// Wrapper that implements [`MessageReporter`] using a closure.
pub struct ClosureMessageReporter<F>
where
    F: Fn(&str, &UserMessage) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureMessageReporter<F>
where
    F: Fn(&str, &UserMessage) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> MessageReporter for ClosureMessageReporter<F>
where
    F: Fn(&str, &UserMessage) + Send + Sync,
{
    fn report(&self, file_name: &str, message: &UserMessage) {
        (self.callback)(file_name, message);
    }
}

/// Run a batch with `options`, delivering artifacts to `sink`.
pub fn process_batch(
    files: &[UploadedFile],
    options: &ConversionOptions,
    sink: &mut dyn DownloadSink,
) -> BatchReport {
    BatchProcessor {
        options: options.clone(),
        reporter: None,
    }
    .process(files, sink)
}

/// Converts a batch of uploaded files with one set of options.
pub struct BatchProcessor {
    options: ConversionOptions,
    reporter: Option<Arc<dyn MessageReporter>>,
}

static_assertions::assert_impl_all!(BatchProcessor: Send, Sync);

impl BatchProcessor {
    pub fn builder() -> BatchProcessorBuilder {
        BatchProcessorBuilder::default()
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Process every file in order and collect one report per file.
    pub fn process(&self, files: &[UploadedFile], sink: &mut dyn DownloadSink) -> BatchReport {
        info!(
            "Processing {} file(s) -> {}",
            files.len(),
            self.options.target_format
        );

        let report = BatchReport {
            files: files.iter().map(|file| self.process_file(file, sink)).collect(),
        };

        info!(
            "Batch complete: {}/{} file(s) converted",
            report.converted_count(),
            report.files.len()
        );
        report
    }

    fn process_file(&self, file: &UploadedFile, sink: &mut dyn DownloadSink) -> FileReport {
        let extension = file.extension();
        info!(
            "Processing '{}' ({:.2} KB, type '{}')",
            file.name(),
            file.size_kb(),
            extension
        );

        let mut report = FileReport {
            file_name: file.name().to_string(),
            extension: extension.clone(),
            size_kb: file.size_kb(),
            shape: None,
            preview: None,
            duplicates: None,
            fill: None,
            messages: Vec::new(),
            outcome: FileOutcome::Skipped {
                reason: String::new(),
            },
        };

        let outcome = match self.run(file, &extension, &mut report, sink) {
            Ok(outcome) => outcome,
            Err(err) if err.is_recoverable() => {
                let text = format!("Unsupported file type: {extension}");
                warn!("Skipping '{}': {}", file.name(), text);
                self.push(&mut report, UserMessage::error(text.clone()));
                FileOutcome::Skipped { reason: text }
            }
            Err(err) => {
                warn!("Failed to process '{}': {}", file.name(), err);
                let reason = err.to_string();
                self.push(
                    &mut report,
                    UserMessage::error(format!("Could not process '{}': {}", file.name(), reason)),
                );
                FileOutcome::Failed {
                    code: err.error_code().to_string(),
                    reason,
                }
            }
        };

        report.outcome = outcome;
        report
    }

    fn run(
        &self,
        file: &UploadedFile,
        extension: &str,
        report: &mut FileReport,
        sink: &mut dyn DownloadSink,
    ) -> Result<FileOutcome> {
        let mut table = pipeline::parse(file.bytes(), extension)?;
        report.shape = Some(table.shape());
        report.preview = Some(table.preview(self.options.preview_rows)?);
        debug!("Parsed '{}': {:?}", file.name(), table.shape());

        for step in self.options.effective_steps() {
            table = self.apply_step(*step, table, report)?;
        }

        let request = ConversionRequest::new(file.name(), extension, self.options.target_format);
        let artifact = pipeline::convert(&table, request)?;
        let outcome = FileOutcome::Converted {
            filename: artifact.filename.clone(),
            mime_type: artifact.mime_type.clone(),
            bytes: artifact.len(),
        };

        sink.deliver(artifact)?;
        Ok(outcome)
    }

    fn apply_step(&self, step: CleaningStep, table: Table, report: &mut FileReport) -> Result<Table> {
        match step {
            CleaningStep::RemoveDuplicates => {
                let (table, duplicates) = pipeline::remove_duplicates(table)?;
                report.duplicates = Some(duplicates);
                self.push(report, UserMessage::success(DUPLICATES_REMOVED));
                Ok(table)
            }
            CleaningStep::FillMissing => {
                let (table, outcome) = pipeline::fill_missing_numeric(table)?;
                match &outcome {
                    FillOutcome::NoNumericColumns => {
                        self.push(report, UserMessage::warning(NO_NUMERIC_COLUMNS));
                    }
                    FillOutcome::Filled(fill) => {
                        self.push(report, UserMessage::success(MISSING_VALUES_FILLED));
                        if !fill.skipped_empty_columns.is_empty() {
                            let text = skipped_columns_message(&fill.skipped_empty_columns);
                            warn!("'{}': {}", report.file_name, text);
                            self.push(report, UserMessage::warning(text));
                        }
                    }
                }
                report.fill = Some(outcome);
                Ok(table)
            }
        }
    }

    fn push(&self, report: &mut FileReport, message: UserMessage) {
        if let Some(reporter) = &self.reporter {
            reporter.report(&report.file_name, &message);
        }
        report.messages.push(message);
    }
}

/// Warning for columns the mean fill left alone because every cell is missing.
pub fn skipped_columns_message(columns: &[String]) -> String {
    format!(
        "{} Left empty column(s) unchanged: {}",
        NO_NUMERIC_COLUMNS,
        columns.join(", ")
    )
}

/// Builder for [`BatchProcessor`].
#[derive(Default)]
pub struct BatchProcessorBuilder {
    options: Option<ConversionOptions>,
    reporter: Option<Arc<dyn MessageReporter>>,
}

impl BatchProcessorBuilder {
    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn MessageReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Set a message callback closure.
    pub fn on_message<F>(self, callback: F) -> Self
    where
        F: Fn(&str, &UserMessage) + Send + Sync + 'static,
    {
        self.reporter(Arc::new(ClosureMessageReporter::new(callback)))
    }

    /// Build the processor. Options are validated first.
    pub fn build(self) -> std::result::Result<BatchProcessor, ConfigValidationError> {
        let options = self.options.unwrap_or_default();
        options.validate()?;

        Ok(BatchProcessor {
            options,
            reporter: self.reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetFormat;
    use crate::error::SweepError;
    use crate::table::Cell;
    use crate::types::{MessageLevel, OutputArtifact};
    use std::sync::Mutex;

    struct RejectingSink;

    impl DownloadSink for RejectingSink {
        fn deliver(&mut self, artifact: OutputArtifact) -> Result<()> {
            Err(SweepError::Delivery {
                filename: artifact.filename,
                reason: "sink closed".to_string(),
            })
        }
    }

    fn csv(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    fn cleaning_options(format: TargetFormat) -> ConversionOptions {
        ConversionOptions::builder()
            .clean(true)
            .remove_duplicates(true)
            .fill_missing(true)
            .target_format(format)
            .build()
            .unwrap()
    }

    #[test]
    fn test_unsupported_file_is_skipped_and_batch_continues() {
        let files = vec![
            csv("report.txt", "hello"),
            csv("data.csv", "a,b\n1,2\n"),
        ];
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &ConversionOptions::default(), &mut sink);

        assert_eq!(report.files.len(), 2);
        assert_eq!(
            report.files[0].messages,
            vec![UserMessage::error("Unsupported file type: .txt")]
        );
        assert!(matches!(report.files[0].outcome, FileOutcome::Skipped { .. }));
        assert!(report.files[1].outcome.is_converted());
        assert_eq!(sink.artifacts().len(), 1);
        assert_eq!(sink.artifacts()[0].filename, "data.csv");
    }

    #[test]
    fn test_cleaning_messages_in_step_order() {
        let files = vec![csv("data.csv", "a,b\n1,\n1,\n,4\n3,6\n")];
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &cleaning_options(TargetFormat::Csv), &mut sink);
        let file = &report.files[0];

        let texts: Vec<_> = file.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![DUPLICATES_REMOVED, MISSING_VALUES_FILLED]);
        assert_eq!(file.duplicates.unwrap().rows_removed, 1);
        assert_eq!(file.shape, Some((4, 2)));

        let written = pipeline::parse(&sink.artifacts()[0].bytes, ".csv").unwrap();
        assert_eq!(
            written.rows().unwrap(),
            vec![
                vec![Cell::Number(1.0), Cell::Number(5.0)],
                vec![Cell::Number(2.0), Cell::Number(4.0)],
                vec![Cell::Number(3.0), Cell::Number(6.0)],
            ]
        );
    }

    #[test]
    fn test_no_numeric_columns_is_a_warning() {
        let files = vec![csv("names.csv", "name\nanna\n\n")];
        let options = ConversionOptions::builder()
            .clean(true)
            .fill_missing(true)
            .build()
            .unwrap();
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &options, &mut sink);
        let file = &report.files[0];

        assert_eq!(file.messages, vec![UserMessage::warning(NO_NUMERIC_COLUMNS)]);
        assert_eq!(file.fill, Some(FillOutcome::NoNumericColumns));
        assert!(file.outcome.is_converted());
    }

    #[test]
    fn test_all_missing_column_gets_a_warning() {
        let files = vec![csv("sparse.csv", "a,b\n1,\n,\n3,\n")];
        let options = ConversionOptions::builder()
            .clean(true)
            .fill_missing(true)
            .build()
            .unwrap();
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &options, &mut sink);
        let file = &report.files[0];

        assert_eq!(
            file.messages,
            vec![
                UserMessage::success(MISSING_VALUES_FILLED),
                UserMessage::warning("No numeric columns found! Left empty column(s) unchanged: b"),
            ]
        );
        match file.fill.as_ref().unwrap() {
            FillOutcome::Filled(fill) => assert_eq!(fill.skipped_empty_columns, vec!["b"]),
            other => panic!("unexpected fill outcome: {other:?}"),
        }
        assert!(file.outcome.is_converted());
    }

    #[test]
    fn test_cleaning_disabled_runs_no_steps() {
        let options = ConversionOptions {
            clean_enabled: false,
            cleaning_steps: vec![CleaningStep::RemoveDuplicates],
            ..ConversionOptions::default()
        };
        let files = vec![csv("dup.csv", "a\n1\n1\n")];
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &options, &mut sink);

        assert!(report.files[0].messages.is_empty());
        assert!(report.files[0].duplicates.is_none());
        assert_eq!(sink.artifacts()[0].bytes, b"a\n1\n1\n".to_vec());
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let files = vec![UploadedFile::new("broken.xlsx", b"not a zip".to_vec())];
        let mut sink = MemorySink::new();

        let report = process_batch(&files, &ConversionOptions::default(), &mut sink);
        let file = &report.files[0];

        assert!(matches!(file.outcome, FileOutcome::Failed { .. }));
        assert_eq!(file.messages.len(), 1);
        assert_eq!(file.messages[0].level, MessageLevel::Error);
        assert!(report.all_failed());
        assert!(sink.artifacts().is_empty());
    }

    #[test]
    fn test_sink_failure_fails_the_file() {
        let files = vec![csv("data.csv", "a\n1\n")];

        let report = process_batch(&files, &ConversionOptions::default(), &mut RejectingSink);

        match &report.files[0].outcome {
            FileOutcome::Failed { code, .. } => assert_eq!(code, "DELIVERY_FAILED"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_excel_output_name() {
        let files = vec![csv("csv_data.csv", "a\n1\n")];
        let options = ConversionOptions::builder()
            .target_format(TargetFormat::Excel)
            .build()
            .unwrap();
        let mut sink = MemorySink::new();

        process_batch(&files, &options, &mut sink);

        assert_eq!(sink.artifacts()[0].filename, "csv_data.xlsx");
    }

    #[test]
    fn test_on_message_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let processor = BatchProcessor::builder()
            .on_message(move |file, message| {
                seen_clone
                    .lock()
                    .unwrap()
                    .push(format!("{}: {}", file, message.text));
            })
            .build()
            .unwrap();

        let mut sink = MemorySink::new();
        processor.process(&[csv("notes.md", "# hi")], &mut sink);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["notes.md: Unsupported file type: .md".to_string()]
        );
    }

    #[test]
    fn test_builder_rejects_invalid_options() {
        let options = ConversionOptions {
            preview_rows: 0,
            ..ConversionOptions::default()
        };
        assert!(BatchProcessor::builder().options(options).build().is_err());
    }
}
