//! CLI entry point for the tabular file converter.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use sweep_processing::{
    BatchProcessor, BatchReport, ConversionOptions, DirectorySink, FileOutcome, FileReport,
    SweepError, TablePreview, TargetFormat, UploadedFile, UserMessage,
};
use tracing::{debug, error, info, warn};

/// CLI-compatible target format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTargetFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook (.xlsx)
    Excel,
}

impl From<CliTargetFormat> for TargetFormat {
    fn from(cli: CliTargetFormat) -> Self {
        match cli {
            CliTargetFormat::Csv => TargetFormat::Csv,
            CliTargetFormat::Excel => TargetFormat::Excel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sweep",
    version,
    about = "Convert and clean CSV / Excel files",
    long_about = "Converts CSV and XLSX files to CSV or Excel, optionally removing duplicate rows \
                  and filling missing numeric values with the column mean.\n\n\
                  EXAMPLES:\n  \
                  # Convert a CSV file to Excel\n  \
                  sweep sales.csv --to excel\n\n  \
                  # Clean several files and write them to out/\n  \
                  sweep a.csv b.xlsx --to csv --clean --remove-duplicates --fill-missing -o out/\n\n  \
                  # Machine-readable report\n  \
                  sweep data.csv --json"
)]
struct Args {
    /// Files to convert (.csv or .xlsx)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Format to convert every file to
    #[arg(long = "to", value_enum, default_value = "csv")]
    to: CliTargetFormat,

    /// Enable cleaning; required by the cleaning step flags
    #[arg(long)]
    clean: bool,

    /// Remove rows that exactly repeat an earlier row
    #[arg(long, requires = "clean")]
    remove_duplicates: bool,

    /// Fill missing numeric values with the column mean
    #[arg(long, requires = "clean")]
    fill_missing: bool,

    /// Output directory for converted files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Number of rows shown in each preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final summary)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON batch report to stdout instead of a summary
    ///
    /// Disables all progress logs; only the report is written.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // stdout must only carry the JSON report
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let options = ConversionOptions::builder()
        .clean(args.clean)
        .remove_duplicates(args.remove_duplicates)
        .fill_missing(args.fill_missing)
        .target_format(args.to.into())
        .preview_rows(args.preview_rows)
        .build()?;
    debug!("Options: {:?}", options);

    let processor = BatchProcessor::builder().options(options).build()?;
    let mut sink = DirectorySink::new(&args.output);

    // Files are read one at a time so an unreadable path only fails itself.
    let mut report = BatchReport::default();
    for path in &args.files {
        match read_upload(path) {
            Ok(file) => report
                .files
                .extend(processor.process(std::slice::from_ref(&file), &mut sink).files),
            Err(err) => {
                warn!("{}", err);
                report.files.push(unreadable_file_report(path, &err));
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_summary(&report, &args);
    }

    if report.all_failed() {
        error!("None of the {} file(s) could be converted", report.files.len());
        return Err(anyhow!("No file could be converted"));
    }
    Ok(())
}

fn read_upload(path: &Path) -> std::result::Result<UploadedFile, SweepError> {
    info!("Loading file from: {}", path.display());
    let bytes = std::fs::read(path)
        .map_err(|e| SweepError::from(e).with_context(format!("Failed to read {}", path.display())))?;
    Ok(UploadedFile::new(display_name(path), bytes))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn unreadable_file_report(path: &Path, err: &SweepError) -> FileReport {
    let file = UploadedFile::new(display_name(path), Vec::new());
    FileReport {
        file_name: file.name().to_string(),
        extension: file.extension(),
        size_kb: 0.0,
        shape: None,
        preview: None,
        duplicates: None,
        fill: None,
        messages: vec![UserMessage::error(err.to_string())],
        outcome: FileOutcome::Failed {
            code: err.error_code().to_string(),
            reason: err.to_string(),
        },
    }
}

/// Print a human-readable summary of the batch.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_human_readable_summary(report: &BatchReport, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CONVERSION COMPLETE");
    println!("{}", "=".repeat(80));

    for file in &report.files {
        println!();
        println!("File: {} ({:.2} KB)", file.file_name, file.size_kb);
        if let Some((rows, cols)) = file.shape {
            println!("Shape: {} rows x {} columns", rows, cols);
        }

        if let Some(ref preview) = file.preview {
            print_preview(preview);
        }

        for message in &file.messages {
            println!("  [{}] {}", message.level, message.text);
        }

        match &file.outcome {
            FileOutcome::Converted {
                filename, bytes, ..
            } => println!(
                "  -> {} ({} bytes)",
                args.output.join(filename).display(),
                bytes
            ),
            FileOutcome::Skipped { .. } => println!("  -> skipped"),
            FileOutcome::Failed { code, .. } => println!("  -> failed ({})", code),
        }
    }

    println!();
    println!(
        "{}/{} file(s) converted",
        report.converted_count(),
        report.files.len()
    );
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

fn print_preview(preview: &TablePreview) {
    println!(
        "Preview ({} of {} rows):",
        preview.rows.len(),
        preview.total_rows
    );
    println!(
        "  {}",
        preview
            .columns
            .iter()
            .map(|c| truncate_str(c, 16))
            .collect::<Vec<_>>()
            .join(" | ")
    );
    for row in &preview.rows {
        println!(
            "  {}",
            row.iter()
                .map(|cell| truncate_str(&cell.to_string(), 16))
                .collect::<Vec<_>>()
                .join(" | ")
        );
    }
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
