use crate::config::TargetFormat;
use crate::table::Cell;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Inputs
// ============================================================================

/// A file handed over by the upload collaborator.
///
/// Immutable once constructed: the name (including its extension), the size
/// in bytes, and the raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    size: usize,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len(),
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Size in kilobytes (1 KB = 1024 bytes).
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase extension including the leading dot, or an empty string.
    ///
    /// A leading dot does not start an extension, so `.csv` has none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

static_assertions::assert_impl_all!(UploadedFile: Send, Sync);

// ============================================================================
// Conversion Request / Artifact
// ============================================================================

/// A single user request to convert one table into a target format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub target_format: TargetFormat,
    pub output_name: String,
    pub mime_type: String,
}

impl ConversionRequest {
    /// Build a request for `original_name`, replacing its trailing
    /// `original_ext` with the target format's extension.
    pub fn new(original_name: &str, original_ext: &str, target_format: TargetFormat) -> Self {
        Self {
            target_format,
            output_name: crate::pipeline::derive_output_name(
                original_name,
                original_ext,
                target_format,
            ),
            mime_type: target_format.mime_type().to_string(),
        }
    }
}

/// Serialized bytes ready for the download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

static_assertions::assert_impl_all!(OutputArtifact: Send, Sync);

impl OutputArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ============================================================================
// Cleaning Reports
// ============================================================================

/// Outcome of duplicate row removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
}

/// A numeric column whose missing cells were replaced by the column mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledColumn {
    pub name: String,
    pub mean: f64,
    pub cells_filled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    pub filled_columns: Vec<FilledColumn>,
    /// Columns left untouched because every cell is missing.
    pub skipped_empty_columns: Vec<String>,
}

impl FillReport {
    pub fn cells_filled(&self) -> usize {
        self.filled_columns.iter().map(|c| c.cells_filled).sum()
    }
}

/// Result of the missing-value fill.
///
/// `NoNumericColumns` is a warning condition: the table was not modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FillOutcome {
    Filled(FillReport),
    NoNumericColumns,
}

impl FillOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NoNumericColumns)
    }
}

// ============================================================================
// User Messages & Batch Reports (for UI integration)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message meant for the person who uploaded the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl UserMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// First rows of a parsed table, in a front-end friendly shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub total_rows: usize,
}

/// What finally happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted {
        filename: String,
        mime_type: String,
        bytes: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        code: String,
        reason: String,
    },
}

impl FileOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

/// Per-file summary of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub extension: String,
    pub size_kb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<(usize, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TablePreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicateReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillOutcome>,
    pub messages: Vec<UserMessage>,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn converted_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_converted()).count()
    }

    pub fn all_failed(&self) -> bool {
        !self.files.is_empty() && self.converted_count() == 0
    }
}
