//! Configuration types for the conversion pipeline.
//!
//! This module provides the per-batch options a user selects (cleaning
//! toggles, target format, preview size) using the builder pattern.

use serde::{Deserialize, Serialize};

/// MIME type of CSV output.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// MIME type of XLSX output.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Output serialization chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetFormat {
    /// Comma separated values
    #[default]
    Csv,
    /// Excel-compatible spreadsheet (.xlsx)
    Excel,
}

impl TargetFormat {
    /// File extension for this format, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Excel => ".xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME_TYPE,
            Self::Excel => XLSX_MIME_TYPE,
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => f.write_str("CSV"),
            Self::Excel => f.write_str("Excel"),
        }
    }
}

/// A cleaning transform that can be requested for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleaningStep {
    /// Drop rows that exactly repeat an earlier row
    RemoveDuplicates,
    /// Replace missing numeric cells with the column mean
    FillMissing,
}

/// Options applied to every file of a batch.
///
/// Use [`ConversionOptions::builder()`] to create a validated value.
///
/// # Example
///
/// ```rust,ignore
/// use sweep_processing::config::{ConversionOptions, TargetFormat};
///
/// let options = ConversionOptions::builder()
///     .clean(true)
///     .remove_duplicates(true)
///     .fill_missing(true)
///     .target_format(TargetFormat::Excel)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Whether cleaning is enabled at all. Requested steps are only legal when set.
    /// Default: false
    pub clean_enabled: bool,

    /// Cleaning steps in the order they should run. Repetition is allowed.
    /// Default: empty
    pub cleaning_steps: Vec<CleaningStep>,

    /// Format every file is converted to.
    /// Default: Csv
    pub target_format: TargetFormat,

    /// Number of rows shown in the preview.
    /// Default: 5
    pub preview_rows: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            clean_enabled: false,
            cleaning_steps: Vec::new(),
            target_format: TargetFormat::default(),
            preview_rows: 5,
        }
    }
}

impl ConversionOptions {
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::default()
    }

    pub fn remove_duplicates_requested(&self) -> bool {
        self.cleaning_steps.contains(&CleaningStep::RemoveDuplicates)
    }

    pub fn fill_missing_requested(&self) -> bool {
        self.cleaning_steps.contains(&CleaningStep::FillMissing)
    }

    /// Steps that actually run: none unless cleaning is enabled.
    pub fn effective_steps(&self) -> &[CleaningStep] {
        if self.clean_enabled {
            &self.cleaning_steps
        } else {
            &[]
        }
    }

    /// Validate the options and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if !self.clean_enabled && !self.cleaning_steps.is_empty() {
            return Err(ConfigValidationError::CleaningDisabled(
                self.cleaning_steps.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during option validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Cleaning steps {0:?} requested but cleaning is disabled")]
    CleaningDisabled(Vec<CleaningStep>),
}

/// Builder for [`ConversionOptions`] with fluent API.
#[derive(Debug, Default)]
pub struct ConversionOptionsBuilder {
    clean_enabled: Option<bool>,
    cleaning_steps: Vec<CleaningStep>,
    target_format: Option<TargetFormat>,
    preview_rows: Option<usize>,
}

impl ConversionOptionsBuilder {
    /// Enable or disable cleaning.
    pub fn clean(mut self, enable: bool) -> Self {
        self.clean_enabled = Some(enable);
        self
    }

    /// Request or withdraw duplicate removal.
    ///
    /// The step keeps the position of its first request.
    pub fn remove_duplicates(self, requested: bool) -> Self {
        self.toggle(CleaningStep::RemoveDuplicates, requested)
    }

    /// Request or withdraw mean imputation of numeric columns.
    pub fn fill_missing(self, requested: bool) -> Self {
        self.toggle(CleaningStep::FillMissing, requested)
    }

    /// Append a step unconditionally, allowing repetition.
    pub fn step(mut self, step: CleaningStep) -> Self {
        self.cleaning_steps.push(step);
        self
    }

    pub fn target_format(mut self, format: TargetFormat) -> Self {
        self.target_format = Some(format);
        self
    }

    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    fn toggle(mut self, step: CleaningStep, requested: bool) -> Self {
        if requested {
            if !self.cleaning_steps.contains(&step) {
                self.cleaning_steps.push(step);
            }
        } else {
            self.cleaning_steps.retain(|s| *s != step);
        }
        self
    }

    /// Build the options.
    ///
    /// Returns validated `ConversionOptions` or an error if validation fails.
    pub fn build(self) -> Result<ConversionOptions, ConfigValidationError> {
        let options = ConversionOptions {
            clean_enabled: self.clean_enabled.unwrap_or(false),
            cleaning_steps: self.cleaning_steps,
            target_format: self.target_format.unwrap_or_default(),
            preview_rows: self.preview_rows.unwrap_or(5),
        };

        options.validate()?;
        Ok(options)
    }
}
