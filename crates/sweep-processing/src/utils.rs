//! Shared utilities for the conversion pipeline.
//!
//! This module contains helpers used by the readers, writers and cleaners.

use polars::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = floats
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// CSV Text Utilities
// =============================================================================

/// Delimiters considered when sniffing a CSV header line.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drop a leading UTF-8 byte order mark, if any.
pub fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Pick the delimiter of a CSV buffer from its first line.
///
/// Candidates are counted outside double quotes; the most frequent wins and
/// comma is used on ties or when none occurs.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;

    for &byte in bytes {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(pos) = DELIMITER_CANDIDATES.iter().position(|&d| d == byte) {
                    counts[pos] += 1;
                }
            }
            _ => {}
        }
    }

    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    DELIMITER_CANDIDATES[best]
}

/// Split the first line of a CSV buffer into raw header fields.
///
/// Double quotes group a field and `""` inside quotes is a literal quote.
pub fn split_header_line(bytes: &[u8], delimiter: u8) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut in_quotes = false;
    let mut iter = bytes.iter().copied().peekable();

    while let Some(byte) = iter.next() {
        match byte {
            b'"' if in_quotes && iter.peek() == Some(&b'"') => {
                current.push(b'"');
                iter.next();
            }
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            d if d == delimiter && !in_quotes => {
                fields.push(String::from_utf8_lossy(&current).into_owned());
                current.clear();
            }
            other => current.push(other),
        }
    }
    fields.push(String::from_utf8_lossy(&current).into_owned());

    fields
}

// =============================================================================
// Header Utilities
// =============================================================================

/// Make header names usable as column names.
///
/// Blank headers become `Unnamed: <index>` and repeated names get a `.N`
/// suffix (`a`, `a.1`, `a.2`), so every name is unique.
pub fn unique_header_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }

    names
}

/// Spreadsheet column letters for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

// =============================================================================
// Tests
// =============================================================================
