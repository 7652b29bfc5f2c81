//! Row identity for duplicate detection.

use polars::prelude::*;
use std::collections::HashSet;

/// Mark the first occurrence of every distinct row.
///
/// Rows are compared over all columns by their textual cell values, so a
/// missing cell only matches another missing cell.
pub(crate) fn first_occurrence_mask(df: &DataFrame) -> PolarsResult<Vec<bool>> {
    let as_text: Vec<Series> = df
        .get_columns()
        .iter()
        .map(|col| col.as_materialized_series().cast(&DataType::String))
        .collect::<PolarsResult<_>>()?;
    let columns: Vec<&StringChunked> = as_text
        .iter()
        .map(|s| s.str())
        .collect::<PolarsResult<_>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
    let mask = (0..df.height())
        .map(|row| {
            let key: Vec<Option<&str>> = columns.iter().map(|col| col.get(row)).collect();
            seen.insert(key)
        })
        .collect();

    Ok(mask)
}
