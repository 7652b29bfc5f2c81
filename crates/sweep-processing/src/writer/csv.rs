use crate::error::{Result, ResultExt};
use crate::table::Table;
use polars::prelude::*;

/// Write a table as CSV: header row, then one line per record.
///
/// Fields containing the separator, a quote or a newline are quoted and
/// missing cells become empty fields.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut df = table.dataframe().clone();
    let mut buffer = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context("Failed to write CSV")?;

    Ok(buffer)
}
