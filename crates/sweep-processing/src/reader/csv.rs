use crate::error::{Result, ResultExt};
use crate::table::Table;
use crate::utils::{detect_delimiter, split_header_line, strip_utf8_bom, unique_header_names};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Parse a CSV buffer into a [`Table`].
///
/// The first line is the header. Column types are inferred from every row:
/// a column whose present values all parse as numbers becomes numeric, and
/// empty fields become missing cells.
pub fn read_csv(bytes: &[u8]) -> Result<Table> {
    let content = strip_utf8_bom(bytes);
    let separator = detect_delimiter(content);
    debug!("Reading CSV with separator {:?}", separator as char);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(content.to_vec()))
        .finish()
        .context("Failed to parse CSV")?;

    let df = normalize_header(df, split_header_line(content, separator))
        .context("Failed to rename CSV columns")?;

    debug!("CSV parsed: {:?}", df.shape());
    Ok(Table::new(df))
}

/// Rename columns the way the XLSX reader names them: blank headers become
/// `Unnamed: <index>` and repeated names get a `.N` suffix.
fn normalize_header(df: DataFrame, raw_header: Vec<String>) -> PolarsResult<DataFrame> {
    let names = if raw_header.len() == df.width() {
        unique_header_names(raw_header)
    } else {
        unique_header_names(df.get_column_names().into_iter().map(|name| name.to_string()))
    };

    let columns: Vec<Column> = df
        .take_columns()
        .into_iter()
        .zip(names)
        .map(|(column, name)| column.with_name(name.into()))
        .collect();

    DataFrame::new(columns)
}
