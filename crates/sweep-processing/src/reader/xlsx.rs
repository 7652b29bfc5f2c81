use crate::error::{Result, ResultExt, SweepError};
use crate::table::Table;
use crate::utils::unique_header_names;
use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Cell value normalized from the spreadsheet's own cell types.
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl RawCell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(v) => RawCell::Int(*v),
            Data::Float(v) => RawCell::Float(*v),
            Data::String(s) if s.is_empty() => RawCell::Missing,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Bool(b) => RawCell::Text(b.to_string()),
            Data::DateTime(dt) => RawCell::Text(
                dt.as_datetime()
                    .map(format_datetime)
                    .unwrap_or_else(|| dt.as_f64().to_string()),
            ),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
            Data::Error(_) | Data::Empty => RawCell::Missing,
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            RawCell::Int(v) => Some(v.to_string()),
            RawCell::Float(v) => Some(v.to_string()),
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Missing => None,
        }
    }
}

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parse the first worksheet of an XLSX workbook into a [`Table`].
///
/// The first row is the header. A column holding only numeric cells becomes
/// numeric; any other present value turns the whole column into text.
pub fn read_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SweepError::EmptyWorkbook)??;

    debug!("Worksheet range: {:?}", range.get_size());
    let df = range_to_dataframe(&range).context("Failed to build table from worksheet")?;
    Ok(Table::new(df))
}

fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let names = unique_header_names(header.iter().map(|cell| match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }));

    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            let cell = row.get(idx).map(RawCell::from_data).unwrap_or(RawCell::Missing);
            column.push(cell);
        }
    }

    let series: Vec<Column> = names
        .iter()
        .zip(columns)
        .map(|(name, cells)| build_series(name, cells).into_column())
        .collect();

    Ok(DataFrame::new(series)?)
}

fn build_series(name: &str, cells: Vec<RawCell>) -> Series {
    let present = cells.iter().filter(|c| **c != RawCell::Missing);
    let mut any_present = false;
    let mut all_int = true;
    let mut all_numeric = true;

    for cell in present {
        any_present = true;
        match cell {
            RawCell::Int(_) => {}
            RawCell::Float(_) => all_int = false,
            _ => {
                all_int = false;
                all_numeric = false;
            }
        }
    }

    if any_present && all_int {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                RawCell::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if any_present && all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                RawCell::Int(v) => Some(*v as f64),
                RawCell::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(RawCell::to_text).collect();
        Series::new(name.into(), values)
    }
}
