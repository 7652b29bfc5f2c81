//! In-memory table model.
//!
//! A [`Table`] wraps a Polars `DataFrame` together with one [`ColumnKind`]
//! per column. Kinds are computed once when the table is built from parsed
//! data and are carried through every cleaning transform, so cleaning and
//! serialization agree on which columns are numeric.

use crate::error::Result;
use crate::types::TablePreview;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Observed type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every present value is a number
    Numeric,
    /// At least one present value is not a number
    Text,
    /// Every cell is missing
    Empty,
}

impl ColumnKind {
    fn of(column: &Column) -> Self {
        if column.null_count() == column.len() {
            ColumnKind::Empty
        } else if is_numeric_dtype(column.dtype()) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Missing)
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value
            .map(|s| Cell::Text(s.to_string()))
            .unwrap_or(Cell::Missing)
    }
}

/// Tabular data with named, equally long, uniquely named columns.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: Vec<ColumnKind>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Build a table from parsed data, inferring each column's kind.
    pub fn new(df: DataFrame) -> Self {
        let kinds = df.get_columns().iter().map(ColumnKind::of).collect();
        Self { df, kinds }
    }

    /// Replace the data while keeping the kinds computed at parse time.
    pub(crate) fn with_data(self, df: DataFrame) -> Self {
        debug_assert_eq!(df.width(), self.kinds.len());
        Self {
            df,
            kinds: self.kinds,
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub(crate) fn dataframe_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.df.shape()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.df
            .get_column_index(column)
            .map(|idx| self.kinds[idx])
    }

    /// Names of the columns whose kind is [`ColumnKind::Numeric`].
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .zip(&self.kinds)
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Cells of the column at `idx`, read according to its kind.
    pub fn column_cells(&self, idx: usize) -> Result<Vec<Cell>> {
        let column = self.df.get_columns().get(idx).ok_or_else(|| {
            crate::error::SweepError::Internal(format!("column index {idx} out of bounds"))
        })?;
        let series = column.as_materialized_series();

        let cells = match self.kinds[idx] {
            ColumnKind::Numeric => {
                let floats = series.cast(&DataType::Float64)?;
                floats.f64()?.into_iter().map(Cell::from).collect()
            }
            ColumnKind::Text | ColumnKind::Empty => {
                let strings = series.cast(&DataType::String)?;
                strings.str()?.into_iter().map(Cell::from).collect()
            }
        };

        Ok(cells)
    }

    /// All cells, row by row.
    pub fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        let columns = (0..self.width())
            .map(|idx| self.column_cells(idx))
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..self.height())
            .map(|row| columns.iter().map(|col| col[row].clone()).collect())
            .collect();

        Ok(rows)
    }

    /// The first `n` rows, with the kinds of the full table.
    pub fn head(&self, n: usize) -> Table {
        Table {
            df: self.df.head(Some(n)),
            kinds: self.kinds.clone(),
        }
    }

    pub fn preview(&self, n: usize) -> Result<TablePreview> {
        Ok(TablePreview {
            columns: self.column_names(),
            rows: self.head(n).rows()?,
            total_rows: self.height(),
        })
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.kinds == other.kinds && self.df.equals_missing(&other.df)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.df)
    }
}
