//! Statistical imputation methods.
//!
//! Provides mean imputation for numeric columns.

use crate::error::{Result, SweepError};
use crate::table::{ColumnKind, Table};
use crate::types::{FillOutcome, FillReport, FilledColumn};
use crate::utils::fill_numeric_nulls;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace missing cells of every numeric column with the column mean.
    ///
    /// Columns with no missing cells are left as they are, and columns whose
    /// every cell is missing are reported as skipped. Without any numeric
    /// column the table is returned untouched with
    /// [`FillOutcome::NoNumericColumns`].
    pub fn fill_missing_numeric(table: Table) -> Result<(Table, FillOutcome)> {
        info!("Filling missing values in numeric columns...");

        let numeric = table.numeric_columns();
        if numeric.is_empty() {
            warn!("No numeric columns found");
            return Ok((table, FillOutcome::NoNumericColumns));
        }

        let mut report = FillReport {
            skipped_empty_columns: table.columns_of_kind(ColumnKind::Empty),
            ..FillReport::default()
        };
        let mut table = table;

        for col_name in &numeric {
            if let Some(filled) = Self::apply_numeric_mean(table.dataframe_mut(), col_name)? {
                report.filled_columns.push(filled);
            }
        }

        debug!(
            "Filled {} cells across {} columns",
            report.cells_filled(),
            report.filled_columns.len()
        );
        Ok((table, FillOutcome::Filled(report)))
    }

    /// Apply mean imputation for a single numeric column.
    ///
    /// Returns `None` when the column has nothing to fill.
    pub fn apply_numeric_mean(df: &mut DataFrame, col_name: &str) -> Result<Option<FilledColumn>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let mean = series.mean().ok_or_else(|| {
            SweepError::Internal(format!("column '{col_name}' has no values to average"))
        })?;

        let filled = fill_numeric_nulls(&series, mean)?;
        df.replace(col_name, filled)?;

        debug!("Filled '{}' with mean: {:.2}", col_name, mean);
        Ok(Some(FilledColumn {
            name: col_name.to_string(),
            mean,
            cells_filled: missing,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn filled_report(outcome: FillOutcome) -> FillReport {
        match outcome {
            FillOutcome::Filled(report) => report,
            FillOutcome::NoNumericColumns => panic!("expected a fill report"),
        }
    }

    #[test]
    fn test_fill_missing_numeric_uses_mean() {
        let table = Table::new(
            df![
                "b" => [None, Some(4i64), Some(6)],
            ]
            .unwrap(),
        );

        let (filled, outcome) = StatisticalImputer::fill_missing_numeric(table).unwrap();
        let report = filled_report(outcome);

        assert_eq!(
            filled.column_cells(0).unwrap(),
            vec![Cell::Number(5.0), Cell::Number(4.0), Cell::Number(6.0)]
        );
        assert_eq!(report.filled_columns.len(), 1);
        assert_eq!(report.filled_columns[0].mean, 5.0);
        assert_eq!(report.filled_columns[0].cells_filled, 1);
    }

    #[test]
    fn test_fill_missing_numeric_preserves_present_values() {
        let table = Table::new(
            df![
                "values" => [Some(10.0), None, Some(20.0), None],
            ]
            .unwrap(),
        );

        let (filled, _) = StatisticalImputer::fill_missing_numeric(table).unwrap();
        let values = filled.dataframe().column("values").unwrap();

        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(0).unwrap().try_extract::<f64>().unwrap(), 10.0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);
        assert_eq!(values.get(2).unwrap().try_extract::<f64>().unwrap(), 20.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 15.0);
    }

    #[test]
    fn test_fill_missing_numeric_leaves_text_untouched() {
        let table = Table::new(
            df![
                "n" => [Some(1.0), None],
                "s" => [Some("a"), None],
            ]
            .unwrap(),
        );

        let (filled, _) = StatisticalImputer::fill_missing_numeric(table).unwrap();
        assert_eq!(
            filled.column_cells(1).unwrap(),
            vec![Cell::Text("a".to_string()), Cell::Missing]
        );
    }

    #[test]
    fn test_fill_missing_numeric_no_numeric_columns() {
        let table = Table::new(
            df![
                "s" => [Some("a"), None],
            ]
            .unwrap(),
        );
        let original = table.clone();

        let (result, outcome) = StatisticalImputer::fill_missing_numeric(table).unwrap();

        assert_eq!(outcome, FillOutcome::NoNumericColumns);
        assert!(outcome.is_warning());
        assert_eq!(result, original);
    }

    #[test]
    fn test_fill_missing_numeric_all_missing_column_is_no_numeric() {
        let table = Table::new(
            df![
                "empty" => [Option::<f64>::None, None],
            ]
            .unwrap(),
        );
        let (result, outcome) = StatisticalImputer::fill_missing_numeric(table.clone()).unwrap();

        assert_eq!(outcome, FillOutcome::NoNumericColumns);
        assert_eq!(result, table);
    }

    #[test]
    fn test_fill_missing_numeric_reports_skipped_empty_columns() {
        let table = Table::new(
            df![
                "n" => [Some(2.0), None],
                "empty" => [Option::<f64>::None, None],
            ]
            .unwrap(),
        );

        let (result, outcome) = StatisticalImputer::fill_missing_numeric(table).unwrap();
        let report = filled_report(outcome);

        assert_eq!(report.skipped_empty_columns, vec!["empty"]);
        assert_eq!(result.column_cells(1).unwrap(), vec![Cell::Missing, Cell::Missing]);
    }

    #[test]
    fn test_fill_missing_numeric_is_idempotent() {
        let table = Table::new(
            df![
                "n" => [Some(1.0), None, Some(3.0)],
            ]
            .unwrap(),
        );

        let (once, _) = StatisticalImputer::fill_missing_numeric(table).unwrap();
        let (twice, outcome) = StatisticalImputer::fill_missing_numeric(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert!(filled_report(outcome).filled_columns.is_empty());
    }

    #[test]
    fn test_apply_numeric_mean_no_nulls() {
        let mut df = df!["values" => [1.0, 2.0, 3.0]].unwrap();
        let filled = StatisticalImputer::apply_numeric_mean(&mut df, "values").unwrap();
        assert!(filled.is_none());
    }

    #[test]
    fn test_apply_numeric_mean_nonexistent_column() {
        let mut df = df!["other" => [1.0, 2.0]].unwrap();
        assert!(StatisticalImputer::apply_numeric_mean(&mut df, "values").is_err());
    }
}
