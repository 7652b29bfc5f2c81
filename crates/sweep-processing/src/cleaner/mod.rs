//! Data cleaning module.
//!
//! This module provides duplicate row removal. Missing-value imputation
//! lives in [`crate::imputers`].

mod duplicates;

use crate::error::Result;
use crate::table::Table;
use crate::types::DuplicateReport;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for row-level cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that exactly repeat an earlier row.
    ///
    /// All columns are compared, the first occurrence is kept and surviving
    /// rows keep their original order. Column kinds are unchanged.
    pub fn remove_duplicates(table: Table) -> Result<(Table, DuplicateReport)> {
        info!("Removing duplicate rows...");

        let rows_before = table.height();
        let keep = duplicates::first_occurrence_mask(table.dataframe())?;
        let rows_removed = keep.iter().filter(|k| !**k).count();

        if rows_removed == 0 {
            debug!("No duplicate rows found");
            let report = DuplicateReport {
                rows_before,
                rows_after: rows_before,
                rows_removed: 0,
            };
            return Ok((table, report));
        }

        let mask = Series::new("keep".into(), keep);
        let df = table.dataframe().filter(mask.bool()?)?;
        let rows_after = df.height();
        debug!(
            "Removed {} duplicate rows ({:.1}%)",
            rows_removed,
            (rows_removed as f64 / rows_before as f64) * 100.0
        );

        let report = DuplicateReport {
            rows_before,
            rows_after,
            rows_removed,
        };
        Ok((table.with_data(df), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_csv;
    use crate::table::Cell;

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let table = Table::new(
            df![
                "a" => [3i64, 1, 3, 2, 1],
                "b" => ["x", "y", "x", "z", "y"],
            ]
            .unwrap(),
        );

        let (deduped, report) = DataCleaner::remove_duplicates(table).unwrap();

        assert_eq!(report.rows_before, 5);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.rows_removed, 2);
        assert_eq!(
            deduped.column_cells(0).unwrap(),
            vec![Cell::Number(3.0), Cell::Number(1.0), Cell::Number(2.0)]
        );
    }

    #[test]
    fn test_remove_duplicates_with_missing_cells() {
        let table = read_csv(b"a,b\n1,\n1,\n2,3\n").unwrap();

        let (deduped, report) = DataCleaner::remove_duplicates(table).unwrap();

        assert_eq!(report.rows_removed, 1);
        assert_eq!(
            deduped.rows().unwrap(),
            vec![
                vec![Cell::Number(1.0), Cell::Missing],
                vec![Cell::Number(2.0), Cell::Number(3.0)],
            ]
        );
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let table = Table::new(
            df![
                "k" => [Some(1i64), None, Some(1), None, Some(2)],
                "v" => [Some("a"), Some("b"), Some("a"), Some("b"), None],
            ]
            .unwrap(),
        );

        let (once, _) = DataCleaner::remove_duplicates(table).unwrap();
        let (twice, report) = DataCleaner::remove_duplicates(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(report.rows_removed, 0);
    }

    #[test]
    fn test_remove_duplicates_no_duplicates_returns_same_table() {
        let table = Table::new(df!["a" => [1i64, 2, 3]].unwrap());
        let (deduped, report) = DataCleaner::remove_duplicates(table.clone()).unwrap();

        assert_eq!(deduped, table);
        assert_eq!(report.rows_removed, 0);
    }
}
