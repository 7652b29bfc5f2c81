//! Output writers.
//!
//! This module serializes a [`Table`] into the bytes of a target format.
//! Neither writer emits a row-index column.

mod csv;
mod xlsx;

pub use csv::write_csv;
pub use xlsx::{SHEET_NAME, write_xlsx};

use crate::config::TargetFormat;
use crate::error::Result;
use crate::table::Table;

/// Serialize a table into the requested format.
pub fn serialize(table: &Table, format: TargetFormat) -> Result<Vec<u8>> {
    match format {
        TargetFormat::Csv => write_csv(table),
        TargetFormat::Excel => write_xlsx(table),
    }
}
