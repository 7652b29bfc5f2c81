//! Imputation module for handling missing values.
//!
//! Currently provides mean imputation for numeric columns.

mod statistical;

pub use statistical::StatisticalImputer;
