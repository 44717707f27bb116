//! Helper utilities for testing and development.

use crate::results::BufferedRows;
use crate::types::RowValues;

/// Build a [`BufferedRows`] from literal column names and row values.
///
/// Useful for exercising table and record mapping without a database.
#[must_use]
pub fn buffered_rows(column_names: &[&str], rows: Vec<Vec<RowValues>>) -> BufferedRows {
    let mut buffered = BufferedRows::new(column_names.iter().map(|c| (*c).to_string()).collect());
    for values in rows {
        buffered.push_values(values);
    }
    buffered
}
