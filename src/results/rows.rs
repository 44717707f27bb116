use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SqlSessionError;
use crate::types::RowValues;

use super::cursor::{BufferedCursor, RowCursor};

type ColumnIndex = Arc<HashMap<String, usize>>;

fn index_columns(column_names: &[String]) -> ColumnIndex {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // Duplicate names resolve to their first occurrence.
        index.entry(name.clone()).or_insert(i);
    }
    Arc::new(index)
}

/// A row from a database query result
///
/// This struct represents a single row from a database query result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct Row {
    column_names: Arc<Vec<String>>,
    values: Vec<RowValues>,
    // Shared with every row of the same result to avoid repeated string comparisons
    column_index_cache: ColumnIndex,
}

impl Row {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `values` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index_cache = index_columns(&column_names);
        Self {
            column_names,
            values,
            column_index_cache,
        }
    }

    /// Get the index of a column by name
    ///
    /// # Returns
    ///
    /// The index of the first column with that name, or None if not found
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    /// Column name and value pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}

/// Every row of a result, read once and kept in order.
///
/// Holding the rows in memory lets the same result feed a [`ResultTable`],
/// a record mapping, and any number of further passes by the caller, with no
/// need to reposition the driver's cursor.
///
/// [`ResultTable`]: super::table::ResultTable
#[derive(Debug, Clone, Default)]
pub struct BufferedRows {
    column_names: Arc<Vec<String>>,
    column_index_cache: ColumnIndex,
    rows: Vec<Row>,
}

impl BufferedRows {
    /// Create an empty buffer for the given columns.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> Self {
        let column_names = Arc::new(column_names);
        let column_index_cache = index_columns(&column_names);
        Self {
            column_names,
            column_index_cache,
            rows: Vec::new(),
        }
    }

    /// Read `cursor` to the end.
    ///
    /// # Errors
    ///
    /// Returns the cursor's error as is when it fails before the first row, and
    /// a mapping error wrapping it afterwards; rows read before the failure are
    /// dropped.
    pub fn drain<C: RowCursor + ?Sized>(cursor: &mut C) -> Result<Self, SqlSessionError> {
        let mut buffered = BufferedRows {
            column_names: Arc::clone(cursor.column_names()),
            column_index_cache: index_columns(cursor.column_names()),
            rows: Vec::new(),
        };
        while let Some(values) = cursor
            .next_row()
            .map_err(|e| SqlSessionError::cursor_failure(e, buffered.len()))?
        {
            buffered.push_values(values);
        }
        Ok(buffered)
    }

    /// Append a row. Values must be in column order.
    pub fn push_values(&mut self, values: Vec<RowValues>) {
        self.rows.push(Row {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        });
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub(crate) fn shared_column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// A fresh cursor positioned before the first row.
    #[must_use]
    pub fn cursor(&self) -> BufferedCursor<'_> {
        BufferedCursor::new(self)
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a BufferedRows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
