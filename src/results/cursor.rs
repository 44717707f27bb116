use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlSessionError;
use crate::params::sqlite_value_to_row_value;
use crate::types::RowValues;

use super::rows::BufferedRows;

/// Forward-only source of result rows.
///
/// Column metadata is fixed for the life of the cursor; `next_row` yields the
/// values of one row, in column order, until the source is exhausted.
pub trait RowCursor {
    /// Column names in result order, as reported by the source.
    fn column_names(&self) -> &Arc<Vec<String>>;

    /// Advance to the next row.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError` if the source fails while stepping.
    fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlSessionError>;
}

/// Cursor over a bound, executing `SQLite` statement.
pub struct SqliteCursor<'stmt> {
    column_names: Arc<Vec<String>>,
    rows: rusqlite::Rows<'stmt>,
}

impl<'stmt> SqliteCursor<'stmt> {
    /// Start stepping `stmt`. Parameters must already be bound.
    pub fn open(stmt: &'stmt mut Statement<'_>) -> Self {
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect();
        Self {
            column_names: Arc::new(column_names),
            rows: stmt.raw_query(),
        }
    }
}

impl RowCursor for SqliteCursor<'_> {
    fn column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlSessionError> {
        let col_count = self.column_names.len();
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            let value: Value = row.get(idx)?;
            values.push(sqlite_value_to_row_value(value));
        }
        Ok(Some(values))
    }
}

/// Cursor replaying a [`BufferedRows`] from its first row.
///
/// Stands in for rewinding a live cursor: each call to
/// [`BufferedRows::cursor`] starts over without touching the database.
pub struct BufferedCursor<'a> {
    rows: &'a BufferedRows,
    position: usize,
}

impl<'a> BufferedCursor<'a> {
    pub(crate) fn new(rows: &'a BufferedRows) -> Self {
        Self { rows, position: 0 }
    }

    /// Index of the next row to be returned.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move back before the first row.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl RowCursor for BufferedCursor<'_> {
    fn column_names(&self) -> &Arc<Vec<String>> {
        self.rows.shared_column_names()
    }

    fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlSessionError> {
        let next = self
            .rows
            .get(self.position)
            .map(|row| row.values().to_vec());
        if next.is_some() {
            self.position += 1;
        }
        Ok(next)
    }
}
