//! Result materialization: the row buffer, the column-keyed table, and the
//! query result that carries both.

mod cursor;
mod rows;
mod table;

pub use cursor::{BufferedCursor, RowCursor, SqliteCursor};
pub use rows::{BufferedRows, Row};
pub use table::{ResultTable, build_result_table};

/// What a query returns: the column-keyed table and the rows it was built from.
///
/// The rows stay available for direct iteration from the first row, so a caller
/// can use the table and walk the result again without re-running the query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    table: ResultTable,
    rows: BufferedRows,
}

impl QueryResult {
    #[must_use]
    pub fn from_rows(rows: BufferedRows) -> Self {
        Self {
            table: ResultTable::from_rows(&rows),
            rows,
        }
    }

    #[must_use]
    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    #[must_use]
    pub fn rows(&self) -> &BufferedRows {
        &self.rows
    }

    /// A cursor over the rows, positioned before the first one.
    #[must_use]
    pub fn cursor(&self) -> BufferedCursor<'_> {
        self.rows.cursor()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn into_table(self) -> ResultTable {
        self.table
    }

    #[must_use]
    pub fn into_parts(self) -> (ResultTable, BufferedRows) {
        (self.table, self.rows)
    }
}
