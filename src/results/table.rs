use indexmap::IndexMap;

use crate::error::SqlSessionError;
use crate::types::RowValues;

use super::cursor::RowCursor;
use super::rows::BufferedRows;

/// Column-keyed view of a query result.
///
/// Each column name maps to the values of that column, one per row, in the
/// order rows were read. Values of the same row share a position across all
/// columns; there is no row object. Keys iterate in result column order.
///
/// Columns that share a name share a key: every row then appends one value per
/// occurrence, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: IndexMap<String, Vec<RowValues>>,
    row_count: usize,
}

impl ResultTable {
    fn with_columns(column_names: &[String]) -> Self {
        let mut columns = IndexMap::with_capacity(column_names.len());
        for name in column_names {
            columns.entry(name.clone()).or_insert_with(Vec::new);
        }
        Self {
            columns,
            row_count: 0,
        }
    }

    fn append_row(&mut self, column_names: &[String], values: Vec<RowValues>) {
        for (name, value) in column_names.iter().zip(values) {
            self.columns.entry(name.clone()).or_default().push(value);
        }
        self.row_count += 1;
    }

    /// Build the table from rows already buffered in memory.
    #[must_use]
    pub fn from_rows(rows: &BufferedRows) -> Self {
        let column_names = rows.column_names();
        let mut table = Self::with_columns(column_names);
        for row in rows {
            table.append_row(column_names, row.values().to_vec());
        }
        table
    }

    /// Values of `column`, one per row.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&[RowValues]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Value of `column` in row `row`.
    #[must_use]
    pub fn value(&self, column: &str, row: usize) -> Option<&RowValues> {
        self.columns.get(column).and_then(|values| values.get(row))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Number of distinct column keys.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when the result had no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<RowValues>> {
        self.columns.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Vec<RowValues>> {
        self.columns
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = (&'a String, &'a Vec<RowValues>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<RowValues>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Drain `cursor` into a [`ResultTable`].
///
/// Column metadata is read once, then every row is appended until the cursor
/// reports no more rows. A forward cursor that was already exhausted yields an
/// empty table.
///
/// # Errors
///
/// If the cursor fails part way, the partial table is dropped and a mapping
/// error wrapping the cause is returned. A failure before the first row is
/// returned unchanged.
pub fn build_result_table<C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<ResultTable, SqlSessionError> {
    let column_names = std::sync::Arc::clone(cursor.column_names());
    let mut table = ResultTable::with_columns(&column_names);
    while let Some(values) = cursor
        .next_row()
        .map_err(|e| SqlSessionError::cursor_failure(e, table.row_count()))?
    {
        table.append_row(&column_names, values);
    }
    Ok(table)
}
