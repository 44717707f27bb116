use crate::error::SqlSessionError;
use crate::record::{Materialized, Record, materialize};
use crate::results::{QueryResult, ResultTable, build_result_table};
use crate::types::RowValues;

use super::Session;

impl Session {
    /// Run a query without parameters.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, execution, or row reading fails.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult, SqlSessionError> {
        self.query_with(sql, &[])
    }

    /// Run a query and return its table along with the buffered rows.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, binding, execution, or row reading fails.
    pub fn query_with(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<QueryResult, SqlSessionError> {
        let rows = self.fetch_rows(sql, params)?;
        Ok(QueryResult::from_rows(rows))
    }

    /// Run a query and stream it straight into a [`ResultTable`] without
    /// keeping the rows.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, binding, execution, or row reading fails.
    pub fn query_table(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultTable, SqlSessionError> {
        self.with_cursor(sql, params, |cursor| build_result_table(cursor))
    }

    /// Run a query and materialize its rows as `R`.
    ///
    /// One row gives [`Materialized::Single`]; any other count gives a map
    /// keyed by the first column.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if the query fails or a row cannot be mapped.
    pub fn query_as<R: Record>(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Materialized<R>, SqlSessionError> {
        let rows = self.fetch_rows(sql, params)?;
        materialize(&rows)
    }
}
