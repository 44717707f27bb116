use rusqlite::{Batch, Connection};

use crate::error::SqlSessionError;
use crate::types::RowValues;
use crate::validate::{StatementKind, validate_statement};

use super::Session;

/// Returned by `update`/`delete` when no row changed and by `insert` when no
/// key was generated.
pub const NO_ROWS: i64 = -1;

fn rows_or_sentinel(affected: usize) -> i64 {
    if affected == 0 {
        NO_ROWS
    } else {
        i64::try_from(affected).unwrap_or(i64::MAX)
    }
}

impl Session {
    /// Execute a statement and return the driver's affected-row count.
    ///
    /// Schema statements report zero rows.
    fn execute_dml(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<(StatementKind, usize), SqlSessionError> {
        self.with_statement(sql, params, |kind, stmt| {
            let affected = stmt.raw_execute()?;
            let affected = match kind {
                StatementKind::Create | StatementKind::Drop | StatementKind::Alter => 0,
                _ => affected,
            };
            Ok((kind, affected))
        })
    }

    /// Run an UPDATE (or any allowed statement) and return the rows affected,
    /// or [`NO_ROWS`] when none were.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, binding, or execution fails.
    pub fn update(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, SqlSessionError> {
        let (_, affected) = self.execute_dml(sql, params)?;
        Ok(rows_or_sentinel(affected))
    }

    /// Run a DELETE and return the rows affected, or [`NO_ROWS`] when none were.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, binding, or execution fails.
    pub fn delete(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, SqlSessionError> {
        let (_, affected) = self.execute_dml(sql, params)?;
        Ok(rows_or_sentinel(affected))
    }

    /// Run an INSERT and return the generated row id, or [`NO_ROWS`] when
    /// nothing was inserted.
    ///
    /// Only `INSERT INTO` statements generate keys; any other allowed statement
    /// runs and returns [`NO_ROWS`]. A key counts as generated only when the
    /// connection's last row id moved, so an upsert that took its `DO UPDATE`
    /// branch reports [`NO_ROWS`]. Re-inserting a row under the same id as the
    /// previous insert is indistinguishable from that case.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation, binding, or execution fails.
    pub fn insert(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, SqlSessionError> {
        let before = self.conn.as_ref().map(Connection::last_insert_rowid);
        let (kind, affected) = self.execute_dml(sql, params)?;
        if kind != StatementKind::InsertInto || affected == 0 {
            return Ok(NO_ROWS);
        }
        let after = self.conn()?.last_insert_rowid();
        if before == Some(after) {
            tracing::debug!(rowid = after, "insert changed rows without a new key");
            return Ok(NO_ROWS);
        }
        Ok(after)
    }

    /// Run a script of several statements, such as schema setup.
    ///
    /// Each statement is checked against the allow-list before it is stepped;
    /// the first one that fails stops the script. Outside a transaction the
    /// script runs atomically in its own transaction; inside one it joins it,
    /// and statements before a failure stay applied.
    ///
    /// # Errors
    /// Returns `SqlSessionError` if validation fails or any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlSessionError> {
        let kind = validate_statement(sql)?;
        let in_tx = self.tx_state.is_open();
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| SqlSessionError::ConnectionError("session is closed".into()))?;
        tracing::debug!(%kind, in_tx, "executing batch");
        let result = if in_tx {
            run_script(conn, sql)
        } else {
            conn.transaction()
                .map_err(SqlSessionError::from)
                .and_then(|tx| {
                    run_script(&tx, sql)?;
                    tx.commit()?;
                    Ok(())
                })
        };
        self.sync_tx_state();
        result
    }
}

/// Step every statement of `sql` once, validating each before it runs.
fn run_script(conn: &Connection, sql: &str) -> Result<(), SqlSessionError> {
    let mut batch = Batch::new(conn, sql);
    while let Some(mut stmt) = batch.next()? {
        let text = stmt.expanded_sql().ok_or_else(|| {
            SqlSessionError::InvalidStatement("statement text unavailable in batch".into())
        })?;
        let kind = validate_statement(&text)?;
        tracing::trace!(%kind, "batch statement");
        // One step, like `Connection::execute_batch`; rows from a SELECT are ignored.
        stmt.raw_query().next()?;
    }
    Ok(())
}
