use std::fmt;

use rusqlite::{Connection, OpenFlags, Statement};

use crate::config::{SessionOptions, SessionOptionsBuilder, Target, parse_url};
use crate::error::SqlSessionError;
use crate::params::bind_params;
use crate::results::{BufferedRows, SqliteCursor};
use crate::types::RowValues;
use crate::validate::{StatementKind, validate_statement};

use super::tx::TxState;

/// One open database connection plus its transaction state.
///
/// Every call blocks until the driver answers. A session is meant for a single
/// caller; methods take `&mut self`, so sharing one across threads needs
/// external synchronization.
pub struct Session {
    pub(crate) conn: Option<Connection>,
    pub(crate) tx_state: TxState,
    url: String,
}

impl Session {
    /// Open a session on `url`.
    ///
    /// `user` and `password` are kept for callers written against
    /// credential-based databases; `SQLite` does not use them.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError::ConfigError` for an unsupported URL and
    /// `SqlSessionError::ConnectionError` if the database cannot be opened.
    pub fn open(url: &str, user: &str, password: &str) -> Result<Self, SqlSessionError> {
        Self::open_with(SessionOptions::new(url).with_credentials(user, password))
    }

    #[must_use]
    pub fn builder(url: impl Into<String>) -> SessionOptionsBuilder {
        SessionOptionsBuilder::new(url)
    }

    /// Open a session from [`SessionOptions`].
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError::ConfigError` for an unsupported URL and
    /// `SqlSessionError::ConnectionError` if the database cannot be opened.
    pub fn open_with(opts: SessionOptions) -> Result<Self, SqlSessionError> {
        let target = parse_url(&opts.url)?;
        if opts.user.is_some() {
            tracing::debug!(url = %opts.url, "sqlite ignores connection credentials");
        }

        let flags = if opts.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        };
        let opened = match &target {
            Target::Memory => Connection::open_in_memory_with_flags(flags),
            Target::Path(path) => Connection::open_with_flags(path, flags),
            Target::Uri(uri) => Connection::open_with_flags(uri, flags),
        };
        let conn = opened.map_err(|e| {
            SqlSessionError::ConnectionError(format!("failed to open {}: {e}", opts.url))
        })?;
        conn.busy_timeout(opts.busy_timeout()).map_err(|e| {
            SqlSessionError::ConnectionError(format!("failed to configure {}: {e}", opts.url))
        })?;

        tracing::debug!(url = %opts.url, read_only = opts.read_only, "session opened");
        Ok(Self {
            conn: Some(conn),
            tx_state: TxState::Autocommit,
            url: opts.url,
        })
    }

    /// Close the connection.
    ///
    /// Closing an already closed session does nothing. An open transaction is
    /// rolled back by the driver.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError::DriverError` if the driver fails to close; the
    /// session then stays open so the call can be retried.
    pub fn close(&mut self) -> Result<(), SqlSessionError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.tx_state == TxState::InTransaction {
            tracing::warn!(url = %self.url, "closing session with an open transaction");
        }
        match conn.close() {
            Ok(()) => {
                self.tx_state = TxState::Autocommit;
                tracing::debug!(url = %self.url, "session closed");
                Ok(())
            }
            Err((conn, err)) => {
                self.conn = Some(conn);
                Err(SqlSessionError::DriverError(err))
            }
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run raw `rusqlite` logic against the connection.
    ///
    /// Statements run here skip validation. The transaction state is re-read
    /// from the driver afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError::ConnectionError` if the session is closed, or
    /// whatever `func` returns.
    pub fn with_connection<F, R>(&mut self, func: F) -> Result<R, SqlSessionError>
    where
        F: FnOnce(&mut Connection) -> Result<R, SqlSessionError>,
    {
        let conn = self.conn.as_mut().ok_or_else(closed)?;
        let result = func(conn);
        self.sync_tx_state();
        result
    }

    pub(crate) fn conn(&self) -> Result<&Connection, SqlSessionError> {
        self.conn.as_ref().ok_or_else(closed)
    }

    /// Validate, prepare, and bind `sql`, then hand the statement to `run`.
    ///
    /// After `run` succeeds the statement is finalized; a finalize failure at
    /// that point is logged and swallowed. When `run` fails its error is
    /// returned and the statement is simply dropped. Either way the
    /// transaction state is re-read from the driver, since a statement can end
    /// a transaction on its own (a trigger raising `ROLLBACK`, for one).
    pub(crate) fn with_statement<F, T>(
        &mut self,
        sql: &str,
        params: &[RowValues],
        run: F,
    ) -> Result<T, SqlSessionError>
    where
        F: FnOnce(StatementKind, &mut Statement<'_>) -> Result<T, SqlSessionError>,
    {
        let kind = validate_statement(sql)?;
        let result = self.run_statement(kind, sql, params, run);
        self.sync_tx_state();
        result
    }

    fn run_statement<F, T>(
        &self,
        kind: StatementKind,
        sql: &str,
        params: &[RowValues],
        run: F,
    ) -> Result<T, SqlSessionError>
    where
        F: FnOnce(StatementKind, &mut Statement<'_>) -> Result<T, SqlSessionError>,
    {
        let conn = self.conn()?;
        tracing::debug!(%kind, params = params.len(), in_tx = self.tx_state.is_open(), "executing statement");
        let mut stmt = conn.prepare(sql)?;
        bind_params(&mut stmt, params)?;
        let out = run(kind, &mut stmt)?;
        if let Err(e) = stmt.finalize() {
            tracing::warn!(error = %e, %kind, "statement finalize failed after success");
        }
        Ok(out)
    }

    /// Run a query and hand its live cursor to `consume`.
    ///
    /// A statement without result columns is refused before it is stepped.
    pub(crate) fn with_cursor<F, T>(
        &mut self,
        sql: &str,
        params: &[RowValues],
        consume: F,
    ) -> Result<T, SqlSessionError>
    where
        F: FnOnce(&mut SqliteCursor<'_>) -> Result<T, SqlSessionError>,
    {
        self.with_statement(sql, params, |kind, stmt| {
            if stmt.column_count() == 0 {
                return Err(SqlSessionError::InvalidStatement(format!(
                    "{kind} statement does not return rows; use update, insert, or delete"
                )));
            }
            let mut cursor = SqliteCursor::open(stmt);
            consume(&mut cursor)
        })
    }

    /// Run a query and buffer every row.
    pub(crate) fn fetch_rows(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<BufferedRows, SqlSessionError> {
        self.with_cursor(sql, params, |cursor| BufferedRows::drain(cursor))
    }
}

fn closed() -> SqlSessionError {
    SqlSessionError::ConnectionError("session is closed".into())
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(url = %self.url, error = %e, "failed to close session on drop");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.url)
            .field("open", &self.conn.is_some())
            .field("tx_state", &self.tx_state)
            .finish()
    }
}
