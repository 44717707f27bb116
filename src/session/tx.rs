use crate::error::{SqlSessionError, TxOp};

use super::Session;

/// Whether statements commit on their own or inside an explicit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxState {
    #[default]
    Autocommit,
    InTransaction,
}

impl TxState {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == TxState::InTransaction
    }
}

impl Session {
    /// Leave autocommit mode. Transactions do not nest.
    ///
    /// # Errors
    /// Returns `SqlSessionError::TransactionError` if a transaction is already
    /// open or the driver refuses to start one.
    pub fn begin(&mut self) -> Result<(), SqlSessionError> {
        if self.tx_state.is_open() {
            return Err(SqlSessionError::tx_state(
                TxOp::Begin,
                "SQLite transaction already in progress",
            ));
        }
        self.run_tx_command(TxOp::Begin, "BEGIN")
    }

    /// Commit the open transaction and return to autocommit mode.
    ///
    /// # Errors
    /// Returns `SqlSessionError::TransactionError` if no transaction is open or
    /// the commit fails. On a failed commit the state follows the driver.
    pub fn commit(&mut self) -> Result<(), SqlSessionError> {
        if !self.tx_state.is_open() {
            return Err(SqlSessionError::tx_state(TxOp::Commit, "SQLite transaction not active"));
        }
        self.run_tx_command(TxOp::Commit, "COMMIT")
    }

    /// Roll back the open transaction and return to autocommit mode.
    ///
    /// # Errors
    /// Returns `SqlSessionError::TransactionError` if no transaction is open or
    /// the rollback fails. On a failed rollback the state follows the driver.
    pub fn rollback(&mut self) -> Result<(), SqlSessionError> {
        if !self.tx_state.is_open() {
            return Err(SqlSessionError::tx_state(
                TxOp::Rollback,
                "SQLite transaction not active",
            ));
        }
        self.run_tx_command(TxOp::Rollback, "ROLLBACK")
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.tx_state.is_open()
    }

    #[must_use]
    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok`, rolls back when it returns `Err`. A
    /// failed rollback is logged; the error from `body` is what the caller sees.
    ///
    /// # Errors
    /// Returns the error from `begin`, `body`, or `commit`.
    pub fn transaction<F, R>(&mut self, body: F) -> Result<R, SqlSessionError>
    where
        F: FnOnce(&mut Session) -> Result<R, SqlSessionError>,
    {
        self.begin()?;
        match body(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                if self.tx_state.is_open()
                    && let Err(rollback_err) = self.rollback()
                {
                    tracing::warn!(error = %rollback_err, "rollback after failed transaction body failed");
                }
                Err(err)
            }
        }
    }

    fn run_tx_command(&mut self, op: TxOp, sql: &str) -> Result<(), SqlSessionError> {
        let result = self.conn()?.execute_batch(sql);
        match result {
            Ok(()) => {
                self.tx_state = match op {
                    TxOp::Begin => TxState::InTransaction,
                    TxOp::Commit | TxOp::Rollback => TxState::Autocommit,
                };
                tracing::debug!(%op, "transaction state changed");
                Ok(())
            }
            Err(e) => {
                self.sync_tx_state();
                Err(SqlSessionError::tx_driver(op, e))
            }
        }
    }

    /// Take the transaction state from the driver's autocommit flag.
    pub(crate) fn sync_tx_state(&mut self) {
        if let Some(conn) = &self.conn {
            self.tx_state = if conn.is_autocommit() {
                TxState::Autocommit
            } else {
                TxState::InTransaction
            };
        }
    }
}
