use thiserror::Error;

/// Transaction transition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOp {
    Begin,
    Commit,
    Rollback,
}

impl std::fmt::Display for TxOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TxOp::Begin => "begin",
            TxOp::Commit => "commit",
            TxOp::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SqlSessionError {
    #[error("Invalid SQL statement: {0}")]
    InvalidStatement(String),

    #[error(transparent)]
    DriverError(#[from] rusqlite::Error),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Transaction {op} failed: {reason}")]
    TransactionError {
        op: TxOp,
        reason: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("Mapping error on column `{column}`: {source}")]
    RowMappingError {
        column: String,
        #[source]
        source: Box<SqlSessionError>,
    },

    #[error("Mapping error: failed to read result rows: {0}")]
    RowReadError(#[source] Box<SqlSessionError>),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SqlSessionError {
    pub(crate) fn tx_driver(op: TxOp, source: rusqlite::Error) -> Self {
        SqlSessionError::TransactionError {
            op,
            reason: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn tx_state(op: TxOp, reason: &str) -> Self {
        SqlSessionError::TransactionError {
            op,
            reason: reason.to_string(),
            source: None,
        }
    }

    /// Wrap an error raised while reading the rows of a result.
    ///
    /// The underlying cause stays reachable through `source()`.
    pub(crate) fn mapping(cause: SqlSessionError) -> Self {
        match cause {
            already @ (SqlSessionError::MappingError(_)
            | SqlSessionError::RowMappingError { .. }
            | SqlSessionError::RowReadError(_)) => already,
            other => SqlSessionError::RowReadError(Box::new(other)),
        }
    }

    /// Classify a cursor failure by how far reading got.
    ///
    /// Before the first row the statement itself failed, so the cause is
    /// returned unchanged; after it, the failure is a mapping error.
    pub(crate) fn cursor_failure(cause: SqlSessionError, rows_read: usize) -> Self {
        if rows_read == 0 {
            cause
        } else {
            SqlSessionError::mapping(cause)
        }
    }

    /// True for every error raised while turning rows into a table or records.
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(
            self,
            SqlSessionError::MappingError(_)
                | SqlSessionError::RowMappingError { .. }
                | SqlSessionError::RowReadError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SqlSessionError>;
