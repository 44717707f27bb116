use std::fmt::Write;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlSessionError;
use crate::types::RowValues;

// Thread-local buffer for timestamp formatting
thread_local! {
    static TIMESTAMP_BUF: std::cell::RefCell<String> = std::cell::RefCell::new(String::with_capacity(32));
}

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => TIMESTAMP_BUF.with(|buf| {
            let mut borrow = buf.borrow_mut();
            borrow.clear();
            // Writing into a String cannot fail.
            let _ = write!(borrow, "{}", dt.format("%F %T%.f"));
            Value::Text(borrow.clone())
        }),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Convert a rusqlite `Value` read from a row back into `RowValues`.
#[must_use]
pub fn sqlite_value_to_row_value(value: Value) -> RowValues {
    match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    }
}

/// Positional parameters converted for `SQLite`.
#[derive(Debug, Clone, PartialEq)]
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert middleware row values into `SQLite` values.
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Params(params.iter().map(row_value_to_sqlite_value).collect())
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bind `params` to the placeholders of `stmt`, first value to placeholder 1.
///
/// The argument count must equal the statement's placeholder count; a mismatch
/// is reported here, before anything runs.
///
/// # Errors
///
/// Returns `SqlSessionError::ParameterError` on an arity mismatch and
/// `SqlSessionError::DriverError` if the driver rejects a value.
pub fn bind_params(stmt: &mut Statement<'_>, params: &[RowValues]) -> Result<(), SqlSessionError> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(SqlSessionError::ParameterError(format!(
            "statement has {expected} placeholder(s) but {} argument(s) were supplied",
            params.len()
        )));
    }
    for (idx, value) in Params::convert(params).0.into_iter().enumerate() {
        stmt.raw_bind_parameter(idx + 1, value)?;
    }
    Ok(())
}
