//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{SessionOptions, SessionOptionsBuilder};
pub use crate::error::{SqlSessionError, TxOp};
pub use crate::impl_record;
pub use crate::record::{Materialized, Record, RecordKey, materialize, materialize_cursor};
pub use crate::results::{
    BufferedRows, QueryResult, ResultTable, Row, RowCursor, build_result_table,
};
pub use crate::session::{NO_ROWS, Session, TxState};
pub use crate::types::{FromRowValue, RowValues};
pub use crate::validate::{StatementKind, validate_statement};
