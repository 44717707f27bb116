//! Mapping result rows onto caller-defined record types.
//!
//! A record declares which of its fields take which columns (usually through
//! [`impl_record!`](crate::impl_record)). Materializing a result builds one
//! record per row and returns either that single record, when the result has
//! exactly one row, or a map keyed by each row's first column.

mod macros;

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::SqlSessionError;
use crate::results::{BufferedRows, Row, RowCursor};
use crate::types::RowValues;

/// A type rows can be materialized into.
pub trait Record: Sized {
    /// Create an empty record before any column is assigned.
    ///
    /// # Errors
    ///
    /// Implementations may refuse construction; the error aborts materialization.
    fn construct() -> Result<Self, SqlSessionError>;

    /// Offer one column value to the record.
    ///
    /// Returns `Ok(true)` when a field named `column` took the value and
    /// `Ok(false)` when no field has that name.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError` when the matching field cannot hold `value`.
    fn assign(&mut self, column: &str, value: &RowValues) -> Result<bool, SqlSessionError>;

    /// Column names this record accepts, in lookup precedence order.
    fn column_names() -> Vec<&'static str>;

    /// Name used in error messages.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// First-column value used to key materialized records.
///
/// Any value kind can be a key. Floats compare by bit pattern and JSON by its
/// serialized text, so equal keys always hash alike.
#[derive(Debug, Clone)]
pub struct RecordKey(RowValues);

impl RecordKey {
    #[must_use]
    pub fn value(&self) -> &RowValues {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> RowValues {
        self.0
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (RowValues::Float(a), RowValues::Float(b)) => a.to_bits() == b.to_bits(),
            (RowValues::JSON(a), RowValues::JSON(b)) => a.to_string() == b.to_string(),
            (a, b) => a == b,
        }
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            RowValues::Int(i) => i.hash(state),
            RowValues::Float(f) => f.to_bits().hash(state),
            RowValues::Text(s) => s.hash(state),
            RowValues::Bool(b) => b.hash(state),
            RowValues::Timestamp(ts) => ts.hash(state),
            RowValues::Null => {}
            RowValues::JSON(j) => j.to_string().hash(state),
            RowValues::Blob(b) => b.hash(state),
        }
    }
}

impl<T: Into<RowValues>> From<T> for RecordKey {
    fn from(value: T) -> Self {
        RecordKey(value.into())
    }
}

/// Records built from a result.
#[derive(Debug, Clone)]
pub enum Materialized<R> {
    /// The result had exactly one row.
    Single(R),
    /// The result had zero rows or more than one. Keyed by the first column of
    /// each row; a later row replaces an earlier one with an equal key.
    Keyed(IndexMap<RecordKey, R>),
}

impl<R> Materialized<R> {
    #[must_use]
    pub fn is_single(&self) -> bool {
        matches!(self, Materialized::Single(_))
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Materialized::Single(_) => 1,
            Materialized::Keyed(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn single(&self) -> Option<&R> {
        match self {
            Materialized::Single(record) => Some(record),
            Materialized::Keyed(_) => None,
        }
    }

    #[must_use]
    pub fn into_single(self) -> Option<R> {
        match self {
            Materialized::Single(record) => Some(record),
            Materialized::Keyed(_) => None,
        }
    }

    #[must_use]
    pub fn keyed(&self) -> Option<&IndexMap<RecordKey, R>> {
        match self {
            Materialized::Keyed(map) => Some(map),
            Materialized::Single(_) => None,
        }
    }

    #[must_use]
    pub fn into_keyed(self) -> Option<IndexMap<RecordKey, R>> {
        match self {
            Materialized::Keyed(map) => Some(map),
            Materialized::Single(_) => None,
        }
    }

    /// Look up a keyed record. Always `None` for a single record.
    pub fn get(&self, key: impl Into<RecordKey>) -> Option<&R> {
        self.keyed().and_then(|map| map.get(&key.into()))
    }

    /// All records, in key insertion order for a keyed result.
    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        match self {
            Materialized::Single(record) => vec![record],
            Materialized::Keyed(map) => map.into_values().collect(),
        }
    }
}

fn build_record<R: Record>(row: &Row) -> Result<R, SqlSessionError> {
    let mut record = R::construct().map_err(|e| {
        SqlSessionError::MappingError(format!("cannot construct {}: {e}", R::record_name()))
    })?;
    for (column, value) in row.iter() {
        let taken = record
            .assign(column, value)
            .map_err(|e| SqlSessionError::RowMappingError {
                column: column.to_string(),
                source: Box::new(e),
            })?;
        if !taken {
            tracing::trace!(column, record = R::record_name(), "no field for column");
        }
    }
    Ok(record)
}

/// Build records of type `R` from buffered rows.
///
/// Exactly one row gives [`Materialized::Single`]; zero rows give an empty
/// [`Materialized::Keyed`]; more rows give a map keyed by each row's first
/// column, where a later row overwrites an earlier one with an equal key.
/// Uniqueness of that key is not checked.
///
/// # Errors
///
/// Any construction or field conversion failure aborts the whole call with a
/// mapping error; no partial result is returned.
pub fn materialize<R: Record>(rows: &BufferedRows) -> Result<Materialized<R>, SqlSessionError> {
    match rows.len() {
        0 => Ok(Materialized::Keyed(IndexMap::new())),
        1 => {
            let row = rows.get(0).ok_or_else(|| {
                SqlSessionError::MappingError("buffered row vanished".to_string())
            })?;
            build_record(row).map(Materialized::Single)
        }
        n => {
            let mut keyed = IndexMap::with_capacity(n);
            for row in rows {
                let key = row.get_by_index(0).cloned().unwrap_or(RowValues::Null);
                keyed.insert(RecordKey(key), build_record(row)?);
            }
            Ok(Materialized::Keyed(keyed))
        }
    }
}

/// Drain `cursor` and build records of type `R`; see [`materialize`].
///
/// # Errors
///
/// Returns a mapping error if the cursor fails or a record cannot be built.
pub fn materialize_cursor<R: Record, C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> Result<Materialized<R>, SqlSessionError> {
    let rows = BufferedRows::drain(cursor)?;
    materialize(&rows)
}
