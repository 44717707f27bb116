use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlSessionError;

/// Values that can be stored in a database row or used as query parameters.
///
/// Parameters are passed as an ordered slice and bound by position:
/// ```rust
/// use sql_session::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Short name of the variant, used in mapping error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "int",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident via $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::$variant($conv(value))
                }
            }
        )*
    };
}

impl_from_scalar! {
    i64 => Int via std::convert::identity,
    i32 => Int via i64::from,
    u32 => Int via i64::from,
    f64 => Float via std::convert::identity,
    bool => Bool via std::convert::identity,
    String => Text via std::convert::identity,
    &str => Text via str::to_owned,
    NaiveDateTime => Timestamp via std::convert::identity,
    JsonValue => JSON via std::convert::identity,
    Vec<u8> => Blob via std::convert::identity,
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Conversion from a column value into a record field's declared type.
///
/// This is the only coercion applied when a row is materialized into a
/// [`Record`](crate::record::Record): whatever the destination type accepts.
pub trait FromRowValue: Sized {
    /// # Errors
    ///
    /// Returns `SqlSessionError::MappingError` when the value cannot be stored in `Self`.
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError>;
}

fn mismatch(expected: &str, value: &RowValues) -> SqlSessionError {
    SqlSessionError::MappingError(format!(
        "cannot store a {} value in a field of type {expected}",
        value.kind()
    ))
}

impl FromRowValue for RowValues {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        Ok(value.clone())
    }
}

impl FromRowValue for i64 {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        match value {
            RowValues::Int(i) => Ok(*i),
            RowValues::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch("i64", other)),
        }
    }
}

impl FromRowValue for i32 {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        let wide = i64::from_row_value(value).map_err(|_| mismatch("i32", value))?;
        i32::try_from(wide)
            .map_err(|_| SqlSessionError::MappingError(format!("{wide} does not fit in i32")))
    }
}

impl FromRowValue for u32 {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        let wide = i64::from_row_value(value).map_err(|_| mismatch("u32", value))?;
        u32::try_from(wide)
            .map_err(|_| SqlSessionError::MappingError(format!("{wide} does not fit in u32")))
    }
}

impl FromRowValue for f64 {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        match value {
            RowValues::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(i) => Ok(*i as f64),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        value.as_bool().copied().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromRowValue for String {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::JSON(j) => Ok(j.to_string()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        match value {
            RowValues::Blob(b) => Ok(b.clone()),
            RowValues::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("NaiveDateTime", value))
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        match value {
            RowValues::JSON(j) => Ok(j.clone()),
            RowValues::Text(s) => serde_json::from_str(s).map_err(|e| {
                SqlSessionError::MappingError(format!("text is not valid JSON: {e}"))
            }),
            RowValues::Null => Ok(JsonValue::Null),
            other => Err(mismatch("serde_json::Value", other)),
        }
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: &RowValues) -> Result<Self, SqlSessionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_value(value).map(Some)
        }
    }
}
