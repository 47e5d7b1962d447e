use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values carried between the application, the interceptor chain, and the
/// wrapped driver.
///
/// One enum serves both sides of value conversion: callers may hand in the
/// narrow variants (`Int32`, `UInt16`, `Float32`, ...), while drivers are
/// only ever handed the canonical ones (`Int`, `Float`, `Text`, `Bool`,
/// `Timestamp`, `Null`, `Json`, `Blob`) after the conversion adapter has
/// run. The same enum is used for result rows coming back out.
///
/// ```rust
/// use sql_intercept::Value;
///
/// let params = vec![
///     Value::Int(1),
///     Value::Text("alice".into()),
///     Value::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer, widened to `Int` by default conversion
    Int8(i8),
    /// 16-bit signed integer, widened to `Int` by default conversion
    Int16(i16),
    /// 32-bit signed integer, widened to `Int` by default conversion
    Int32(i32),
    /// Integer value (64-bit, the canonical driver representation)
    Int(i64),
    /// 8-bit unsigned integer, widened to `Int` by default conversion
    UInt8(u8),
    /// 16-bit unsigned integer, widened to `Int` by default conversion
    UInt16(u16),
    /// 32-bit unsigned integer, widened to `Int` by default conversion
    UInt32(u32),
    /// 64-bit unsigned integer; default conversion rejects values that do
    /// not fit the canonical signed representation
    UInt64(u64),
    /// 32-bit float, widened to `Float` by default conversion
    Float32(f32),
    /// Floating point value (64-bit, the canonical driver representation)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    Json(JsonValue),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value is already in a canonical driver representation
    /// (no widening required).
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        !matches!(
            self,
            Self::Int8(_)
                | Self::Int16(_)
                | Self::Int32(_)
                | Self::UInt8(_)
                | Self::UInt16(_)
                | Self::UInt32(_)
                | Self::UInt64(_)
                | Self::Float32(_)
        )
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let Value::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let Value::Bool(value) = self {
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
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let Value::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS", then with fractional seconds
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::Json(v)
    }
}

/// A single call argument: a value plus its 1-based position and optional
/// parameter name. This is the unit the conversion adapter and
/// [`ValueChecker`](crate::driver::ValueChecker) operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    /// Parameter name, if the statement binds by name
    pub name: Option<String>,
    /// 1-based argument position
    pub ordinal: usize,
    /// The argument value
    pub value: Value,
}

impl NamedValue {
    /// A positional argument.
    #[must_use]
    pub fn positional(ordinal: usize, value: Value) -> Self {
        Self {
            name: None,
            ordinal,
            value,
        }
    }

    /// A named argument.
    #[must_use]
    pub fn named(name: impl Into<String>, ordinal: usize, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            ordinal,
            value,
        }
    }
}

/// Build a positional argument list from plain values, assigning 1-based
/// ordinals in order.
#[must_use]
pub fn positional_args<I>(values: I) -> Vec<NamedValue>
where
    I: IntoIterator<Item = Value>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| NamedValue::positional(i + 1, value))
        .collect()
}

/// Result of a DML execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutcome {
    /// Number of rows affected by the statement
    pub rows_affected: u64,
    /// Identifier of the last inserted row, when the engine reports one
    pub last_insert_id: Option<i64>,
}

/// Column metadata reported by cursors that support type introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    /// Column name
    pub name: String,
    /// Engine-specific type name (e.g. `TEXT`, `INT8`)
    pub type_name: String,
    /// Whether the column is nullable, when the engine reports it
    pub nullable: Option<bool>,
}
