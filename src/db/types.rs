//! Query result types for sqlgauge.
//!
//! Defines the structures used to represent rows fetched from a SQLite
//! database. `Value` implements value equality and hashing so that whole rows
//! can participate in set comparison (see `db::compare`).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single cell value, covering SQLite's five storage classes.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// INTEGER storage class (up to i64).
    Int(i64),

    /// REAL storage class.
    Float(f64),

    /// TEXT storage class.
    Text(String),

    /// BLOB storage class.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a display string (used for sample-row output).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// Bit pattern used for REAL equality and hashing. Collapses -0.0 into 0.0
/// so the two compare and hash identically.
fn canonical_bits(f: f64) -> u64 {
    if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

/// True when a REAL holds an exact integer representable as i64.
fn as_integral(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// Equality bridges INTEGER and integral REAL (the engine's dynamic typing
// makes `SELECT 1` and `SELECT 1.0` interchangeable in gold queries), but
// never coerces TEXT to a numeric. NULL equals NULL so that identical
// NULL-bearing rows dedupe to one set member.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                as_integral(*b) == Some(*a)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

// Hash must agree with the equality above: an integral REAL hashes exactly
// like the corresponding INTEGER.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Int(i) => {
                state.write_u8(1);
                state.write_i64(*i);
            }
            Value::Float(f) => match as_integral(*f) {
                Some(i) => {
                    state.write_u8(1);
                    state.write_i64(i);
                }
                None => {
                    state.write_u8(2);
                    state.write_u64(canonical_bits(*f));
                }
            },
            Value::Text(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Value::Blob(b) => {
                state.write_u8(4);
                b.hash(state);
            }
        }
    }
}

// Conversion implementations for common types

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
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

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// The outcome of executing a single SQL statement.
///
/// Engine-level failures are captured in `error` rather than raised: a broken
/// candidate query is a routine scoring outcome, not an exceptional one.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// All materialized result rows, in engine order.
    pub rows: Vec<Row>,

    /// Wall-clock time spent in execute+fetch (connection setup excluded).
    pub elapsed: Duration,

    /// Engine error message, if the statement was rejected.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Creates a successful result.
    pub fn success(rows: Vec<Row>, elapsed: Duration) -> Self {
        Self {
            rows,
            elapsed,
            error: None,
        }
    }

    /// Creates a failed result carrying the engine's error message.
    pub fn failure(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            rows: Vec::new(),
            elapsed,
            error: Some(message.into()),
        }
    }

    /// Returns true if the statement executed without an engine error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
