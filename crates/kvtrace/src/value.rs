//! Storable value types
//!
//! The backing store flattens everything to byte strings, so each variant
//! carries its own byte encoding (numbers as decimal text, matching what a
//! Redis client sends on the wire).

use std::fmt;

/// A value that can be stored in the cache
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text: stored as its raw bytes
    Text(String),
    /// Opaque byte sequence: stored as-is
    Bytes(Vec<u8>),
    /// Signed integer: stored as decimal text
    Int(i64),
    /// Floating-point number: stored as decimal text
    Float(f64),
}

impl Value {
    /// Encode to the byte representation the store receives
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Value::Text(s) => s.clone().into_bytes(),
            Value::Bytes(b) => b.clone(),
            Value::Int(i) => i.to_string().into_bytes(),
            Value::Float(f) => f.to_string().into_bytes(),
        }
    }
}

/// Display form used for call-history records: quoted text, `b"..."` for
/// bytes, bare decimals for numbers. Lossy on purpose (a trace line, not a
/// serialization format), but unambiguous across the four variants.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
