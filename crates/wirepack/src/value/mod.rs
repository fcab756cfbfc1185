//! The immutable value model.
//!
//! [`Value`] is a closed set of variants. Callers ask what a value is with
//! [`Value::kind`] or the `is_*` predicates and borrow its payload with the
//! `as_*` accessors, which fail with [`PackError::TypeMismatch`] instead of
//! coercing.

mod array;
mod extension;
mod integer;
mod map;
mod number;
mod string;
mod timestamp;

pub use array::Array;
pub use extension::Extension;
pub use integer::Integer;
pub use map::Map;
pub use number::Number;
pub use string::RawString;
pub use timestamp::Timestamp;

use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;

use crate::error::{PackError, Result};

/// Variant discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Binary,
    Array,
    Map,
    Extension,
}

impl ValueKind {
    pub fn is_number(self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }

    /// String or binary.
    pub fn is_raw(self) -> bool {
        matches!(self, ValueKind::String | ValueKind::Binary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Binary => "binary",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::Extension => "extension",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded or application-built value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(Integer),
    Float(f64),
    String(RawString),
    Binary(Bytes),
    Array(Array),
    Map(Map),
    Extension(Extension),
}

macro_rules! number_conversions {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<$ty> {
                self.as_number()?.$name()
            }
        )*
    };
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Extension(_) => ValueKind::Extension,
        }
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Value::Binary(bytes.into())
    }

    /// A string value from raw bytes, which need not be valid UTF-8.
    pub fn string_bytes(bytes: impl Into<Bytes>) -> Self {
        Value::String(RawString::from_bytes(bytes))
    }

    pub fn extension(type_tag: i8, data: impl Into<Bytes>) -> Self {
        Value::Extension(Extension::new(type_tag, data))
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(pairs.into_iter().collect())
    }

    fn mismatch(&self, expected: ValueKind) -> PackError {
        PackError::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_number(&self) -> bool {
        self.kind().is_number()
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    pub fn is_raw(&self) -> bool {
        self.kind().is_raw()
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, Value::Extension(_))
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch(ValueKind::Boolean)),
        }
    }

    pub fn as_integer(&self) -> Result<Integer> {
        match self {
            Value::Integer(n) => Ok(*n),
            _ => Err(self.mismatch(ValueKind::Integer)),
        }
    }

    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            _ => Err(self.mismatch(ValueKind::Float)),
        }
    }

    /// Either number-like variant.
    pub fn as_number(&self) -> Result<Number> {
        match self {
            Value::Integer(n) => Ok(Number::Integer(*n)),
            Value::Float(f) => Ok(Number::Float(*f)),
            // Integer is reported as the expected kind for any non-number.
            _ => Err(self.mismatch(ValueKind::Integer)),
        }
    }

    pub fn as_string(&self) -> Result<&RawString> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch(ValueKind::String)),
        }
    }

    /// The string payload as `&str`; fails on non-strings and invalid UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        self.as_string()?.to_str()
    }

    pub fn as_binary(&self) -> Result<&[u8]> {
        match self {
            Value::Binary(b) => Ok(&b[..]),
            _ => Err(self.mismatch(ValueKind::Binary)),
        }
    }

    /// Payload bytes of a string or binary value.
    pub fn as_raw(&self) -> Result<&[u8]> {
        match self {
            Value::String(s) => Ok(s.as_bytes()),
            Value::Binary(b) => Ok(&b[..]),
            _ => Err(self.mismatch(ValueKind::Binary)),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Value::Array(a) => Ok(a),
            _ => Err(self.mismatch(ValueKind::Array)),
        }
    }

    pub fn as_map(&self) -> Result<&Map> {
        match self {
            Value::Map(m) => Ok(m),
            _ => Err(self.mismatch(ValueKind::Map)),
        }
    }

    pub fn as_extension(&self) -> Result<&Extension> {
        match self {
            Value::Extension(e) => Ok(e),
            _ => Err(self.mismatch(ValueKind::Extension)),
        }
    }

    pub fn as_timestamp(&self) -> Result<Timestamp> {
        Timestamp::try_from(self.as_extension()?)
    }

    number_conversions! {
        to_i8 => i8,
        to_i16 => i16,
        to_i32 => i32,
        to_i64 => i64,
        to_u8 => u8,
        to_u16 => u16,
        to_u32 => u32,
        to_u64 => u64,
        to_f32 => f32,
        to_f64 => f64,
    }
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        // Bit pattern: NaN equals itself and 0.0 != -0.0.
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Binary(a), Value::Binary(b)) => a == b,
        (Value::Extension(a), Value::Extension(b)) => a == b,
        _ => false,
    }
}

/// Tears down nested containers from a heap worklist so that dropping a
/// deep tree does not recurse.
fn dismantle(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(mut items) => pending.append(&mut items.take_items()),
            Value::Map(mut map) => {
                for (k, v) in map.take_pairs() {
                    pending.push(k);
                    pending.push(v);
                }
            }
            _ => {}
        }
    }
}

// Containers are compared with an explicit worklist; nesting depth does not
// grow the call stack.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            match (a, b) {
                (Value::Array(x), Value::Array(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    pending.extend(x.iter().zip(y.iter()));
                }
                (Value::Map(x), Value::Map(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    // Same unique keys in the same order: compare values pairwise.
                    if !x.has_duplicate_keys() && x.keys().eq(y.keys()) {
                        pending.extend(x.values().zip(y.values()));
                    } else if x != y {
                        return false;
                    }
                }
                _ => {
                    if !scalar_eq(a, b) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending = vec![self];
        while let Some(value) = pending.pop() {
            value.kind().hash(state);
            match value {
                Value::Nil => {}
                Value::Boolean(b) => b.hash(state),
                Value::Integer(n) => n.hash(state),
                Value::Float(f) => f.to_bits().hash(state),
                Value::String(s) => s.hash(state),
                Value::Binary(b) => b.hash(state),
                Value::Array(items) => {
                    state.write_usize(items.len());
                    pending.extend(items.iter().rev());
                }
                Value::Map(m) => m.hash(state),
                Value::Extension(e) => e.hash(state),
            }
        }
    }
}

impl fmt::Display for Value {
    /// Compact JSON rendering, see [`Value::to_json`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Value::Integer(Integer::from(n))
            }
        })*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(RawString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(RawString::from(s))
    }
}

impl From<RawString> for Value {
    fn from(s: RawString) -> Self {
        Value::String(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from(items))
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<Extension> for Value {
    fn from(e: Extension) -> Self {
        Value::Extension(e)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Extension(Extension::from(ts))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_fail_on_wrong_kind() {
        let v = Value::from("hi");
        assert_eq!(v.kind(), ValueKind::String);
        assert_eq!(v.as_str().unwrap(), "hi");
        assert_eq!(v.as_raw().unwrap(), b"hi");
        assert_eq!(
            v.as_integer(),
            Err(PackError::TypeMismatch {
                expected: ValueKind::Integer,
                actual: ValueKind::String
            })
        );
        assert!(v.as_map().is_err());
        assert!(v.as_binary().is_err());
        assert!(Value::Nil.as_boolean().is_err());
    }

    #[test]
    fn number_extraction_narrows() {
        assert_eq!(Value::from(300).to_i16().unwrap(), 300);
        assert!(Value::from(300).to_i8().is_err());
        assert_eq!(Value::from(2.5).to_i32().unwrap(), 2);
        assert_eq!(Value::from(7u8).to_f64().unwrap(), 7.0);
        assert!(Value::from(true).to_i32().is_err());
        assert!(Value::from(1).is_number());
        assert!(Value::from(1.0).is_number());
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn option_and_iter_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some(3)), Value::from(3u64));
        let arr: Value = (1..=3).map(Value::from).collect();
        assert_eq!(arr.as_array().unwrap().len(), 3);
        let map = Value::from_pairs([("a", 1), ("b", 2)]);
        assert_eq!(map.as_map().unwrap().get_str("b"), Some(&Value::from(2)));
    }

    #[test]
    fn kind_classification() {
        assert!(ValueKind::Float.is_number());
        assert!(!ValueKind::String.is_number());
        assert!(ValueKind::Binary.is_raw());
        assert!(!ValueKind::Extension.is_raw());
        assert_eq!(ValueKind::Extension.to_string(), "extension");
    }
}
