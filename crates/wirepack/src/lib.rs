//! MessagePack value model and codec.
//!
//! Values are immutable trees. [`Decoder`] walks untrusted input with an
//! explicit frame stack under caller-supplied [`Limits`]; [`Encoder`] emits
//! the canonical (narrowest) encoding of a value.
//!
//! ```
//! use wirepack::{Limits, Value};
//!
//! let value = Value::from_pairs([("a", Value::from(1)), ("b", Value::from(vec![Value::from(2), Value::Nil]))]);
//! let bytes = wirepack::encode(&value).unwrap();
//! assert_eq!(wirepack::decode(&bytes, Limits::default()).unwrap(), value);
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
mod json;
pub mod value;

pub use config::{ConfigError, Limits};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{PackError, Result};
pub use format::Format;
pub use value::{
    Array, Extension, Integer, Map, Number, RawString, Timestamp, Value, ValueKind,
};

/// Decodes a whole message holding exactly one value.
pub fn decode(bytes: &[u8], limits: Limits) -> Result<Value> {
    let mut decoder = Decoder::with_limits(bytes, limits);
    let value = decoder.decode_value()?;
    if decoder.has_next() {
        return Err(PackError::TrailingBytes {
            offset: decoder.position(),
            remaining: decoder.remaining(),
        });
    }
    Ok(value)
}

/// Decodes the first value of `bytes`, returning it with the number of
/// bytes it occupied.
pub fn decode_prefix(bytes: &[u8], limits: Limits) -> Result<(Value, usize)> {
    let mut decoder = Decoder::with_limits(bytes, limits);
    let value = decoder.decode_value()?;
    Ok((value, decoder.position()))
}

pub fn encode(value: &Value) -> Result<Vec<u8>> {
    Encoder::new().encode(value)
}
