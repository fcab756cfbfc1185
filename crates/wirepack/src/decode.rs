//! Cursor-based decoder for untrusted input.
//!
//! Containers are decoded with an explicit frame stack rather than native
//! recursion, so the nesting bound in [`Limits`] is enforced independently
//! of the host stack size. Every declared length is checked against the
//! configured limit and against the bytes actually remaining before any
//! buffer or container is allocated.

use std::ops::Range;

use bytes::Bytes;
use wirepack_buffers::Reader;

use crate::config::Limits;
use crate::error::{PackError, Result};
use crate::format::{code, Format};
use crate::value::{Array, Extension, Integer, Map, RawString, Value, ValueKind};

/// One leading tag plus its length fields, with payload bytes already
/// skipped.
enum Head {
    Scalar(Value),
    Str(Range<usize>),
    Bin(Range<usize>),
    Ext(i8, Range<usize>),
    Array(usize),
    Map(usize),
}

/// A container under construction.
enum Frame {
    Array {
        items: Vec<Value>,
        remaining: usize,
    },
    Map {
        pairs: Vec<(Value, Value)>,
        key: Option<Value>,
        remaining: usize,
    },
}

impl Frame {
    /// Adds a finished child; true once the container is complete.
    fn accept(&mut self, value: Value) -> bool {
        match self {
            Frame::Array { items, remaining } => {
                items.push(value);
                *remaining -= 1;
                *remaining == 0
            }
            Frame::Map {
                pairs,
                key,
                remaining,
            } => match key.take() {
                None => {
                    *key = Some(value);
                    false
                }
                Some(k) => {
                    pairs.push((k, value));
                    *remaining -= 1;
                    *remaining == 0
                }
            },
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::Array { items, .. } => Value::Array(Array::new(items)),
            Frame::Map { pairs, .. } => Value::Map(Map::new(pairs)),
        }
    }
}

/// Decodes values from an in-memory byte buffer.
///
/// Repeated calls to [`Decoder::decode_value`] yield consecutive top-level
/// values. A failed call leaves the cursor where the call started, so
/// [`Decoder::position`] still reports the start of the offending value and
/// the error itself carries the offset of the failing byte.
///
/// A decoder mutates its cursor on every read and is meant to be owned by
/// one thread at a time.
pub struct Decoder<'a> {
    reader: Reader<'a>,
    source: Option<&'a Bytes>,
    limits: Limits,
    failed: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, Limits::default())
    }

    pub fn with_limits(data: &'a [u8], limits: Limits) -> Self {
        Decoder {
            reader: Reader::new(data),
            source: None,
            limits,
            failed: false,
        }
    }

    /// Decodes from a shared buffer; string, binary and extension payloads
    /// become slices of `data` instead of copies.
    pub fn from_bytes(data: &'a Bytes, limits: Limits) -> Self {
        Decoder {
            reader: Reader::new(data),
            source: Some(data),
            limits,
            failed: false,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn has_next(&self) -> bool {
        !self.reader.is_empty()
    }

    /// Runs `f`, restoring the cursor if it fails.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.reader.position();
        let result = f(self);
        if result.is_err() {
            self.reader.set_position(start);
        }
        result
    }

    /// Decodes the next complete value.
    pub fn decode_value(&mut self) -> Result<Value> {
        self.atomically(Self::read_value)
    }

    /// Skips the next complete value without materializing it.
    pub fn skip_value(&mut self) -> Result<()> {
        self.atomically(Self::skip)
    }

    /// Format of the next value, without consuming it.
    pub fn peek_format(&self) -> Result<Format> {
        Ok(Format::of(self.reader.peek()?))
    }

    fn read_value(&mut self) -> Result<Value> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let mut value = match self.head(stack.len())? {
                Head::Scalar(v) => v,
                Head::Str(range) => Value::String(RawString::from_bytes(self.payload(range))),
                Head::Bin(range) => Value::Binary(self.payload(range)),
                Head::Ext(tag, range) => Value::Extension(Extension::new(tag, self.payload(range))),
                Head::Array(0) => Value::Array(Array::default()),
                Head::Map(0) => Value::Map(Map::default()),
                Head::Array(n) => {
                    stack.push(Frame::Array {
                        items: Vec::with_capacity(n),
                        remaining: n,
                    });
                    continue;
                }
                Head::Map(n) => {
                    stack.push(Frame::Map {
                        pairs: Vec::with_capacity(n),
                        key: None,
                        remaining: n,
                    });
                    continue;
                }
            };
            loop {
                let Some(mut frame) = stack.pop() else {
                    return Ok(value);
                };
                if frame.accept(value) {
                    value = frame.finish();
                } else {
                    stack.push(frame);
                    break;
                }
            }
        }
    }

    fn skip(&mut self) -> Result<()> {
        // Items still owed by each open container.
        let mut stack: Vec<usize> = Vec::new();
        loop {
            let children = match self.head(stack.len())? {
                Head::Array(n) => n,
                Head::Map(n) => n.saturating_mul(2),
                _ => 0,
            };
            if children > 0 {
                stack.push(children);
                continue;
            }
            loop {
                let Some(owed) = stack.last_mut() else {
                    return Ok(());
                };
                *owed -= 1;
                if *owed > 0 {
                    break;
                }
                stack.pop();
            }
        }
    }

    fn payload(&self, range: Range<usize>) -> Bytes {
        match self.source {
            Some(bytes) => bytes.slice(range),
            None => Bytes::copy_from_slice(&self.reader.data()[range]),
        }
    }

    /// Reads one tag and its length fields. `depth` is the number of
    /// currently open containers.
    fn head(&mut self, depth: usize) -> Result<Head> {
        let offset = self.reader.position();
        let byte = self.reader.u8()?;
        let head = match Format::of(byte) {
            Format::PositiveFixInt => Head::Scalar(Value::from(byte)),
            Format::NegativeFixInt => Head::Scalar(Value::from(byte as i8)),
            Format::Nil => Head::Scalar(Value::Nil),
            Format::NeverUsed => return Err(PackError::MalformedTag { byte, offset }),
            Format::Boolean => Head::Scalar(Value::Boolean(byte == code::TRUE)),
            Format::Float32 => Head::Scalar(Value::Float(self.reader.f32()? as f64)),
            Format::Float64 => Head::Scalar(Value::Float(self.reader.f64()?)),
            Format::UInt8 => Head::Scalar(Value::from(self.reader.u8()?)),
            Format::UInt16 => Head::Scalar(Value::from(self.reader.u16()?)),
            Format::UInt32 => Head::Scalar(Value::from(self.reader.u32()?)),
            Format::UInt64 => Head::Scalar(Value::from(self.reader.u64()?)),
            Format::Int8 => Head::Scalar(Value::from(self.reader.i8()?)),
            Format::Int16 => Head::Scalar(Value::from(self.reader.i16()?)),
            Format::Int32 => Head::Scalar(Value::from(self.reader.i32()?)),
            Format::Int64 => Head::Scalar(Value::from(self.reader.i64()?)),
            Format::FixStr => Head::Str(self.raw(offset, (byte & 0x1f) as usize)?),
            Format::Str8 | Format::Bin8 | Format::Ext8 => {
                let len = self.reader.u8()? as usize;
                self.sized(byte, offset, len)?
            }
            Format::Str16 | Format::Bin16 | Format::Ext16 => {
                let len = self.reader.u16()? as usize;
                self.sized(byte, offset, len)?
            }
            Format::Str32 | Format::Bin32 | Format::Ext32 => {
                let len = self.reader.u32()? as usize;
                self.sized(byte, offset, len)?
            }
            Format::FixExt1 => self.ext(offset, 1)?,
            Format::FixExt2 => self.ext(offset, 2)?,
            Format::FixExt4 => self.ext(offset, 4)?,
            Format::FixExt8 => self.ext(offset, 8)?,
            Format::FixExt16 => self.ext(offset, 16)?,
            Format::FixArray => {
                self.enter(offset, depth)?;
                self.array_head(offset, (byte & 0x0f) as usize)?
            }
            Format::Array16 => {
                self.enter(offset, depth)?;
                let n = self.reader.u16()? as usize;
                self.array_head(offset, n)?
            }
            Format::Array32 => {
                self.enter(offset, depth)?;
                let n = self.reader.u32()? as usize;
                self.array_head(offset, n)?
            }
            Format::FixMap => {
                self.enter(offset, depth)?;
                self.map_head(offset, (byte & 0x0f) as usize)?
            }
            Format::Map16 => {
                self.enter(offset, depth)?;
                let n = self.reader.u16()? as usize;
                self.map_head(offset, n)?
            }
            Format::Map32 => {
                self.enter(offset, depth)?;
                let n = self.reader.u32()? as usize;
                self.map_head(offset, n)?
            }
        };
        Ok(head)
    }

    fn sized(&mut self, byte: u8, offset: usize, len: usize) -> Result<Head> {
        match byte {
            code::STR8 | code::STR16 | code::STR32 => Ok(Head::Str(self.raw(offset, len)?)),
            code::BIN8 | code::BIN16 | code::BIN32 => Ok(Head::Bin(self.raw(offset, len)?)),
            _ => self.ext(offset, len),
        }
    }

    fn ext(&mut self, offset: usize, len: usize) -> Result<Head> {
        let tag = self.reader.i8()?;
        Ok(Head::Ext(tag, self.raw(offset, len)?))
    }

    fn check_length(&self, offset: usize, length: usize) -> Result<()> {
        if length > self.limits.max_length {
            return Err(PackError::LimitExceeded {
                offset,
                length,
                max_length: self.limits.max_length,
            });
        }
        Ok(())
    }

    /// Skips over a payload of `len` bytes and returns its range.
    fn raw(&mut self, offset: usize, len: usize) -> Result<Range<usize>> {
        self.check_length(offset, len)?;
        let start = self.reader.position();
        self.reader.skip(len)?;
        Ok(start..start + len)
    }

    fn enter(&self, offset: usize, depth: usize) -> Result<()> {
        if depth >= self.limits.max_depth {
            return Err(PackError::NestingTooDeep {
                offset,
                max_depth: self.limits.max_depth,
            });
        }
        Ok(())
    }

    /// Validates a container count against the limit and the remaining
    /// input; every item needs at least one byte.
    fn container(&self, offset: usize, count: usize, min_bytes: usize) -> Result<()> {
        self.check_length(offset, count)?;
        self.reader.ensure(min_bytes)?;
        Ok(())
    }

    fn array_head(&self, offset: usize, n: usize) -> Result<Head> {
        self.container(offset, n, n)?;
        Ok(Head::Array(n))
    }

    fn map_head(&self, offset: usize, n: usize) -> Result<Head> {
        self.container(offset, n, n.saturating_mul(2))?;
        Ok(Head::Map(n))
    }

    fn unexpected(&self, byte: u8, offset: usize, expected: ValueKind) -> PackError {
        match Format::of(byte).value_kind() {
            Some(actual) => PackError::TypeMismatch { expected, actual },
            None => PackError::MalformedTag { byte, offset },
        }
    }

    pub fn read_nil(&mut self) -> Result<()> {
        self.atomically(|d| {
            let offset = d.reader.position();
            match d.reader.u8()? {
                code::NIL => Ok(()),
                byte => Err(d.unexpected(byte, offset, ValueKind::Nil)),
            }
        })
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.atomically(|d| {
            let offset = d.reader.position();
            match d.reader.u8()? {
                code::TRUE => Ok(true),
                code::FALSE => Ok(false),
                byte => Err(d.unexpected(byte, offset, ValueKind::Boolean)),
            }
        })
    }

    /// Reads an integer of any width.
    pub fn read_integer(&mut self) -> Result<Integer> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.peek()?;
            if Format::of(byte).value_kind() != Some(ValueKind::Integer) {
                return Err(d.unexpected(byte, offset, ValueKind::Integer));
            }
            match d.head(0)? {
                Head::Scalar(Value::Integer(n)) => Ok(n),
                _ => Err(d.unexpected(byte, offset, ValueKind::Integer)),
            }
        })
    }

    /// Reads a float32 or float64.
    pub fn read_float(&mut self) -> Result<f64> {
        self.atomically(|d| {
            let offset = d.reader.position();
            match d.reader.u8()? {
                code::FLOAT32 => Ok(d.reader.f32()? as f64),
                code::FLOAT64 => Ok(d.reader.f64()?),
                byte => Err(d.unexpected(byte, offset, ValueKind::Float)),
            }
        })
    }

    /// Reads an array header and returns the element count. The elements
    /// follow as separate values.
    pub fn read_array_header(&mut self) -> Result<usize> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.u8()?;
            let n = match byte {
                0x90..=0x9f => (byte & 0x0f) as usize,
                code::ARRAY16 => d.reader.u16()? as usize,
                code::ARRAY32 => d.reader.u32()? as usize,
                _ => return Err(d.unexpected(byte, offset, ValueKind::Array)),
            };
            d.container(offset, n, n)?;
            Ok(n)
        })
    }

    /// Reads a map header and returns the pair count.
    pub fn read_map_header(&mut self) -> Result<usize> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.u8()?;
            let n = match byte {
                0x80..=0x8f => (byte & 0x0f) as usize,
                code::MAP16 => d.reader.u16()? as usize,
                code::MAP32 => d.reader.u32()? as usize,
                _ => return Err(d.unexpected(byte, offset, ValueKind::Map)),
            };
            d.container(offset, n, n.saturating_mul(2))?;
            Ok(n)
        })
    }

    /// Reads a string header and returns the payload length. Read the
    /// payload with [`Decoder::read_payload`].
    pub fn read_string_header(&mut self) -> Result<usize> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.u8()?;
            let n = match byte {
                0xa0..=0xbf => (byte & 0x1f) as usize,
                code::STR8 => d.reader.u8()? as usize,
                code::STR16 => d.reader.u16()? as usize,
                code::STR32 => d.reader.u32()? as usize,
                _ => return Err(d.unexpected(byte, offset, ValueKind::String)),
            };
            d.check_length(offset, n)?;
            Ok(n)
        })
    }

    pub fn read_binary_header(&mut self) -> Result<usize> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.u8()?;
            let n = match byte {
                code::BIN8 => d.reader.u8()? as usize,
                code::BIN16 => d.reader.u16()? as usize,
                code::BIN32 => d.reader.u32()? as usize,
                _ => return Err(d.unexpected(byte, offset, ValueKind::Binary)),
            };
            d.check_length(offset, n)?;
            Ok(n)
        })
    }

    /// Reads an extension header and returns `(type_tag, payload_length)`.
    pub fn read_extension_header(&mut self) -> Result<(i8, usize)> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let byte = d.reader.u8()?;
            let n = match byte {
                code::FIXEXT1 => 1,
                code::FIXEXT2 => 2,
                code::FIXEXT4 => 4,
                code::FIXEXT8 => 8,
                code::FIXEXT16 => 16,
                code::EXT8 => d.reader.u8()? as usize,
                code::EXT16 => d.reader.u16()? as usize,
                code::EXT32 => d.reader.u32()? as usize,
                _ => return Err(d.unexpected(byte, offset, ValueKind::Extension)),
            };
            d.check_length(offset, n)?;
            let tag = d.reader.i8()?;
            Ok((tag, n))
        })
    }

    /// Reads `len` raw payload bytes following a string, binary or
    /// extension header.
    pub fn read_payload(&mut self, len: usize) -> Result<Bytes> {
        self.atomically(|d| {
            let offset = d.reader.position();
            let range = d.raw(offset, len)?;
            Ok(d.payload(range))
        })
    }
}

/// Yields consecutive top-level values; stops after the first error.
impl Iterator for Decoder<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.has_next() {
            return None;
        }
        let result = self.decode_value();
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_consumes_one_byte() {
        let data = [0xc0, 0xc3];
        let mut decoder = Decoder::new(&data);
        assert_eq!(decoder.decode_value().unwrap(), Value::Nil);
        assert_eq!(decoder.position(), 1);
        assert_eq!(decoder.decode_value().unwrap(), Value::Boolean(true));
        assert!(!decoder.has_next());
    }

    #[test]
    fn empty_input_is_insufficient() {
        let mut decoder = Decoder::new(&[]);
        assert_eq!(
            decoder.decode_value(),
            Err(PackError::InsufficientInput {
                offset: 0,
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn failure_restores_position() {
        // [1, "ab" truncated]
        let data = [0x01, 0x92, 0x01, 0xa2, b'a'];
        let mut decoder = Decoder::new(&data);
        decoder.decode_value().unwrap();
        let err = decoder.decode_value().unwrap_err();
        assert_eq!(err.offset(), Some(4));
        assert_eq!(decoder.position(), 1);
    }

    #[test]
    fn hostile_lengths_fail_before_allocation() {
        // array32 claiming u32::MAX elements, no elements follow
        let data = [0xdd, 0xff, 0xff, 0xff, 0xff];
        let err = Decoder::new(&data).decode_value().unwrap_err();
        assert_eq!(
            err,
            PackError::InsufficientInput {
                offset: 5,
                needed: u32::MAX as usize,
                remaining: 0
            }
        );

        // map16 claiming 2 pairs with only 3 bytes left
        let data = [0xde, 0x00, 0x02, 0x01, 0x02, 0x03];
        let err = Decoder::new(&data).decode_value().unwrap_err();
        assert!(matches!(err, PackError::InsufficientInput { needed: 4, .. }));

        // str32 claiming 1 GiB
        let data = [0xdb, 0x40, 0x00, 0x00, 0x00, b'x'];
        let err = Decoder::new(&data).decode_value().unwrap_err();
        assert!(matches!(err, PackError::InsufficientInput { offset: 5, .. }));
    }

    #[test]
    fn max_length_is_enforced() {
        let data = [0xa3, b'a', b'b', b'c'];
        let limits = Limits::default().with_max_length(2);
        let err = Decoder::with_limits(&data, limits).decode_value().unwrap_err();
        assert_eq!(
            err,
            PackError::LimitExceeded {
                offset: 0,
                length: 3,
                max_length: 2
            }
        );
    }

    #[test]
    fn reserved_byte_is_malformed() {
        let data = [0x91, 0xc1];
        let err = Decoder::new(&data).decode_value().unwrap_err();
        assert_eq!(err, PackError::MalformedTag { byte: 0xc1, offset: 1 });
    }

    #[test]
    fn skip_walks_nested_values() {
        // {"a": [1, {"b": nil}]}, 7
        let data = [0x81, 0xa1, b'a', 0x92, 0x01, 0x81, 0xa1, b'b', 0xc0, 0x07];
        let mut decoder = Decoder::new(&data);
        decoder.skip_value().unwrap();
        assert_eq!(decoder.position(), 9);
        assert_eq!(decoder.decode_value().unwrap(), Value::from(7));
    }

    #[test]
    fn header_reads() {
        let data = [0x93, 0xa2, b'h', b'i', 0xc4, 0x01, 0xff, 0xd4, 0x05, 0x2a];
        let mut decoder = Decoder::new(&data);
        assert_eq!(decoder.read_array_header().unwrap(), 3);
        assert_eq!(decoder.peek_format().unwrap(), Format::FixStr);
        assert!(decoder.read_map_header().is_err());
        assert_eq!(decoder.position(), 1);
        let n = decoder.read_string_header().unwrap();
        assert_eq!(&decoder.read_payload(n).unwrap()[..], b"hi");
        let n = decoder.read_binary_header().unwrap();
        assert_eq!(&decoder.read_payload(n).unwrap()[..], [0xff]);
        let (tag, n) = decoder.read_extension_header().unwrap();
        assert_eq!((tag, n), (5, 1));
        assert_eq!(&decoder.read_payload(n).unwrap()[..], [0x2a]);
        assert!(!decoder.has_next());
    }

    #[test]
    fn typed_reads_report_mismatch() {
        let data = [0xcd, 0x01, 0x00, 0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0, 0xc2, 0xc0];
        let mut decoder = Decoder::new(&data);
        assert_eq!(
            decoder.read_bool(),
            Err(PackError::TypeMismatch {
                expected: ValueKind::Boolean,
                actual: ValueKind::Integer
            })
        );
        assert_eq!(decoder.read_integer().unwrap(), Integer::from(256u16));
        assert!(decoder.read_integer().is_err());
        assert_eq!(decoder.read_float().unwrap(), 1.5);
        assert!(!decoder.read_bool().unwrap());
        decoder.read_nil().unwrap();
    }

    #[test]
    fn zero_copy_payloads() {
        let data = Bytes::from_static(&[0xa3, b'a', b'b', b'c']);
        let mut decoder = Decoder::from_bytes(&data, Limits::default());
        let value = decoder.decode_value().unwrap();
        let s = value.as_string().unwrap().clone().into_bytes();
        assert_eq!(s.as_ptr(), data[1..].as_ptr());
    }

    #[test]
    fn iterator_stops_after_error() {
        let data = [0x01, 0x02, 0xc1, 0x03];
        let decoded: Vec<_> = Decoder::new(&data).collect();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], Ok(Value::from(1)));
        assert_eq!(decoded[1], Ok(Value::from(2)));
        assert!(decoded[2].is_err());
    }

    #[test]
    fn iterator_adapters_over_map_and_array_values() {
        let data = [0x81, 0xa1, b'k', 0x90, 0xdc, 0x00, 0x01, 0xc3, 0xde, 0x00, 0x00];
        let kinds: Vec<ValueKind> = Decoder::new(&data)
            .map(|value| value.unwrap().kind())
            .collect();
        assert_eq!(kinds, [ValueKind::Map, ValueKind::Array, ValueKind::Map]);
    }
}
