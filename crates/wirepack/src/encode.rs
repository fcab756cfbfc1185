//! Canonical encoder.
//!
//! Every integer, length and float is written with the narrowest tag that
//! represents it exactly, so the same value tree always produces the same
//! bytes. Map pairs are written in wire order, never re-sorted.

use wirepack_buffers::Writer;

use crate::error::{PackError, Result};
use crate::format::{code, Format};
use crate::value::{Extension, Integer, Value};

const MAX_LENGTH: usize = u32::MAX as usize;

fn check_length(length: usize) -> Result<()> {
    if length > MAX_LENGTH {
        Err(PackError::LengthOverflow { length })
    } else {
        Ok(())
    }
}

pub struct Encoder {
    writer: Writer,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes one value and returns its bytes. Output queued earlier by
    /// the `write_*` methods stays pending for the next [`Encoder::flush`].
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>> {
        let mark = self.writer.position();
        self.write_value(value)?;
        Ok(self.writer.split_off(mark))
    }

    /// Returns everything written since the last flush.
    pub fn flush(&mut self) -> Vec<u8> {
        self.writer.flush()
    }

    /// Appends one value. On failure nothing of the value is left behind.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let mark = self.writer.position();
        let result = self.write_tree(value);
        if result.is_err() {
            self.writer.truncate(mark);
        }
        result
    }

    fn write_tree(&mut self, root: &Value) -> Result<()> {
        let mut stack: Vec<&Value> = vec![root];
        while let Some(value) = stack.pop() {
            match value {
                Value::Nil => self.write_nil(),
                Value::Boolean(b) => self.write_bool(*b),
                Value::Integer(n) => self.write_integer(*n),
                Value::Float(f) => self.write_f64(*f),
                Value::String(s) => self.write_raw_str(s.as_bytes())?,
                Value::Binary(b) => self.write_bin(b)?,
                Value::Extension(ext) => self.write_ext(ext)?,
                Value::Array(items) => {
                    self.write_array_header(items.len())?;
                    stack.extend(items.iter().rev());
                }
                Value::Map(map) => {
                    self.write_map_header(map.len())?;
                    for (k, v) in map.pairs().iter().rev() {
                        stack.push(v);
                        stack.push(k);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn write_nil(&mut self) {
        self.writer.u8(code::NIL);
    }

    pub fn write_bool(&mut self, b: bool) {
        self.writer.u8(if b { code::TRUE } else { code::FALSE });
    }

    /// Writes `n` with the tag chosen by [`Integer::most_succinct_format`].
    pub fn write_integer(&mut self, n: Integer) {
        // Two's complement bits; truncating them yields the big-endian payload.
        let bits = match n.split() {
            Ok(u) => u,
            Err(i) => i as u64,
        };
        match n.most_succinct_format() {
            Format::PositiveFixInt | Format::NegativeFixInt => self.writer.u8(bits as u8),
            Format::UInt8 => self.writer.u8u8(code::UINT8, bits as u8),
            Format::UInt16 => self.writer.u8u16(code::UINT16, bits as u16),
            Format::UInt32 => self.writer.u8u32(code::UINT32, bits as u32),
            Format::Int8 => self.writer.u8u8(code::INT8, bits as u8),
            Format::Int16 => self.writer.u8u16(code::INT16, bits as u16),
            Format::Int32 => self.writer.u8u32(code::INT32, bits as u32),
            Format::Int64 => self.writer.u8u64(code::INT64, bits),
            _ => self.writer.u8u64(code::UINT64, bits),
        }
    }

    pub fn write_u64(&mut self, u: u64) {
        self.write_integer(Integer::from(u));
    }

    pub fn write_i64(&mut self, i: i64) {
        self.write_integer(Integer::from(i));
    }

    /// Writes float32 when `f` survives an f32 round trip bit for bit,
    /// float64 otherwise.
    pub fn write_f64(&mut self, f: f64) {
        let narrow = f as f32;
        if (narrow as f64).to_bits() == f.to_bits() {
            self.writer.u8f32(code::FLOAT32, narrow);
        } else {
            self.writer.u8f64(code::FLOAT64, f);
        }
    }

    pub fn write_f32(&mut self, f: f32) {
        self.writer.u8f32(code::FLOAT32, f);
    }

    pub fn write_str_header(&mut self, length: usize) -> Result<()> {
        check_length(length)?;
        if length <= 0x1f {
            self.writer.u8(code::FIXSTR_PREFIX | length as u8);
        } else if length <= 0xff {
            self.writer.u8u8(code::STR8, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(code::STR16, length as u16);
        } else {
            self.writer.u8u32(code::STR32, length as u32);
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_raw_str(s.as_bytes())
    }

    /// Writes string bytes as-is; they need not be valid UTF-8.
    pub fn write_raw_str(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_str_header(bytes.len())?;
        self.writer.buf(bytes);
        Ok(())
    }

    pub fn write_bin_header(&mut self, length: usize) -> Result<()> {
        check_length(length)?;
        if length <= 0xff {
            self.writer.u8u8(code::BIN8, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(code::BIN16, length as u16);
        } else {
            self.writer.u8u32(code::BIN32, length as u32);
        }
        Ok(())
    }

    pub fn write_bin(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_bin_header(bytes.len())?;
        self.writer.buf(bytes);
        Ok(())
    }

    pub fn write_array_header(&mut self, length: usize) -> Result<()> {
        check_length(length)?;
        if length <= 0x0f {
            self.writer.u8(code::FIXARRAY_PREFIX | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(code::ARRAY16, length as u16);
        } else {
            self.writer.u8u32(code::ARRAY32, length as u32);
        }
        Ok(())
    }

    pub fn write_map_header(&mut self, length: usize) -> Result<()> {
        check_length(length)?;
        if length <= 0x0f {
            self.writer.u8(code::FIXMAP_PREFIX | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(code::MAP16, length as u16);
        } else {
            self.writer.u8u32(code::MAP32, length as u32);
        }
        Ok(())
    }

    pub fn write_ext_header(&mut self, type_tag: i8, length: usize) -> Result<()> {
        check_length(length)?;
        match length {
            1 => self.writer.u8(code::FIXEXT1),
            2 => self.writer.u8(code::FIXEXT2),
            4 => self.writer.u8(code::FIXEXT4),
            8 => self.writer.u8(code::FIXEXT8),
            16 => self.writer.u8(code::FIXEXT16),
            n if n <= 0xff => self.writer.u8u8(code::EXT8, n as u8),
            n if n <= 0xffff => self.writer.u8u16(code::EXT16, n as u16),
            n => self.writer.u8u32(code::EXT32, n as u32),
        }
        self.writer.i8(type_tag);
        Ok(())
    }

    pub fn write_ext(&mut self, ext: &Extension) -> Result<()> {
        self.write_ext_header(ext.type_tag(), ext.len())?;
        self.writer.buf(ext.data());
        Ok(())
    }
}
