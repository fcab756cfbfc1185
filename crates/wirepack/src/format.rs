//! Leading-byte table of the wire format.

use crate::value::ValueKind;

/// Leading byte constants.
pub mod code {
    pub const FIXMAP_PREFIX: u8 = 0x80;
    pub const FIXARRAY_PREFIX: u8 = 0x90;
    pub const FIXSTR_PREFIX: u8 = 0xa0;
    pub const NEGFIXINT_PREFIX: u8 = 0xe0;

    pub const NIL: u8 = 0xc0;
    pub const NEVER_USED: u8 = 0xc1;
    pub const FALSE: u8 = 0xc2;
    pub const TRUE: u8 = 0xc3;
    pub const BIN8: u8 = 0xc4;
    pub const BIN16: u8 = 0xc5;
    pub const BIN32: u8 = 0xc6;
    pub const EXT8: u8 = 0xc7;
    pub const EXT16: u8 = 0xc8;
    pub const EXT32: u8 = 0xc9;
    pub const FLOAT32: u8 = 0xca;
    pub const FLOAT64: u8 = 0xcb;
    pub const UINT8: u8 = 0xcc;
    pub const UINT16: u8 = 0xcd;
    pub const UINT32: u8 = 0xce;
    pub const UINT64: u8 = 0xcf;
    pub const INT8: u8 = 0xd0;
    pub const INT16: u8 = 0xd1;
    pub const INT32: u8 = 0xd2;
    pub const INT64: u8 = 0xd3;
    pub const FIXEXT1: u8 = 0xd4;
    pub const FIXEXT2: u8 = 0xd5;
    pub const FIXEXT4: u8 = 0xd6;
    pub const FIXEXT8: u8 = 0xd7;
    pub const FIXEXT16: u8 = 0xd8;
    pub const STR8: u8 = 0xd9;
    pub const STR16: u8 = 0xda;
    pub const STR32: u8 = 0xdb;
    pub const ARRAY16: u8 = 0xdc;
    pub const ARRAY32: u8 = 0xdd;
    pub const MAP16: u8 = 0xde;
    pub const MAP32: u8 = 0xdf;
}

/// Classification of a leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    PositiveFixInt,
    FixMap,
    FixArray,
    FixStr,
    Nil,
    NeverUsed,
    Boolean,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    Float32,
    Float64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegativeFixInt,
}

impl Format {
    /// Classifies any byte. Total: every byte maps to exactly one format.
    pub const fn of(byte: u8) -> Format {
        match byte {
            0x00..=0x7f => Format::PositiveFixInt,
            0x80..=0x8f => Format::FixMap,
            0x90..=0x9f => Format::FixArray,
            0xa0..=0xbf => Format::FixStr,
            code::NIL => Format::Nil,
            code::NEVER_USED => Format::NeverUsed,
            code::FALSE | code::TRUE => Format::Boolean,
            code::BIN8 => Format::Bin8,
            code::BIN16 => Format::Bin16,
            code::BIN32 => Format::Bin32,
            code::EXT8 => Format::Ext8,
            code::EXT16 => Format::Ext16,
            code::EXT32 => Format::Ext32,
            code::FLOAT32 => Format::Float32,
            code::FLOAT64 => Format::Float64,
            code::UINT8 => Format::UInt8,
            code::UINT16 => Format::UInt16,
            code::UINT32 => Format::UInt32,
            code::UINT64 => Format::UInt64,
            code::INT8 => Format::Int8,
            code::INT16 => Format::Int16,
            code::INT32 => Format::Int32,
            code::INT64 => Format::Int64,
            code::FIXEXT1 => Format::FixExt1,
            code::FIXEXT2 => Format::FixExt2,
            code::FIXEXT4 => Format::FixExt4,
            code::FIXEXT8 => Format::FixExt8,
            code::FIXEXT16 => Format::FixExt16,
            code::STR8 => Format::Str8,
            code::STR16 => Format::Str16,
            code::STR32 => Format::Str32,
            code::ARRAY16 => Format::Array16,
            code::ARRAY32 => Format::Array32,
            code::MAP16 => Format::Map16,
            code::MAP32 => Format::Map32,
            0xe0..=0xff => Format::NegativeFixInt,
        }
    }

    /// The value variant this format decodes to; `None` for the reserved byte.
    pub const fn value_kind(self) -> Option<ValueKind> {
        Some(match self {
            Format::Nil => ValueKind::Nil,
            Format::Boolean => ValueKind::Boolean,
            Format::PositiveFixInt
            | Format::NegativeFixInt
            | Format::UInt8
            | Format::UInt16
            | Format::UInt32
            | Format::UInt64
            | Format::Int8
            | Format::Int16
            | Format::Int32
            | Format::Int64 => ValueKind::Integer,
            Format::Float32 | Format::Float64 => ValueKind::Float,
            Format::FixStr | Format::Str8 | Format::Str16 | Format::Str32 => ValueKind::String,
            Format::Bin8 | Format::Bin16 | Format::Bin32 => ValueKind::Binary,
            Format::FixArray | Format::Array16 | Format::Array32 => ValueKind::Array,
            Format::FixMap | Format::Map16 | Format::Map32 => ValueKind::Map,
            Format::FixExt1
            | Format::FixExt2
            | Format::FixExt4
            | Format::FixExt8
            | Format::FixExt16
            | Format::Ext8
            | Format::Ext16
            | Format::Ext32 => ValueKind::Extension,
            Format::NeverUsed => return None,
        })
    }
}
