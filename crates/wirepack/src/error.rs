use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised by the decoder, the encoder and typed value accessors.
///
/// Structural variants ([`PackError::is_structural`]) mean the input cannot
/// be trusted and the whole message should be dropped. The remaining
/// variants come from accessors and conversions and are recoverable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("malformed tag 0x{byte:02x} at offset {offset}")]
    MalformedTag { byte: u8, offset: usize },

    #[error("insufficient input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    InsufficientInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("nesting deeper than {max_depth} at offset {offset}")]
    NestingTooDeep { offset: usize, max_depth: usize },

    #[error("declared length {length} at offset {offset} exceeds limit {max_length}")]
    LimitExceeded {
        offset: usize,
        length: usize,
        max_length: usize,
    },

    #[error("{remaining} trailing bytes after value at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    #[error("expected {expected} value, found {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("{value} does not fit in {target}")]
    NumericOverflow { target: &'static str, value: String },

    #[error("length {length} exceeds the format maximum of 4294967295")]
    LengthOverflow { length: usize },

    #[error("string payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("invalid timestamp extension: {0}")]
    InvalidTimestamp(String),
}

impl PackError {
    /// Byte offset in the input where decoding failed, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            PackError::MalformedTag { offset, .. }
            | PackError::InsufficientInput { offset, .. }
            | PackError::NestingTooDeep { offset, .. }
            | PackError::LimitExceeded { offset, .. }
            | PackError::TrailingBytes { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// True when the input itself is untrustworthy.
    pub fn is_structural(&self) -> bool {
        self.offset().is_some()
    }

    pub(crate) fn overflow(target: &'static str, value: impl ToString) -> Self {
        PackError::NumericOverflow {
            target,
            value: value.to_string(),
        }
    }
}

impl From<wirepack_buffers::BufferError> for PackError {
    fn from(err: wirepack_buffers::BufferError) -> Self {
        match err {
            wirepack_buffers::BufferError::EndOfBuffer {
                offset,
                needed,
                remaining,
            } => PackError::InsufficientInput {
                offset,
                needed,
                remaining,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
