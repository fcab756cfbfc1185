//! Byte buffers used by the `wirepack` codec.
//!
//! [`Reader`] is a position-tracking cursor over an immutable byte slice whose
//! reads never panic; every read checks the remaining length first.
//! [`Writer`] is an append-only output buffer with a flush mark.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised by [`Reader`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed more bytes than the buffer had left.
    #[error("end of buffer at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    EndOfBuffer {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}
