//! Binary buffer reader with cursor tracking.

use crate::BufferError;

/// A binary buffer reader over a borrowed byte slice.
///
/// The reader keeps a cursor position. Every read is bounds-checked and
/// returns [`BufferError::EndOfBuffer`] instead of panicking; a failed read
/// leaves the cursor where it was.
///
/// # Example
///
/// ```
/// use wirepack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// The whole underlying buffer, independent of the cursor.
    pub fn data(&self) -> &'a [u8] {
        self.uint8
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.x
    }

    /// Moves the cursor to `x`, clamped to the end of the buffer.
    #[inline]
    pub fn set_position(&mut self, x: usize) {
        self.x = x.min(self.uint8.len());
    }

    /// Number of bytes between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.uint8.len() - self.x
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless `n` more bytes are available from the cursor.
    #[inline]
    pub fn ensure(&self, n: usize) -> Result<(), BufferError> {
        let remaining = self.remaining();
        if n > remaining {
            Err(BufferError::EndOfBuffer {
                offset: self.x,
                needed: n,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Returns the byte under the cursor without advancing.
    #[inline]
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.ensure(1)?;
        Ok(self.uint8[self.x])
    }

    /// Advances the cursor by `length` bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.ensure(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns the next `size` bytes and advances past them.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.ensure(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.uint8[start..self.x])
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.array::<1>().map(|b| b[0])
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        self.array::<1>().map(i8::from_be_bytes)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array::<2>().map(u16::from_be_bytes)
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        self.array::<2>().map(i16::from_be_bytes)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array::<4>().map(u32::from_be_bytes)
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        self.array::<4>().map(i32::from_be_bytes)
    }

    /// Reads an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.array::<8>().map(u64::from_be_bytes)
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        self.array::<8>().map(i64::from_be_bytes)
    }

    /// Reads a 32-bit IEEE 754 float (big-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.array::<4>().map(f32::from_be_bytes)
    }

    /// Reads a 64-bit IEEE 754 float (big-endian).
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.array::<8>().map(f64::from_be_bytes)
    }
}
