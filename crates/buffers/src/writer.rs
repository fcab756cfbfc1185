//! Binary buffer writer.

/// An append-only output buffer.
///
/// Bytes written since the last [`Writer::flush`] form the pending chunk.
/// [`Writer::truncate`] drops pending bytes back to an earlier cursor, which
/// lets an encoder discard a partially written value.
///
/// # Example
///
/// ```
/// use wirepack_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    uint8: Vec<u8>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a writer with a small initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Current cursor position (pending byte count).
    #[inline]
    pub fn position(&self) -> usize {
        self.uint8.len()
    }

    /// Bytes written since the last flush.
    pub fn pending(&self) -> &[u8] {
        &self.uint8
    }

    /// Drops everything written after cursor `x`.
    pub fn truncate(&mut self, x: usize) {
        self.uint8.truncate(x);
    }

    /// Discards pending bytes.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Returns the pending bytes and starts a new chunk.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Returns the bytes written after cursor `x`, leaving earlier pending
    /// bytes in place.
    pub fn split_off(&mut self, x: usize) -> Vec<u8> {
        let x = x.min(self.uint8.len());
        self.uint8.split_off(x)
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.uint8.push(val as u8);
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a u8 followed by a u8.
    pub fn u8u8(&mut self, tag: u8, val: u8) {
        self.uint8.extend_from_slice(&[tag, val]);
    }

    /// Writes a u8 followed by a u16 (big-endian).
    pub fn u8u16(&mut self, tag: u8, val: u16) {
        self.u8(tag);
        self.u16(val);
    }

    /// Writes a u8 followed by a u32 (big-endian).
    pub fn u8u32(&mut self, tag: u8, val: u32) {
        self.u8(tag);
        self.u32(val);
    }

    /// Writes a u8 followed by a u64 (big-endian).
    pub fn u8u64(&mut self, tag: u8, val: u64) {
        self.u8(tag);
        self.u64(val);
    }

    /// Writes a u8 followed by a f32 (big-endian).
    pub fn u8f32(&mut self, tag: u8, val: f32) {
        self.u8(tag);
        self.f32(val);
    }

    /// Writes a u8 followed by a f64 (big-endian).
    pub fn u8f64(&mut self, tag: u8, val: f64) {
        self.u8(tag);
        self.f64(val);
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        self.uint8.extend_from_slice(buf);
    }
}
