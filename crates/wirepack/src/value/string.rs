use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

use crate::error::{PackError, Result};

/// String payload kept as the exact bytes seen on the wire.
///
/// The bytes are usually UTF-8 but are not required to be; invalid sequences
/// are preserved and re-encoded unchanged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RawString(Bytes);

impl RawString {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        RawString(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_valid_utf8(&self) -> bool {
        std::str::from_utf8(&self.0).is_ok()
    }

    /// Strict view; fails with [`PackError::InvalidUtf8`] on invalid bytes.
    pub fn to_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.0).map_err(|e| PackError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })
    }

    /// Replaces invalid sequences with U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<&str> for RawString {
    fn from(s: &str) -> Self {
        RawString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for RawString {
    fn from(s: String) -> Self {
        RawString(Bytes::from(s))
    }
}

impl From<Bytes> for RawString {
    fn from(b: Bytes) -> Self {
        RawString(b)
    }
}

impl PartialEq<str> for RawString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for RawString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for RawString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Ok(s) => fmt::Debug::fmt(s, f),
            Err(_) => write!(f, "RawString({:?})", self.as_bytes()),
        }
    }
}

impl fmt::Display for RawString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_preserved() {
        let s = RawString::from_bytes(vec![b'a', 0xff, b'b']);
        assert_eq!(s.len(), 3);
        assert!(!s.is_valid_utf8());
        assert_eq!(s.to_str(), Err(PackError::InvalidUtf8 { valid_up_to: 1 }));
        assert_eq!(s.to_string_lossy(), "a\u{fffd}b");
        assert_eq!(s.as_bytes(), &[b'a', 0xff, b'b']);
    }

    #[test]
    fn compares_with_str() {
        let s = RawString::from("héllo");
        assert_eq!(s, "héllo");
        assert_eq!(s.to_str().unwrap(), "héllo");
        assert_eq!(s.len(), 6);
    }
}
