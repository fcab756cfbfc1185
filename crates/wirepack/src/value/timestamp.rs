//! The standard timestamp extension (type `-1`).
//!
//! Only a helper for applications: the decoder hands timestamps out as plain
//! [`Extension`] values and never interprets the tag itself.

use crate::error::{PackError, Result};
use crate::value::Extension;

/// Seconds since the Unix epoch plus a nanosecond adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    pub const EXT_TYPE: i8 = -1;

    pub fn new(seconds: i64, nanos: u32) -> Result<Self> {
        if nanos >= 1_000_000_000 {
            return Err(PackError::InvalidTimestamp(format!(
                "nanoseconds {nanos} out of range"
            )));
        }
        Ok(Timestamp { seconds, nanos })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }
}

impl From<Timestamp> for Extension {
    /// Picks the 32-, 64- or 96-bit layout, narrowest first.
    fn from(ts: Timestamp) -> Self {
        let data = if ts.seconds >> 34 == 0 {
            let packed = ((ts.nanos as u64) << 34) | ts.seconds as u64;
            if packed >> 32 == 0 {
                (packed as u32).to_be_bytes().to_vec()
            } else {
                packed.to_be_bytes().to_vec()
            }
        } else {
            let mut data = Vec::with_capacity(12);
            data.extend_from_slice(&ts.nanos.to_be_bytes());
            data.extend_from_slice(&ts.seconds.to_be_bytes());
            data
        };
        Extension::new(Timestamp::EXT_TYPE, data)
    }
}

impl TryFrom<&Extension> for Timestamp {
    type Error = PackError;

    fn try_from(ext: &Extension) -> Result<Self> {
        if ext.type_tag() != Timestamp::EXT_TYPE {
            return Err(PackError::InvalidTimestamp(format!(
                "extension type {} is not a timestamp",
                ext.type_tag()
            )));
        }
        let data = ext.data();
        match *data {
            [a, b, c, d] => Ok(Timestamp {
                seconds: u32::from_be_bytes([a, b, c, d]) as i64,
                nanos: 0,
            }),
            [a, b, c, d, e, f, g, h] => {
                let packed = u64::from_be_bytes([a, b, c, d, e, f, g, h]);
                Timestamp::new((packed & 0x3_ffff_ffff) as i64, (packed >> 34) as u32)
            }
            [a, b, c, d, ref rest @ ..] if rest.len() == 8 => {
                let mut secs = [0u8; 8];
                secs.copy_from_slice(rest);
                Timestamp::new(i64::from_be_bytes(secs), u32::from_be_bytes([a, b, c, d]))
            }
            _ => Err(PackError::InvalidTimestamp(format!(
                "payload of {} bytes",
                data.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_narrowest_layout() {
        let cases = [
            (Timestamp::new(0, 0).unwrap(), 4),
            (Timestamp::new(u32::MAX as i64, 0).unwrap(), 4),
            (Timestamp::new(1, 1).unwrap(), 8),
            (Timestamp::new((1 << 34) - 1, 999_999_999).unwrap(), 8),
            (Timestamp::new(1 << 34, 0).unwrap(), 12),
            (Timestamp::new(-1, 500).unwrap(), 12),
        ];
        for (ts, size) in cases {
            let ext = Extension::from(ts);
            assert_eq!(ext.type_tag(), -1);
            assert_eq!(ext.len(), size, "{ts:?}");
            assert_eq!(Timestamp::try_from(&ext).unwrap(), ts);
        }
    }

    #[test]
    fn rejects_foreign_extensions() {
        assert!(Timestamp::try_from(&Extension::new(5, vec![0; 4])).is_err());
        assert!(Timestamp::try_from(&Extension::new(-1, vec![0; 5])).is_err());
        // nanos field of 0x3fffffff > 999_999_999
        let bad = Extension::new(-1, vec![0xff, 0xff, 0xff, 0xfc, 0, 0, 0, 0]);
        assert!(Timestamp::try_from(&bad).is_err());
        assert!(Timestamp::new(0, 1_000_000_000).is_err());
    }
}
