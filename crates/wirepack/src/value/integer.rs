//! The integer payload: one logical range from `i64::MIN` to `u64::MAX`.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{PackError, Result};
use crate::format::Format;

/// An integer in the combined signed/unsigned 64-bit range.
///
/// Non-negative values are always held in the unsigned representation, so
/// `Integer::from(5i64) == Integer::from(5u8)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer {
    n: N,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum N {
    PosInt(u64),
    /// Always negative.
    NegInt(i64),
}

macro_rules! narrow {
    ($($(#[$doc:meta])* $name:ident => $ty:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Result<$ty> {
                <$ty>::try_from(self.as_i128())
                    .map_err(|_| PackError::overflow(stringify!($ty), self))
            }
        )*
    };
}

impl Integer {
    pub const fn from_u64(n: u64) -> Self {
        Integer { n: N::PosInt(n) }
    }

    pub const fn from_i64(n: i64) -> Self {
        if n < 0 {
            Integer { n: N::NegInt(n) }
        } else {
            Integer {
                n: N::PosInt(n as u64),
            }
        }
    }

    pub const fn is_negative(&self) -> bool {
        matches!(self.n, N::NegInt(_))
    }

    /// Exact value widened to `i128`.
    pub const fn as_i128(&self) -> i128 {
        match self.n {
            N::PosInt(n) => n as i128,
            N::NegInt(n) => n as i128,
        }
    }

    pub fn is_in_i8_range(&self) -> bool {
        self.to_i8().is_ok()
    }

    pub fn is_in_i16_range(&self) -> bool {
        self.to_i16().is_ok()
    }

    pub fn is_in_i32_range(&self) -> bool {
        self.to_i32().is_ok()
    }

    pub fn is_in_i64_range(&self) -> bool {
        self.to_i64().is_ok()
    }

    pub fn is_in_u64_range(&self) -> bool {
        !self.is_negative()
    }

    narrow! {
        to_i8 => i8,
        to_i16 => i16,
        to_i32 => i32,
        /// Fails for values above `i64::MAX`.
        to_i64 => i64,
        to_u8 => u8,
        to_u16 => u16,
        to_u32 => u32,
        /// Fails for negative values.
        to_u64 => u64,
    }

    /// Nearest `f64`. Never fails; values beyond 2^53 may round.
    pub fn to_f64(&self) -> f64 {
        match self.n {
            N::PosInt(n) => n as f64,
            N::NegInt(n) => n as f64,
        }
    }

    /// Nearest `f32`. Never fails; the magnitude of any 64-bit integer fits.
    pub fn to_f32(&self) -> f32 {
        match self.n {
            N::PosInt(n) => n as f32,
            N::NegInt(n) => n as f32,
        }
    }

    /// The narrowest wire format able to hold this value.
    pub fn most_succinct_format(&self) -> Format {
        match self.n {
            N::PosInt(n) if n < 0x80 => Format::PositiveFixInt,
            N::PosInt(n) if n <= u8::MAX as u64 => Format::UInt8,
            N::PosInt(n) if n <= u16::MAX as u64 => Format::UInt16,
            N::PosInt(n) if n <= u32::MAX as u64 => Format::UInt32,
            N::PosInt(_) => Format::UInt64,
            N::NegInt(n) if n >= -32 => Format::NegativeFixInt,
            N::NegInt(n) if n >= i8::MIN as i64 => Format::Int8,
            N::NegInt(n) if n >= i16::MIN as i64 => Format::Int16,
            N::NegInt(n) if n >= i32::MIN as i64 => Format::Int32,
            N::NegInt(_) => Format::Int64,
        }
    }

    /// `Ok` for non-negative values, `Err` with the negative value otherwise.
    pub(crate) fn split(&self) -> std::result::Result<u64, i64> {
        match self.n {
            N::PosInt(n) => Ok(n),
            N::NegInt(n) => Err(n),
        }
    }
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Integer {
            fn from(n: $ty) -> Self {
                Integer::from_u64(n as u64)
            }
        })*
    };
}

macro_rules! from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Integer {
            fn from(n: $ty) -> Self {
                Integer::from_i64(n as i64)
            }
        })*
    };
}

from_unsigned!(u8, u16, u32, u64);
from_signed!(i8, i16, i32, i64);

impl TryFrom<i128> for Integer {
    type Error = PackError;

    fn try_from(n: i128) -> Result<Self> {
        if let Ok(n) = u64::try_from(n) {
            Ok(Integer::from_u64(n))
        } else if let Ok(n) = i64::try_from(n) {
            Ok(Integer::from_i64(n))
        } else {
            Err(PackError::overflow("integer", n))
        }
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_i128().cmp(&other.as_i128())
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.n {
            N::PosInt(n) => fmt::Display::fmt(&n, f),
            N::NegInt(n) => fmt::Display::fmt(&n, f),
        }
    }
}
