//! Numeric coercion between the number-like variants and machine types.
//!
//! Every narrowing here is checked: a value that does not fit the target
//! width fails with [`PackError::NumericOverflow`] instead of wrapping.

use crate::error::{PackError, Result};
use crate::value::Integer;

/// A borrowed view of either number-like variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(Integer),
    Float(f64),
}

/// 2^64 as an `f64`; every float strictly inside `(-2^64, 2^64)` fits `i128`.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn truncate_float(f: f64, target: &'static str) -> Result<i128> {
    let t = f.trunc();
    if t.is_finite() && t > -TWO_POW_64 && t < TWO_POW_64 {
        Ok(t as i128)
    } else {
        Err(PackError::overflow(target, f))
    }
}

macro_rules! narrow {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<$ty> {
                match self {
                    Number::Integer(n) => n.$name(),
                    Number::Float(f) => {
                        let t = truncate_float(*f, stringify!($ty))?;
                        <$ty>::try_from(t).map_err(|_| PackError::overflow(stringify!($ty), f))
                    }
                }
            }
        )*
    };
}

impl Number {
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    // Floats truncate toward zero; NaN, infinities and out-of-range
    // magnitudes fail.
    narrow! {
        to_i8 => i8,
        to_i16 => i16,
        to_i32 => i32,
        to_i64 => i64,
        to_u8 => u8,
        to_u16 => u16,
        to_u32 => u32,
        to_u64 => u64,
    }

    /// Fails only for finite floats whose magnitude exceeds `f32::MAX`.
    pub fn to_f32(&self) -> Result<f32> {
        match self {
            Number::Integer(n) => Ok(n.to_f32()),
            Number::Float(f) => {
                if f.is_finite() && f.abs() > f32::MAX as f64 {
                    Err(PackError::overflow("f32", f))
                } else {
                    Ok(*f as f32)
                }
            }
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Number::Integer(n) => Ok(n.to_f64()),
            Number::Float(f) => Ok(*f),
        }
    }
}

impl From<Integer> for Number {
    fn from(n: Integer) -> Self {
        Number::Integer(n)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}
