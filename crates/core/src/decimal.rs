//! 128-bit decimal scalar.
//!
//! A `Decimal` is a 96-bit unsigned mantissa, a sign and a power-of-ten
//! scale in `0..=28`. Its value is `(-1)^sign * mantissa / 10^scale`.
//!
//! ## Layout
//!
//! ```text
//! [lo: u32][mid: u32][hi: u32][flags: u32]
//! flags bits 16..24 = scale, bit 31 = sign
//! ```
//!
//! The struct is `repr(C)` with exactly this field order, so on
//! little-endian hosts its memory layout equals its wire layout.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest scale a decimal can carry.
pub const MAX_SCALE: u32 = 28;

const MANTISSA_LIMIT: u128 = 1u128 << 96;
const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;

/// 128-bit decimal number.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

/// Errors from parsing decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    /// Empty input or stray characters
    #[error("invalid decimal literal '{0}'")]
    Invalid(String),

    /// Mantissa does not fit in 96 bits or scale exceeds 28
    #[error("decimal literal '{0}' is out of range")]
    OutOfRange(String),
}

impl Decimal {
    /// Zero with scale 0.
    pub const ZERO: Decimal = Decimal {
        lo: 0,
        mid: 0,
        hi: 0,
        flags: 0,
    };

    /// Build a decimal from a mantissa, sign and scale.
    ///
    /// Returns `None` if the mantissa needs more than 96 bits or the scale
    /// exceeds 28.
    pub fn new(mantissa: u128, negative: bool, scale: u32) -> Option<Self> {
        if mantissa >= MANTISSA_LIMIT || scale > MAX_SCALE {
            return None;
        }
        let mut flags = scale << SCALE_SHIFT;
        if negative {
            flags |= SIGN_MASK;
        }
        Some(Decimal {
            lo: mantissa as u32,
            mid: (mantissa >> 32) as u32,
            hi: (mantissa >> 64) as u32,
            flags,
        })
    }

    /// Rebuild a decimal from its four wire words `[lo, mid, hi, flags]`.
    ///
    /// Reserved flag bits are cleared and an out-of-range scale is clamped,
    /// so any bit pattern yields a usable value.
    pub fn from_words(words: [u32; 4]) -> Self {
        let [lo, mid, hi, flags] = words;
        let scale = ((flags & SCALE_MASK) >> SCALE_SHIFT).min(MAX_SCALE);
        Decimal {
            lo,
            mid,
            hi,
            flags: (flags & SIGN_MASK) | (scale << SCALE_SHIFT),
        }
    }

    /// The four wire words `[lo, mid, hi, flags]`.
    pub fn to_words(self) -> [u32; 4] {
        [self.lo, self.mid, self.hi, self.flags]
    }

    /// Unsigned 96-bit mantissa.
    pub fn mantissa(&self) -> u128 {
        (self.hi as u128) << 64 | (self.mid as u128) << 32 | self.lo as u128
    }

    /// Power-of-ten scale.
    pub fn scale(&self) -> u32 {
        (self.flags & SCALE_MASK) >> SCALE_SHIFT
    }

    /// Whether the sign bit is set.
    pub fn is_sign_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    /// Lossy conversion to `f64`.
    pub fn to_f64(&self) -> f64 {
        let magnitude = self.mantissa() as f64 / 10f64.powi(self.scale() as i32);
        if self.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Conversion from a finite `f64` through its shortest decimal text.
    ///
    /// Returns `None` for NaN, infinities, and values outside the decimal range.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let text = value.to_string();
        // Shortest text may carry more fraction digits than a decimal holds.
        match text.parse::<Decimal>() {
            Ok(d) => Some(d),
            Err(_) => format!("{:.28}", value)
                .trim_end_matches('0')
                .parse::<Decimal>()
                .ok(),
        }
    }

    /// Integer conversion when the value has no fractional part and fits.
    pub fn to_i128(&self) -> Option<i128> {
        let divisor = 10u128.checked_pow(self.scale())?;
        let mantissa = self.mantissa();
        if mantissa % divisor != 0 {
            return None;
        }
        let whole = (mantissa / divisor) as i128;
        Some(if self.is_sign_negative() { -whole } else { whole })
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        let negative = value < 0;
        Decimal::new(value.unsigned_abs() as u128, negative, 0).unwrap_or_default()
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(value as u128, false, 0).unwrap_or_default()
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::from(value as i64)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().to_string();
        let scale = self.scale() as usize;
        if self.is_sign_negative() {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (whole, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", whole, frac)
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, frac) = match body.find('.') {
            Some(dot) => (&body[..dot], &body[dot + 1..]),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(DecimalParseError::Invalid(s.to_string()));
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(DecimalParseError::Invalid(s.to_string()));
        }
        if frac.len() > MAX_SCALE as usize {
            return Err(DecimalParseError::OutOfRange(s.to_string()));
        }

        let mut mantissa: u128 = 0;
        for b in whole.bytes().chain(frac.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add((b - b'0') as u128))
                .filter(|m| *m < MANTISSA_LIMIT)
                .ok_or_else(|| DecimalParseError::OutOfRange(s.to_string()))?;
        }

        Decimal::new(mantissa, negative, frac.len() as u32)
            .ok_or_else(|| DecimalParseError::OutOfRange(s.to_string()))
    }
}
