use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// An exact, non-negative token amount.
///
/// Amounts travel as decimal strings (`"0"`, `"1500000000000000000"`, `"0.25"`)
/// and are held as an arbitrary-size integer plus the number of fractional
/// digits, so arithmetic never goes through floating point. Only the
/// canonical form is accepted, which makes `parse` then `to_string` the
/// identity on every valid input.
#[derive(Debug, Clone, Default)]
pub struct TokenAmount {
    units: BigUint,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount contains a non-digit character")]
    InvalidDigit,
    #[error("amount has a leading zero")]
    LeadingZero,
    #[error("amount has an empty integer or fractional part")]
    EmptyPart,
    #[error("amount has too many fractional digits")]
    ScaleOverflow,
}

impl TokenAmount {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.units.bits() == 0
    }

    fn rescaled(&self, scale: u32) -> BigUint {
        debug_assert!(scale >= self.scale);
        &self.units * BigUint::from(10u32).pow(scale - self.scale)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (s, None),
        };

        if int_part.is_empty() || frac_part.is_some_and(str::is_empty) {
            return Err(AmountError::EmptyPart);
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
            return Err(AmountError::InvalidDigit);
        }
        if int_part.len() > 1 && int_part.starts_with('0') {
            return Err(AmountError::LeadingZero);
        }

        let frac = frac_part.unwrap_or("");
        let scale = u32::try_from(frac.len()).map_err(|_| AmountError::ScaleOverflow)?;
        let mut digits = String::with_capacity(int_part.len() + frac.len());
        digits.push_str(int_part);
        digits.push_str(frac);

        let units = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or(AmountError::InvalidDigit)?;
        Ok(Self { units, scale })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.units.to_str_radix(10);
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }

        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl Add for &TokenAmount {
    type Output = TokenAmount;

    fn add(self, rhs: &TokenAmount) -> TokenAmount {
        let scale = self.scale.max(rhs.scale);
        TokenAmount {
            units: self.rescaled(scale) + rhs.rescaled(scale),
            scale,
        }
    }
}

impl Add for TokenAmount {
    type Output = TokenAmount;

    fn add(self, rhs: TokenAmount) -> TokenAmount {
        &self + &rhs
    }
}

impl Ord for TokenAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl PartialOrd for TokenAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric equality: `"1.50"` equals `"1.5"` even though they print differently.
impl PartialEq for TokenAmount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TokenAmount {}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
