//! Fixed-point token amounts.
//!
//! Amounts are represented as raw base units (u128) to avoid floating-point
//! errors. The token has 18 decimal places: one whole token is 10^18 raw
//! units. All arithmetic the ledger performs on amounts is checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// A token amount in raw base units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    /// Decimal places of the token.
    pub const DECIMALS: u32 = 18;

    /// Raw units in one whole token.
    pub const UNIT: u128 = 10u128.pow(Self::DECIMALS);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Convert a whole-token count to an amount. `None` if the raw value
    /// would not fit in 128 bits.
    pub fn from_whole(tokens: u128) -> Option<Self> {
        tokens.checked_mul(Self::UNIT).map(Self)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

// Amounts display as whole tokens with the fractional part trimmed:
// 1_500_000_000_000_000_000 raw renders as "1.5".
impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::UNIT;
        let frac = self.0 % Self::UNIT;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let mut digits = format!("{frac:018}");
            while digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{whole}.{digits}")
        }
    }
}

/// Failure to parse an amount from its decimal whole-token form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid digit {0:?} in amount")]
    InvalidDigit(char),

    #[error("amounts carry at most {max} fractional digits, got {actual}")]
    TooManyFractionDigits { max: u32, actual: usize },

    #[error("amount does not fit in 128 bits")]
    OutOfRange,
}

impl FromStr for TokenAmount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole_str, frac_str) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(ParseAmountError::Empty);
        }
        if frac_str.len() > Self::DECIMALS as usize {
            return Err(ParseAmountError::TooManyFractionDigits {
                max: Self::DECIMALS,
                actual: frac_str.len(),
            });
        }
        let whole = parse_digits(whole_str)?;
        let frac = parse_digits(frac_str)?;
        let scale = 10u128.pow(Self::DECIMALS - frac_str.len() as u32);
        whole
            .checked_mul(Self::UNIT)
            .and_then(|raw| frac.checked_mul(scale).and_then(|f| raw.checked_add(f)))
            .map(Self)
            .ok_or(ParseAmountError::OutOfRange)
    }
}

fn parse_digits(s: &str) -> Result<u128, ParseAmountError> {
    let mut value: u128 = 0;
    for c in s.chars() {
        let digit = c.to_digit(10).ok_or(ParseAmountError::InvalidDigit(c))? as u128;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(ParseAmountError::OutOfRange)?;
    }
    Ok(value)
}
