//! Principal identifiers for ledger accounts.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 20-byte account identifier.
///
/// Principals are opaque to the ledger: equality, ordering, and hashing are
/// all the engine ever needs. The all-zero value is the reserved null
/// principal. It is never a valid recipient, spender, or owner, and it
/// appears in events as the origin of minted supply and the destination of
/// burned supply.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal([u8; 20]);

impl Principal {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Failure to parse a principal from its `0x`-hex form.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParsePrincipalError {
    #[error("principal must start with 0x")]
    MissingPrefix,

    #[error("principal must be {expected} hex digits, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("invalid hex digit {0:?} in principal")]
    InvalidDigit(char),
}

impl FromStr for Principal {
    type Err = ParsePrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or(ParsePrincipalError::MissingPrefix)?;
        if digits.len() != 40 {
            return Err(ParsePrincipalError::BadLength {
                expected: 40,
                actual: digits.len(),
            });
        }
        let mut bytes = [0u8; 20];
        for (byte, pair) in bytes.iter_mut().zip(digits.as_bytes().chunks(2)) {
            let hi = hex::decode_digit(pair[0])
                .ok_or(ParsePrincipalError::InvalidDigit(pair[0] as char))?;
            let lo = hex::decode_digit(pair[1])
                .ok_or(ParsePrincipalError::InvalidDigit(pair[1] as char))?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

// Principals serialize as their printable 0x-hex form so state files and
// JSON map keys stay readable to operators.
impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// Inline hex helpers to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn decode_digit(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }
}
