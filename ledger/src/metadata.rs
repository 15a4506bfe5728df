//! Descriptive token metadata fixed at deployment.

use rayls_types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Human-facing identity of the token.
///
/// Both fields are fixed when the ledger is created; there is no
/// operation that renames a deployed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    name: String,
    symbol: String,
}

impl TokenMetadata {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of fractional digits used when rendering amounts.
    ///
    /// Fixed for every ledger; amounts are stored in base units of
    /// `10^-18` tokens.
    pub fn decimals() -> u32 {
        TokenAmount::DECIMALS
    }
}
