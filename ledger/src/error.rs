//! Ledger operation errors.

use rayls_types::{Principal, TokenAmount};
use thiserror::Error;

/// Rejection of a requested ledger operation.
///
/// Every variant refuses the operation as a whole: the engine applies no
/// partial effects and performs no internal recovery or retries.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("insufficient allowance: need {needed}, available {available}")]
    InsufficientAllowance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("caller {0} is not the ledger owner")]
    Unauthorized(Principal),

    #[error("recipient must not be the null principal")]
    InvalidRecipient,

    #[error("spender must not be the null principal")]
    InvalidSpender,

    #[error("owner must not be the null principal")]
    InvalidOwner,

    #[error("initial supply does not fit the amount range")]
    InvalidSupply,

    #[error("arithmetic overflow in ledger computation")]
    Overflow,
}
