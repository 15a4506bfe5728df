//! Fundamental types for the Rayls token ledger.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: principals (account identifiers) and fixed-point token amounts,
//! together with their parse errors.

pub mod amount;
pub mod principal;

pub use amount::{ParseAmountError, TokenAmount};
pub use principal::{ParsePrincipalError, Principal};
