//! Fungible token ledger.
//!
//! A single-writer accounting engine tracking balances, allowances and
//! total supply, with typed errors, an event bus for observers and a
//! verifiable snapshot format for persistence.

pub mod engine;
pub mod error;
pub mod event;
pub mod metadata;
pub mod snapshot;

pub use engine::TokenLedger;
pub use error::LedgerError;
pub use event::{EventBus, TokenEvent};
pub use metadata::TokenMetadata;
pub use snapshot::{
    AllowanceEntry, BalanceEntry, LedgerSnapshot, SnapshotError, SNAPSHOT_VERSION,
};
