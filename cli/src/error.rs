use thiserror::Error;

use rayls_ledger::{LedgerError, SnapshotError};
use rayls_types::{ParseAmountError, ParsePrincipalError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("invalid principal: {0}")]
    Principal(#[from] ParsePrincipalError),

    #[error("invalid amount: {0}")]
    Amount(#[from] ParseAmountError),

    #[error("config error: {0}")]
    Config(String),

    #[error("state error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
