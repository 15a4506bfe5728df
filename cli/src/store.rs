//! File-backed persistence for the ledger.
//!
//! State lives in a single JSON snapshot file. Saves go through a
//! temporary file and an atomic rename so a crash mid-write never leaves
//! a truncated state file behind.

use std::fs;
use std::path::{Path, PathBuf};

use rayls_ledger::{LedgerSnapshot, TokenLedger};

use crate::CliError;

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the ledger from the state file, re-validating the snapshot.
    pub fn load(&self) -> Result<TokenLedger, CliError> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| CliError::State(format!("cannot read {}: {e}", self.path.display())))?;
        let snapshot = LedgerSnapshot::from_json(&json)?;
        let ledger = TokenLedger::restore(&snapshot)?;
        tracing::debug!("loaded ledger state from {}", self.path.display());
        Ok(ledger)
    }

    /// Write the ledger state out, replacing the previous file atomically.
    pub fn save(&self, ledger: &TokenLedger) -> Result<(), CliError> {
        let json = ledger.snapshot().to_json();
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!("saved ledger state to {}", self.path.display());
        Ok(())
    }
}
