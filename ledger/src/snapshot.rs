//! Ledger snapshots — capture balances, allowances and supply at a point
//! in time.
//!
//! Snapshots are the persistence format of the ledger: state is written
//! out as a snapshot and loaded back through [`TokenLedger::restore`],
//! which re-validates every invariant before accepting the data. The
//! snapshot hash is computed deterministically from the entries so a
//! tampered or truncated file is rejected on load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rayls_types::{Principal, TokenAmount};

use crate::engine::TokenLedger;
use crate::event::EventBus;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A ledger snapshot — the full token state at a point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Hash of this snapshot (Blake2b of the serialized entries).
    pub hash: [u8; 32],
    /// Unix timestamp (seconds) when the snapshot was created.
    pub created_at: u64,
    /// Token name.
    pub name: String,
    /// Token ticker symbol.
    pub symbol: String,
    /// Principal holding the owner role.
    pub owner: Principal,
    /// Declared total supply; must equal the sum of all balance entries.
    pub total_supply: TokenAmount,
    /// Nonzero balances, sorted by principal.
    pub balances: Vec<BalanceEntry>,
    /// Nonzero allowance grants, sorted by (owner, spender).
    pub allowances: Vec<AllowanceEntry>,
    /// Snapshot version for compatibility.
    pub version: u32,
}

/// A single balance row captured in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// The principal holding the balance.
    pub principal: Principal,
    /// The held amount, always nonzero.
    pub amount: TokenAmount,
}

/// A single allowance grant captured in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllowanceEntry {
    /// The principal whose balance the grant draws from.
    pub owner: Principal,
    /// The principal allowed to spend.
    pub spender: Principal,
    /// The remaining granted amount, always nonzero.
    pub amount: TokenAmount,
}

/// Why a snapshot was rejected on load.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("snapshot hash does not match its contents")]
    ChecksumMismatch,

    #[error("snapshot owner is the null principal")]
    NullOwner,

    #[error("snapshot contains a balance for the null principal")]
    NullHolder,

    #[error("snapshot contains an allowance with a null spender")]
    NullSpender,

    #[error("snapshot contains a zero-amount entry")]
    ZeroEntry,

    #[error("snapshot balances are not sorted by principal")]
    UnsortedBalances,

    #[error("snapshot allowances are not sorted by owner and spender")]
    UnsortedAllowances,

    #[error("declared supply {declared} does not match summed balances {computed}")]
    SupplyMismatch {
        declared: TokenAmount,
        computed: TokenAmount,
    },

    #[error("arithmetic overflow while summing snapshot balances")]
    Overflow,

    #[error("snapshot JSON error: {0}")]
    Json(String),
}

impl LedgerSnapshot {
    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    ///
    /// `created_at` is excluded so two snapshots of identical state hash
    /// the same regardless of when they were taken.
    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&(self.name.len() as u64).to_le_bytes());
        hasher.update(self.name.as_bytes());
        hasher.update(&(self.symbol.len() as u64).to_le_bytes());
        hasher.update(self.symbol.as_bytes());
        hasher.update(self.owner.as_bytes());
        hasher.update(&self.total_supply.raw().to_le_bytes());
        hasher.update(&(self.balances.len() as u64).to_le_bytes());
        for entry in &self.balances {
            hasher.update(entry.principal.as_bytes());
            hasher.update(&entry.amount.raw().to_le_bytes());
        }
        hasher.update(&(self.allowances.len() as u64).to_le_bytes());
        for entry in &self.allowances {
            hasher.update(entry.owner.as_bytes());
            hasher.update(entry.spender.as_bytes());
            hasher.update(&entry.amount.raw().to_le_bytes());
        }
        hasher.update(&self.version.to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the entry data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("snapshot serialization should not fail")
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Json(e.to_string()))
    }

    /// Number of balance entries in this snapshot.
    pub fn balance_count(&self) -> usize {
        self.balances.len()
    }
}

impl TokenLedger {
    /// Capture the current ledger state as a verifiable snapshot.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut balances: Vec<BalanceEntry> = self
            .balances
            .iter()
            .map(|(principal, amount)| BalanceEntry {
                principal: *principal,
                amount: *amount,
            })
            .collect();
        balances.sort_by_key(|entry| entry.principal);

        let mut allowances: Vec<AllowanceEntry> = self
            .allowances
            .iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner: *owner,
                spender: *spender,
                amount: *amount,
            })
            .collect();
        allowances.sort_by_key(|entry| (entry.owner, entry.spender));

        let mut snap = LedgerSnapshot {
            hash: [0u8; 32],
            created_at: unix_now(),
            name: self.metadata.name().to_string(),
            symbol: self.metadata.symbol().to_string(),
            owner: self.owner,
            total_supply: self.total_supply,
            balances,
            allowances,
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// Rebuild a ledger from a snapshot, re-validating every invariant.
    ///
    /// Restore fails closed: any mismatch between the declared hash,
    /// ordering, entry shape or supply and the actual entries rejects the
    /// whole snapshot rather than loading a partially trusted state.
    pub fn restore(snapshot: &LedgerSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        if !snapshot.verify() {
            return Err(SnapshotError::ChecksumMismatch);
        }
        if snapshot.owner.is_zero() {
            return Err(SnapshotError::NullOwner);
        }

        for window in snapshot.balances.windows(2) {
            if window[1].principal <= window[0].principal {
                return Err(SnapshotError::UnsortedBalances);
            }
        }
        let mut balances = HashMap::new();
        let mut computed = TokenAmount::ZERO;
        for entry in &snapshot.balances {
            if entry.principal.is_zero() {
                return Err(SnapshotError::NullHolder);
            }
            if entry.amount.is_zero() {
                return Err(SnapshotError::ZeroEntry);
            }
            computed = computed
                .checked_add(entry.amount)
                .ok_or(SnapshotError::Overflow)?;
            balances.insert(entry.principal, entry.amount);
        }
        if computed != snapshot.total_supply {
            return Err(SnapshotError::SupplyMismatch {
                declared: snapshot.total_supply,
                computed,
            });
        }

        for window in snapshot.allowances.windows(2) {
            let prev = (window[0].owner, window[0].spender);
            let next = (window[1].owner, window[1].spender);
            if next <= prev {
                return Err(SnapshotError::UnsortedAllowances);
            }
        }
        let mut allowances = HashMap::new();
        for entry in &snapshot.allowances {
            if entry.spender.is_zero() {
                return Err(SnapshotError::NullSpender);
            }
            if entry.amount.is_zero() {
                return Err(SnapshotError::ZeroEntry);
            }
            allowances.insert((entry.owner, entry.spender), entry.amount);
        }

        Ok(Self {
            metadata: crate::metadata::TokenMetadata::new(&snapshot.name, &snapshot.symbol),
            owner: snapshot.owner,
            total_supply: snapshot.total_supply,
            balances,
            allowances,
            events: EventBus::new(),
        })
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TokenMetadata;

    fn test_principal(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    fn sample_ledger() -> TokenLedger {
        let mut ledger = TokenLedger::create(
            TokenMetadata::new("Test Token", "TST"),
            TokenAmount::new(1_000),
            test_principal(1),
        )
        .unwrap();
        ledger
            .transfer(test_principal(1), test_principal(2), TokenAmount::new(250))
            .unwrap();
        ledger
            .approve(test_principal(1), test_principal(3), TokenAmount::new(40))
            .unwrap();
        ledger
    }

    fn reseal(mut snap: LedgerSnapshot) -> LedgerSnapshot {
        snap.hash = snap.compute_hash();
        snap
    }

    #[test]
    fn test_snapshot_and_verify() {
        let snap = sample_ledger().snapshot();
        assert!(snap.verify());
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.balance_count(), 2);
        assert_eq!(snap.allowances.len(), 1);
        assert_eq!(snap.total_supply, TokenAmount::new(1_000));
    }

    #[test]
    fn test_snapshot_entries_are_sorted() {
        let mut ledger = sample_ledger();
        // touch principals out of order to shuffle map iteration
        for n in [9u8, 4, 7, 3] {
            ledger
                .transfer(test_principal(1), test_principal(n), TokenAmount::new(10))
                .unwrap();
        }
        let snap = ledger.snapshot();
        for window in snap.balances.windows(2) {
            assert!(window[0].principal < window[1].principal);
        }
    }

    #[test]
    fn test_tampered_snapshot_fails_verify() {
        let mut snap = sample_ledger().snapshot();
        assert!(snap.verify());

        snap.total_supply = TokenAmount::new(999);
        assert!(!snap.verify());
    }

    #[test]
    fn test_deterministic_hash() {
        let snap1 = sample_ledger().snapshot();
        let mut snap2 = snap1.clone();
        snap2.created_at += 1_000;
        // Hash depends on entries, not created_at
        assert_eq!(snap2.compute_hash(), snap1.hash);
        assert!(snap2.verify());
    }

    #[test]
    fn test_json_roundtrip() {
        let snap = sample_ledger().snapshot();
        let json = snap.to_json();
        let restored = LedgerSnapshot::from_json(&json).expect("deserialization failed");

        assert_eq!(restored.hash, snap.hash);
        assert_eq!(restored.balance_count(), snap.balance_count());
        assert!(restored.verify());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = LedgerSnapshot::from_json("{not json");
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_empty_ledger_snapshot() {
        let ledger = TokenLedger::create(
            TokenMetadata::new("Empty", "EMP"),
            TokenAmount::ZERO,
            test_principal(1),
        )
        .unwrap();
        let snap = ledger.snapshot();
        assert!(snap.verify());
        assert_eq!(snap.balance_count(), 0);

        let restored = TokenLedger::restore(&snap).unwrap();
        assert_eq!(restored.total_supply(), TokenAmount::ZERO);
    }

    #[test]
    fn test_restore_round_trip() {
        let ledger = sample_ledger();
        let snap = ledger.snapshot();
        let restored = TokenLedger::restore(&snap).unwrap();

        assert_eq!(restored.name(), "Test Token");
        assert_eq!(restored.owner(), test_principal(1));
        assert_eq!(restored.total_supply(), TokenAmount::new(1_000));
        assert_eq!(restored.balance_of(test_principal(2)), TokenAmount::new(250));
        assert_eq!(
            restored.allowance(test_principal(1), test_principal(3)),
            TokenAmount::new(40)
        );
        // a second snapshot of the restored ledger hashes identically
        assert_eq!(restored.snapshot().hash, snap.hash);
    }

    #[test]
    fn test_restore_rejects_unsupported_version() {
        let mut snap = sample_ledger().snapshot();
        snap.version = 99;
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_restore_rejects_tampered_entries() {
        let mut snap = sample_ledger().snapshot();
        snap.balances[0].amount = TokenAmount::new(1);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_restore_rejects_null_owner() {
        let mut snap = sample_ledger().snapshot();
        snap.owner = Principal::ZERO;
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::NullOwner)
        ));
    }

    #[test]
    fn test_restore_rejects_unsorted_balances() {
        let mut snap = sample_ledger().snapshot();
        snap.balances.swap(0, 1);
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::UnsortedBalances)
        ));
    }

    #[test]
    fn test_restore_rejects_duplicate_holder() {
        let mut snap = sample_ledger().snapshot();
        let dup = snap.balances[0].clone();
        snap.balances.insert(1, dup);
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::UnsortedBalances)
        ));
    }

    #[test]
    fn test_restore_rejects_null_holder() {
        let mut snap = sample_ledger().snapshot();
        snap.balances[0].principal = Principal::ZERO;
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::NullHolder)
        ));
    }

    #[test]
    fn test_restore_rejects_zero_balance_entry() {
        let mut snap = sample_ledger().snapshot();
        snap.balances[0].amount = TokenAmount::ZERO;
        snap.total_supply = TokenAmount::new(250);
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::ZeroEntry)
        ));
    }

    #[test]
    fn test_restore_rejects_supply_mismatch() {
        let mut snap = sample_ledger().snapshot();
        snap.total_supply = TokenAmount::new(2_000);
        let snap = reseal(snap);
        match TokenLedger::restore(&snap) {
            Err(SnapshotError::SupplyMismatch { declared, computed }) => {
                assert_eq!(declared, TokenAmount::new(2_000));
                assert_eq!(computed, TokenAmount::new(1_000));
            }
            other => panic!("expected supply mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_restore_rejects_null_spender() {
        let mut snap = sample_ledger().snapshot();
        snap.allowances[0].spender = Principal::ZERO;
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::NullSpender)
        ));
    }

    #[test]
    fn test_restore_rejects_unsorted_allowances() {
        let mut ledger = sample_ledger();
        ledger
            .approve(test_principal(1), test_principal(4), TokenAmount::new(10))
            .unwrap();
        let mut snap = ledger.snapshot();
        snap.allowances.swap(0, 1);
        let snap = reseal(snap);
        assert!(matches!(
            TokenLedger::restore(&snap),
            Err(SnapshotError::UnsortedAllowances)
        ));
    }
}
