//! Core token ledger: balances, allowances, supply and the owner gate.
//!
//! All mutating operations validate their inputs and compute every new
//! value before touching state, so a failed operation leaves the ledger
//! exactly as it found it. The ledger is single-writer; mutations take
//! `&mut self` and callers serialize access.

use std::collections::HashMap;

use rayls_types::{Principal, TokenAmount};

use crate::error::LedgerError;
use crate::event::{EventBus, TokenEvent};
use crate::metadata::TokenMetadata;

/// In-memory fungible token ledger.
///
/// Balances and allowances are stored sparsely: a principal absent from
/// the map holds zero, and entries that reach zero are removed. Callers
/// are authenticated upstream; the `caller` argument on each operation
/// is trusted to be the acting principal.
#[derive(Debug)]
pub struct TokenLedger {
    pub(crate) metadata: TokenMetadata,
    pub(crate) owner: Principal,
    pub(crate) total_supply: TokenAmount,
    pub(crate) balances: HashMap<Principal, TokenAmount>,
    pub(crate) allowances: HashMap<(Principal, Principal), TokenAmount>,
    pub(crate) events: EventBus,
}

impl TokenLedger {
    /// Creates a ledger and credits the entire initial supply to the
    /// deployer, who becomes the owner.
    ///
    /// Emits a `Transfer` from the null principal for the genesis credit,
    /// even when the initial supply is zero.
    pub fn create(
        metadata: TokenMetadata,
        initial_supply: TokenAmount,
        deployer: Principal,
    ) -> Result<Self, LedgerError> {
        Self::create_with_events(metadata, initial_supply, deployer, EventBus::new())
    }

    /// Creates a ledger with a pre-wired event bus, so listeners also see
    /// the genesis `Transfer`.
    pub fn create_with_events(
        metadata: TokenMetadata,
        initial_supply: TokenAmount,
        deployer: Principal,
        events: EventBus,
    ) -> Result<Self, LedgerError> {
        if deployer.is_zero() {
            return Err(LedgerError::InvalidOwner);
        }
        let supply = TokenAmount::ZERO
            .checked_add(initial_supply)
            .ok_or(LedgerError::InvalidSupply)?;

        let mut ledger = Self {
            metadata,
            owner: deployer,
            total_supply: supply,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            events,
        };
        ledger.set_balance(deployer, supply);
        ledger.events.emit(&TokenEvent::Transfer {
            from: Principal::ZERO,
            to: deployer,
            amount: supply,
        });
        Ok(ledger)
    }

    // ── Reads ─────────────────────────────────────────────────────────

    /// Balance held by `principal`, zero if it has never held tokens.
    pub fn balance_of(&self, principal: Principal) -> TokenAmount {
        self.balances
            .get(&principal)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Amount `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: Principal, spender: Principal) -> TokenAmount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn symbol(&self) -> &str {
        self.metadata.symbol()
    }

    pub fn decimals(&self) -> u32 {
        TokenMetadata::decimals()
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Number of principals currently holding a nonzero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Registers a listener for all subsequent ledger events.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TokenEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Mutations ─────────────────────────────────────────────────────

    /// Moves `amount` from the caller to `to`.
    ///
    /// A zero-amount transfer to a valid recipient succeeds and still
    /// emits a `Transfer` event.
    pub fn transfer(
        &mut self,
        caller: Principal,
        to: Principal,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        self.move_balance(caller, to, amount)?;
        self.events.emit(&TokenEvent::Transfer {
            from: caller,
            to,
            amount,
        });
        Ok(())
    }

    /// Sets `spender`'s allowance over the caller's balance to `amount`,
    /// overwriting any previous grant.
    pub fn approve(
        &mut self,
        caller: Principal,
        spender: Principal,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if spender.is_zero() {
            return Err(LedgerError::InvalidSpender);
        }
        self.set_allowance(caller, spender, amount);
        self.events.emit(&TokenEvent::Approval {
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    /// Moves `amount` from `owner` to `to` on the caller's behalf,
    /// consuming that much of the caller's allowance.
    pub fn transfer_from(
        &mut self,
        caller: Principal,
        owner: Principal,
        to: Principal,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        let granted = self.allowance(owner, caller);
        let remaining = granted
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                needed: amount,
                available: granted,
            })?;
        self.move_balance(owner, to, amount)?;
        self.set_allowance(owner, caller, remaining);
        self.events.emit(&TokenEvent::Transfer {
            from: owner,
            to,
            amount,
        });
        Ok(())
    }

    /// Creates `amount` new tokens in `to`'s balance. Owner only.
    pub fn mint(
        &mut self,
        caller: Principal,
        to: Principal,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(caller));
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.total_supply = supply;
        self.set_balance(to, balance);
        self.events.emit(&TokenEvent::Transfer {
            from: Principal::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    /// Destroys `amount` tokens from the caller's balance, shrinking the
    /// total supply by the same amount.
    pub fn burn(&mut self, caller: Principal, amount: TokenAmount) -> Result<(), LedgerError> {
        let held = self.balance_of(caller);
        let balance = held
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available: held,
            })?;
        let supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;

        self.total_supply = supply;
        self.set_balance(caller, balance);
        self.events.emit(&TokenEvent::Transfer {
            from: caller,
            to: Principal::ZERO,
            amount,
        });
        Ok(())
    }

    /// Hands the owner role to `new_owner`. Owner only.
    ///
    /// Only the mint gate moves; balances and allowances of both
    /// principals are untouched and no event is emitted.
    pub fn transfer_ownership(
        &mut self,
        caller: Principal,
        new_owner: Principal,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(caller));
        }
        if new_owner.is_zero() {
            return Err(LedgerError::InvalidOwner);
        }
        self.owner = new_owner;
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────

    /// Debits `from` and credits `to`. Both new balances are computed
    /// before either write so a failure commits nothing.
    fn move_balance(
        &mut self,
        from: Principal,
        to: Principal,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let held = self.balance_of(from);
        let debited = held
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available: held,
            })?;
        // For a self-transfer the credit applies to the already-debited
        // balance, not the stale one.
        let credit_base = if from == to {
            debited
        } else {
            self.balance_of(to)
        };
        let credited = credit_base
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, debited);
        self.set_balance(to, credited);
        Ok(())
    }

    fn set_balance(&mut self, principal: Principal, amount: TokenAmount) {
        if amount.is_zero() {
            self.balances.remove(&principal);
        } else {
            self.balances.insert(principal, amount);
        }
    }

    fn set_allowance(&mut self, owner: Principal, spender: Principal, amount: TokenAmount) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }
}
