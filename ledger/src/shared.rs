//! Thread-safe handle to a ledger.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strata_types::{AccountId, ClassId};

use crate::classes::Conversion;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::op::{LedgerOp, OpOutcome};
use crate::snapshot::LedgerSnapshot;

/// A cloneable, `Send + Sync` ledger handle.
///
/// Mutations are serialized behind one write lock, queries share a read
/// lock, so every operation is observed either fully applied or not at all.
/// Operations validate before they write, so a poisoned lock never guards a
/// half-applied change and is recovered rather than propagated.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with shared access, for queries not mirrored here.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.read())
    }

    pub fn issue(
        &self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.write().issue(caller, account, amount, class)
    }

    pub fn transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.write().transfer(caller, to, amount, class)
    }

    pub fn approve(
        &self,
        caller: &AccountId,
        spender: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.write().approve(caller, spender, amount, class)
    }

    pub fn transfer_from(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.write().transfer_from(caller, from, to, amount, class)
    }

    pub fn convert(
        &self,
        caller: &AccountId,
        from: ClassId,
        to: ClassId,
        amount: u128,
    ) -> Result<Conversion, LedgerError> {
        self.write().convert(caller, from, to, amount)
    }

    pub fn apply(&self, op: &LedgerOp) -> Result<OpOutcome, LedgerError> {
        self.write().apply(op)
    }

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.read().balance_of(account)
    }

    pub fn balance_of_class(&self, account: &AccountId, class: ClassId) -> u128 {
        self.read().balance_of_class(account, class)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId, class: ClassId) -> u128 {
        self.read().allowance(owner, spender, class)
    }

    pub fn fully_diluted_balance_of(&self, account: &AccountId) -> u128 {
        self.read().fully_diluted_balance_of(account)
    }

    pub fn fully_diluted_total_supply(&self) -> u128 {
        self.read().fully_diluted_total_supply()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.read().snapshot()
    }

    pub fn audit(&self) -> Result<(), LedgerError> {
        self.read().audit()
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
