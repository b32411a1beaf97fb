//! The ledger: balances, allowances, issuance, transfers and conversion.

use std::collections::{BTreeSet, HashMap};

use strata_types::{AccountId, ClassId};

use crate::allowance::{AllowanceBook, AllowanceKey};
use crate::classes::{ClassTable, Conversion};
use crate::error::LedgerError;
use crate::holdings::Holdings;

/// A multi-class ledger with fixed dilution multipliers.
///
/// Every mutating operation validates against current state first and only
/// then writes, so a failed call leaves the ledger untouched. Class supplies
/// and the fully diluted total supply are running aggregates updated on each
/// write; no query iterates over accounts.
///
/// The fully diluted total supply always fits in a `u128` (issuance that
/// would break this fails with [`LedgerError::Overflow`]), so every
/// per-account diluted balance and every conversion of an existing balance
/// is representable too.
#[derive(Clone, Debug)]
pub struct Ledger {
    pub(crate) classes: ClassTable,
    pub(crate) issuers: BTreeSet<AccountId>,
    pub(crate) accounts: HashMap<AccountId, Holdings>,
    pub(crate) allowances: AllowanceBook,
    pub(crate) class_supply: Vec<u128>,
    pub(crate) diluted_supply: u128,
}

/// A validated balance move, ready to be written.
struct PlannedMove {
    from_balance: u128,
    to_balance: u128,
}

impl Ledger {
    /// Create a ledger with a single account holding the issuer role.
    pub fn new(multipliers: Vec<u128>, issuer: AccountId) -> Result<Self, LedgerError> {
        Self::with_issuers(multipliers, [issuer])
    }

    /// Create a ledger whose issuer role is held by every account in `issuers`.
    pub fn with_issuers<I>(multipliers: Vec<u128>, issuers: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = AccountId>,
    {
        let ledger = Self::empty(ClassTable::new(multipliers)?, issuers.into_iter().collect())?;
        tracing::info!(
            classes = ledger.classes.count(),
            issuers = ledger.issuers.len(),
            "ledger created"
        );
        Ok(ledger)
    }

    pub(crate) fn empty(
        classes: ClassTable,
        issuers: BTreeSet<AccountId>,
    ) -> Result<Self, LedgerError> {
        if issuers.is_empty() {
            return Err(LedgerError::Config("at least one issuer is required".into()));
        }
        if let Some(bad) = issuers.iter().find(|id| !id.is_valid()) {
            return Err(LedgerError::Config(format!("invalid issuer id {:?}", bad.as_str())));
        }
        Ok(Self {
            class_supply: vec![0; classes.count()],
            classes,
            issuers,
            accounts: HashMap::new(),
            allowances: AllowanceBook::new(),
            diluted_supply: 0,
        })
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn class_count(&self) -> usize {
        self.classes.count()
    }

    pub fn multiplier(&self, class: ClassId) -> Option<u128> {
        self.classes.multiplier(class)
    }

    pub fn is_issuer(&self, account: &AccountId) -> bool {
        self.issuers.contains(account)
    }

    pub fn issuers(&self) -> impl Iterator<Item = &AccountId> {
        self.issuers.iter()
    }

    /// Class-0 balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balance_of_class(account, ClassId::BASE)
    }

    /// Raw balance of `account` in `class`. Unknown accounts and classes
    /// read as zero; use [`Ledger::try_balance_of_class`] to reject a bad
    /// class instead.
    pub fn balance_of_class(&self, account: &AccountId, class: ClassId) -> u128 {
        self.accounts.get(account).map_or(0, |h| h.get(class))
    }

    pub fn try_balance_of_class(
        &self,
        account: &AccountId,
        class: ClassId,
    ) -> Result<u128, LedgerError> {
        self.classes.check(class)?;
        Ok(self.balance_of_class(account, class))
    }

    /// `Σ balance(account, c) × m[c]` over every class.
    pub fn fully_diluted_balance_of(&self, account: &AccountId) -> u128 {
        // Bounded by the total supply, which is kept representable.
        self.accounts
            .get(account)
            .and_then(|h| h.diluted_checked(&self.classes))
            .unwrap_or(0)
    }

    /// Sum of every account's fully diluted balance. O(1).
    pub fn fully_diluted_total_supply(&self) -> u128 {
        self.diluted_supply
    }

    /// Total raw units outstanding in `class` (zero for unknown classes).
    pub fn class_supply(&self, class: ClassId) -> u128 {
        self.class_supply.get(class.index()).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move out of `owner`'s `class` balance.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId, class: ClassId) -> u128 {
        self.allowances.get(&AllowanceKey::new(owner, spender, class))
    }

    pub fn holdings(&self, account: &AccountId) -> Option<&Holdings> {
        self.accounts.get(account)
    }

    /// Accounts holding a non-zero balance in at least one class.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Holdings)> {
        self.accounts.iter()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn allowances(&self) -> &AllowanceBook {
        &self.allowances
    }

    /// Preview a conversion without touching any balance.
    pub fn quote_conversion(
        &self,
        from: ClassId,
        to: ClassId,
        amount: u128,
    ) -> Result<Conversion, LedgerError> {
        self.classes.quote(from, to, amount)
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Credit `amount` raw units of `class` to `account`.
    ///
    /// The only operation that increases raw supply. `caller` must hold the
    /// issuer role.
    pub fn issue(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        if !self.issuers.contains(caller) {
            tracing::warn!(
                caller = %caller,
                account = %account,
                "issue rejected: caller lacks issuer role"
            );
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        let multiplier = self.classes.check(class)?;
        check_account(account)?;
        let balance = self
            .balance_of_class(account, class)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let supply = self.class_supply[class.index()]
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let diluted = amount
            .checked_mul(multiplier)
            .and_then(|value| self.diluted_supply.checked_add(value))
            .ok_or(LedgerError::Overflow)?;

        self.write_balance(account, class, balance);
        self.class_supply[class.index()] = supply;
        self.diluted_supply = diluted;
        tracing::debug!(account = %account, class = %class, amount, "issued");
        Ok(())
    }

    /// Move `amount` of `class` from `caller` to `to`.
    ///
    /// A transfer to oneself still requires the balance but changes nothing.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.classes.check(class)?;
        let planned = self.plan_move(caller, to, amount, class)?;
        self.commit_move(caller, to, class, planned);
        tracing::debug!(from = %caller, to = %to, class = %class, amount, "transferred");
        Ok(())
    }

    /// Set the allowance of `spender` over `caller`'s `class` balance.
    ///
    /// Absolute set: the previous value is discarded.
    pub fn approve(
        &mut self,
        caller: &AccountId,
        spender: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.classes.check(class)?;
        check_account(caller)?;
        check_account(spender)?;
        self.allowances
            .set(AllowanceKey::new(caller, spender, class), amount);
        tracing::debug!(owner = %caller, spender = %spender, class = %class, amount, "approved");
        Ok(())
    }

    /// Move `amount` of `class` from `from` to `to` on behalf of `from`,
    /// spending `caller`'s allowance.
    ///
    /// The allowance is checked before the balance; both are written together.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<(), LedgerError> {
        self.classes.check(class)?;
        let key = AllowanceKey::new(from, caller, class);
        let allowed = self.allowances.get(&key);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                needed: amount,
                available: allowed,
            });
        }
        let planned = self.plan_move(from, to, amount, class)?;

        self.allowances.set(key, allowed - amount);
        self.commit_move(from, to, class, planned);
        tracing::debug!(
            spender = %caller,
            from = %from,
            to = %to,
            class = %class,
            amount,
            "transferred with allowance"
        );
        Ok(())
    }

    /// Convert `amount` of `caller`'s `from` balance into class `to`.
    ///
    /// Credits `floor(amount × m[from] / m[to])`; the rounding remainder is
    /// destroyed and removed from the fully diluted total supply.
    pub fn convert(
        &mut self,
        caller: &AccountId,
        from: ClassId,
        to: ClassId,
        amount: u128,
    ) -> Result<Conversion, LedgerError> {
        self.classes.check_pair(from, to)?;
        let available = self.balance_of_class(caller, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let conversion = self.classes.quote(from, to, amount)?;
        let to_balance = self
            .balance_of_class(caller, to)
            .checked_add(conversion.credited)
            .ok_or(LedgerError::Overflow)?;
        let to_supply = self.class_supply[to.index()]
            .checked_add(conversion.credited)
            .ok_or(LedgerError::Overflow)?;
        let from_supply = self.class_supply[from.index()]
            .checked_sub(amount)
            .ok_or_else(|| {
                LedgerError::InvariantViolation(format!(
                    "class {from} supply below a holder's balance"
                ))
            })?;
        let diluted = self
            .diluted_supply
            .checked_sub(conversion.destroyed)
            .ok_or_else(|| {
                LedgerError::InvariantViolation("diluted supply below destroyed value".into())
            })?;

        self.write_balance(caller, from, available - amount);
        self.write_balance(caller, to, to_balance);
        self.class_supply[from.index()] = from_supply;
        self.class_supply[to.index()] = to_supply;
        self.diluted_supply = diluted;
        tracing::debug!(
            account = %caller,
            from = %from,
            to = %to,
            debited = conversion.debited,
            credited = conversion.credited,
            destroyed = conversion.destroyed,
            "converted"
        );
        Ok(conversion)
    }

    /// Recompute every aggregate from the account rows and compare it with
    /// the running value.
    ///
    /// Walks every account; meant for tests, fuzzing and snapshot restore,
    /// not the operation path.
    pub fn audit(&self) -> Result<(), LedgerError> {
        let count = self.classes.count();
        if self.class_supply.len() != count {
            return Err(LedgerError::InvariantViolation(format!(
                "{} class supplies for {count} classes",
                self.class_supply.len()
            )));
        }

        let mut supply = vec![0u128; count];
        let mut diluted_sum = 0u128;
        for (account, holdings) in &self.accounts {
            if holdings.class_count() != count {
                return Err(LedgerError::InvariantViolation(format!(
                    "account {account} has {} class slots, expected {count}",
                    holdings.class_count()
                )));
            }
            if holdings.is_empty() {
                return Err(LedgerError::InvariantViolation(format!(
                    "account {account} kept an all-zero row"
                )));
            }
            for (class, raw) in holdings.iter() {
                let slot = &mut supply[class.index()];
                *slot = slot.checked_add(raw).ok_or(LedgerError::Overflow)?;
            }
            let diluted = holdings
                .diluted_checked(&self.classes)
                .ok_or(LedgerError::Overflow)?;
            diluted_sum = diluted_sum
                .checked_add(diluted)
                .ok_or(LedgerError::Overflow)?;
        }

        if supply != self.class_supply {
            return Err(LedgerError::InvariantViolation(format!(
                "class supply drifted: running {:?}, recomputed {:?}",
                self.class_supply, supply
            )));
        }
        let weighted = self
            .classes
            .classes()
            .try_fold(0u128, |acc, class| {
                acc.checked_add(self.classes.diluted_value(class, supply[class.index()])?)
            })
            .ok_or(LedgerError::Overflow)?;
        if weighted != self.diluted_supply || diluted_sum != self.diluted_supply {
            return Err(LedgerError::InvariantViolation(format!(
                "diluted supply drifted: running {}, by class {weighted}, by account {diluted_sum}",
                self.diluted_supply
            )));
        }
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn plan_move(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        class: ClassId,
    ) -> Result<Option<PlannedMove>, LedgerError> {
        check_account(to)?;
        let available = self.balance_of_class(from, class);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(None);
        }
        let to_balance = self
            .balance_of_class(to, class)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(Some(PlannedMove {
            from_balance: available - amount,
            to_balance,
        }))
    }

    fn commit_move(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        class: ClassId,
        planned: Option<PlannedMove>,
    ) {
        if let Some(planned) = planned {
            self.write_balance(from, class, planned.from_balance);
            self.write_balance(to, class, planned.to_balance);
        }
    }

    /// Store a balance, creating the row on first credit and dropping it
    /// once every class is zero.
    pub(crate) fn write_balance(&mut self, account: &AccountId, class: ClassId, value: u128) {
        let now_empty = match self.accounts.get_mut(account) {
            Some(holdings) => {
                holdings.set(class, value);
                holdings.is_empty()
            }
            None => {
                if value > 0 {
                    let mut holdings = Holdings::new(self.classes.count());
                    holdings.set(class, value);
                    self.accounts.insert(account.clone(), holdings);
                }
                return;
            }
        };
        if now_empty {
            self.accounts.remove(account);
        }
    }
}

/// Only well-formed ids may be credited or named in an allowance, so every
/// row the ledger writes survives a snapshot restore.
fn check_account(account: &AccountId) -> Result<(), LedgerError> {
    if account.is_valid() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAccount(account.clone()))
    }
}
