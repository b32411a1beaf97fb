//! Ledger snapshots: the complete ledger state at a point in time.
//!
//! A snapshot holds the class table, the issuer role, every non-zero balance
//! and every outstanding allowance, in a deterministic order. The Blake2b
//! hash over that content lets a reader detect a corrupted or tampered
//! snapshot before restoring it. Aggregates are not stored; they are rebuilt
//! on restore and audited.

use std::path::Path;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use strata_types::{AccountId, ClassId};

use crate::allowance::AllowanceKey;
use crate::classes::ClassTable;
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One non-zero raw balance.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub account: AccountId,
    pub class: ClassId,
    pub amount: u128,
}

/// One non-zero allowance.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllowanceEntry {
    pub owner: AccountId,
    pub spender: AccountId,
    pub class: ClassId,
    pub amount: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Snapshot version for compatibility.
    pub version: u32,
    /// Blake2b-256 over every other field.
    pub hash: [u8; 32],
    pub multipliers: Vec<u128>,
    pub issuers: Vec<AccountId>,
    /// Sorted by account, then class.
    pub balances: Vec<BalanceEntry>,
    /// Sorted by owner, spender, class.
    pub allowances: Vec<AllowanceEntry>,
}

impl LedgerSnapshot {
    /// Build a snapshot from raw parts, sorting entries and sealing the hash.
    pub fn new(
        multipliers: Vec<u128>,
        mut issuers: Vec<AccountId>,
        mut balances: Vec<BalanceEntry>,
        mut allowances: Vec<AllowanceEntry>,
    ) -> Self {
        issuers.sort();
        balances.sort();
        allowances.sort();
        let mut snap = Self {
            version: SNAPSHOT_VERSION,
            hash: [0u8; 32],
            multipliers,
            issuers,
            balances,
            allowances,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    ///
    /// Variable-length fields are length-prefixed so distinct contents can
    /// never hash the same byte stream.
    pub fn compute_hash(&self) -> [u8; 32] {
        fn put_id(hasher: &mut Blake2b<U32>, id: &AccountId) {
            hasher.update((id.as_str().len() as u64).to_le_bytes());
            hasher.update(id.as_str().as_bytes());
        }

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());

        hasher.update((self.multipliers.len() as u64).to_le_bytes());
        for m in &self.multipliers {
            hasher.update(m.to_le_bytes());
        }

        hasher.update((self.issuers.len() as u64).to_le_bytes());
        for issuer in &self.issuers {
            put_id(&mut hasher, issuer);
        }

        hasher.update((self.balances.len() as u64).to_le_bytes());
        for entry in &self.balances {
            put_id(&mut hasher, &entry.account);
            hasher.update(entry.class.get().to_le_bytes());
            hasher.update(entry.amount.to_le_bytes());
        }

        hasher.update((self.allowances.len() as u64).to_le_bytes());
        for entry in &self.allowances {
            put_id(&mut hasher, &entry.owner);
            put_id(&mut hasher, &entry.spender);
            hasher.update(entry.class.get().to_le_bytes());
            hasher.update(entry.amount.to_le_bytes());
        }

        hasher.finalize().into()
    }

    /// Check the version and that the stored hash matches the content.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if self.compute_hash() != self.hash {
            return Err(LedgerError::Snapshot("snapshot hash mismatch".into()));
        }
        Ok(())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Decode with bincode and verify the hash.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let snap: Self =
            bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        snap.verify()?;
        Ok(snap)
    }

    /// Write the encoded snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .map_err(|e| LedgerError::Snapshot(format!("write {}: {e}", path.display())))
    }

    /// Read and verify a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let bytes = std::fs::read(path)
            .map_err(|e| LedgerError::Snapshot(format!("read {}: {e}", path.display())))?;
        Self::from_bytes(&bytes)
    }
}

impl Ledger {
    /// Capture the full ledger state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let balances = self
            .accounts
            .iter()
            .flat_map(|(account, holdings)| {
                holdings.iter().map(move |(class, amount)| BalanceEntry {
                    account: account.clone(),
                    class,
                    amount,
                })
            })
            .collect();
        let allowances = self
            .allowances
            .iter()
            .map(|(key, amount)| AllowanceEntry {
                owner: key.owner.clone(),
                spender: key.spender.clone(),
                class: key.class,
                amount,
            })
            .collect();
        LedgerSnapshot::new(
            self.classes.multipliers().to_vec(),
            self.issuers.iter().cloned().collect(),
            balances,
            allowances,
        )
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// Verifies the hash, re-validates the class table and issuer role,
    /// rejects duplicate or out-of-range entries, recomputes every aggregate
    /// and finally audits the result.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        snapshot.verify()?;
        let classes = ClassTable::new(snapshot.multipliers.clone())?;
        let mut ledger = Ledger::empty(classes, snapshot.issuers.iter().cloned().collect())?;

        for entry in &snapshot.balances {
            let multiplier = ledger.classes.check(entry.class)?;
            if !entry.account.is_valid() {
                return Err(LedgerError::Snapshot(format!(
                    "invalid account id {:?}",
                    entry.account.as_str()
                )));
            }
            if ledger.balance_of_class(&entry.account, entry.class) != 0 {
                return Err(LedgerError::Snapshot(format!(
                    "duplicate balance for {} in class {}",
                    entry.account, entry.class
                )));
            }
            let slot = entry.class.index();
            let supply = ledger.class_supply[slot]
                .checked_add(entry.amount)
                .ok_or(LedgerError::Overflow)?;
            let diluted = entry
                .amount
                .checked_mul(multiplier)
                .and_then(|value| ledger.diluted_supply.checked_add(value))
                .ok_or(LedgerError::Overflow)?;
            ledger.write_balance(&entry.account, entry.class, entry.amount);
            ledger.class_supply[slot] = supply;
            ledger.diluted_supply = diluted;
        }

        for entry in &snapshot.allowances {
            ledger.classes.check(entry.class)?;
            if let Some(bad) = [&entry.owner, &entry.spender]
                .into_iter()
                .find(|id| !id.is_valid())
            {
                return Err(LedgerError::Snapshot(format!(
                    "invalid account id {:?}",
                    bad.as_str()
                )));
            }
            let key = AllowanceKey::new(&entry.owner, &entry.spender, entry.class);
            if ledger.allowances.get(&key) != 0 {
                return Err(LedgerError::Snapshot(format!(
                    "duplicate allowance {} -> {} in class {}",
                    entry.owner, entry.spender, entry.class
                )));
            }
            ledger.allowances.set(key, entry.amount);
        }

        ledger.audit()?;
        tracing::info!(
            accounts = ledger.account_count(),
            allowances = ledger.allowances.len(),
            hash = %snapshot.hash_hex(),
            "ledger restored from snapshot"
        );
        Ok(ledger)
    }
}
