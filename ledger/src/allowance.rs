//! Per-class delegated spending rights.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strata_types::{AccountId, ClassId};

/// Identifies one allowance: `spender` may move up to the stored amount out
/// of `owner`'s balance in `class`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AllowanceKey {
    pub owner: AccountId,
    pub spender: AccountId,
    pub class: ClassId,
}

impl AllowanceKey {
    pub fn new(owner: &AccountId, spender: &AccountId, class: ClassId) -> Self {
        Self {
            owner: owner.clone(),
            spender: spender.clone(),
            class,
        }
    }
}

/// All outstanding allowances. Zero allowances are not stored.
#[derive(Clone, Debug, Default)]
pub struct AllowanceBook {
    entries: HashMap<AllowanceKey, u128>,
}

impl AllowanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining allowance; absent entries read as zero.
    pub fn get(&self, key: &AllowanceKey) -> u128 {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Overwrite an allowance (absolute set, last writer wins).
    pub fn set(&mut self, key: AllowanceKey, amount: u128) {
        if amount == 0 {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, amount);
        }
    }

    /// Number of non-zero allowances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AllowanceKey, u128)> {
        self.entries.iter().map(|(k, &v)| (k, v))
    }
}
