//! Per-account raw balances, one slot per class.

use serde::{Deserialize, Serialize};
use strata_types::ClassId;

use crate::classes::ClassTable;

/// Raw balances of a single account across every class.
///
/// Rows are sized to the class count when the account is first credited.
/// An all-zero row carries no information and is dropped by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    balances: Vec<u128>,
}

impl Holdings {
    pub fn new(class_count: usize) -> Self {
        Self {
            balances: vec![0; class_count],
        }
    }

    /// Raw balance in `class`; absent classes read as zero.
    pub fn get(&self, class: ClassId) -> u128 {
        self.balances.get(class.index()).copied().unwrap_or(0)
    }

    pub(crate) fn set(&mut self, class: ClassId, amount: u128) {
        if let Some(slot) = self.balances.get_mut(class.index()) {
            *slot = amount;
        }
    }

    /// Number of class slots in the row.
    pub fn class_count(&self) -> usize {
        self.balances.len()
    }

    /// True when every class balance is zero.
    pub fn is_empty(&self) -> bool {
        self.balances.iter().all(|&b| b == 0)
    }

    /// `(class, balance)` for every non-zero class.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, u128)> + '_ {
        self.balances
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b > 0)
            .filter_map(|(i, &b)| ClassId::from_index(i).map(|c| (c, b)))
    }

    /// Fully diluted value: `Σ balance(c) × m[c]`, `None` on overflow.
    pub fn diluted_checked(&self, classes: &ClassTable) -> Option<u128> {
        self.iter().try_fold(0u128, |acc, (class, raw)| {
            acc.checked_add(classes.diluted_value(class, raw)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_row_is_empty() {
        let h = Holdings::new(3);
        assert!(h.is_empty());
        assert_eq!(h.get(ClassId::new(2)), 0);
    }

    #[test]
    fn out_of_range_reads_zero_and_ignores_writes() {
        let mut h = Holdings::new(2);
        h.set(ClassId::new(5), 10);
        assert_eq!(h.get(ClassId::new(5)), 0);
        assert!(h.is_empty());
    }

    #[test]
    fn diluted_sums_weighted_balances() {
        let classes = ClassTable::new(vec![1, 4, 6]).unwrap();
        let mut h = Holdings::new(3);
        h.set(ClassId::new(0), 400);
        h.set(ClassId::new(1), 50);
        assert_eq!(h.diluted_checked(&classes), Some(600));
        assert_eq!(h.iter().count(), 2);
    }

    #[test]
    fn diluted_overflow_is_none() {
        let classes = ClassTable::new(vec![u128::MAX, 2]).unwrap();
        let mut h = Holdings::new(2);
        h.set(ClassId::new(0), 1);
        h.set(ClassId::new(1), 1);
        assert_eq!(h.diluted_checked(&classes), None);
    }
}
