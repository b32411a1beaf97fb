//! The class table: one immutable dilution multiplier per class.

use serde::{Deserialize, Serialize};
use strata_types::ClassId;

use crate::error::LedgerError;

/// Per-class dilution multipliers, fixed for the lifetime of a ledger.
///
/// `multipliers[c]` is the number of base units one raw unit of class `c`
/// is worth. Every multiplier is strictly positive and there is at least one
/// class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTable {
    multipliers: Vec<u128>,
}

/// The outcome of converting raw units between two classes.
///
/// `destroyed` is the diluted value lost to floor rounding:
/// `debited × m[from] − credited × m[to]`, always `< m[to]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: ClassId,
    pub to: ClassId,
    pub debited: u128,
    pub credited: u128,
    pub destroyed: u128,
}

impl ClassTable {
    /// Build a table from an ordered list of multipliers (index = class id).
    pub fn new(multipliers: Vec<u128>) -> Result<Self, LedgerError> {
        if multipliers.is_empty() {
            return Err(LedgerError::Config(
                "at least one class multiplier is required".into(),
            ));
        }
        if multipliers.len() > ClassId::MAX_CLASSES {
            return Err(LedgerError::Config(format!(
                "{} classes exceed the limit of {}",
                multipliers.len(),
                ClassId::MAX_CLASSES
            )));
        }
        if let Some(index) = multipliers.iter().position(|&m| m == 0) {
            return Err(LedgerError::Config(format!(
                "multiplier for class {index} must be positive"
            )));
        }
        Ok(Self { multipliers })
    }

    /// Number of classes.
    pub fn count(&self) -> usize {
        self.multipliers.len()
    }

    pub fn multipliers(&self) -> &[u128] {
        &self.multipliers
    }

    /// Multiplier for `class`, or `None` if the class is out of range.
    pub fn multiplier(&self, class: ClassId) -> Option<u128> {
        self.multipliers.get(class.index()).copied()
    }

    /// Validate `class` and return its multiplier.
    pub fn check(&self, class: ClassId) -> Result<u128, LedgerError> {
        self.multiplier(class).ok_or(LedgerError::InvalidClass {
            class,
            count: self.count(),
        })
    }

    /// Validate a conversion pair: both classes in range and distinct.
    pub fn check_pair(&self, from: ClassId, to: ClassId) -> Result<(u128, u128), LedgerError> {
        let m_from = self.check(from)?;
        let m_to = self.check(to)?;
        if from == to {
            return Err(LedgerError::IdentityConversionRejected(from));
        }
        Ok((m_from, m_to))
    }

    /// Iterate over every class id in the table.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.multipliers.len()).filter_map(ClassId::from_index)
    }

    /// Diluted value of `raw` units of `class`, `None` on overflow or an
    /// unknown class.
    pub fn diluted_value(&self, class: ClassId, raw: u128) -> Option<u128> {
        raw.checked_mul(self.multiplier(class)?)
    }

    /// Price a conversion of `amount` raw units from `from` to `to`.
    ///
    /// `credited = floor(amount × m[from] / m[to])`. The product is checked
    /// before the division so a too-wide intermediate fails with
    /// [`LedgerError::Overflow`] instead of wrapping.
    pub fn quote(
        &self,
        from: ClassId,
        to: ClassId,
        amount: u128,
    ) -> Result<Conversion, LedgerError> {
        let (m_from, m_to) = self.check_pair(from, to)?;
        let value = amount.checked_mul(m_from).ok_or(LedgerError::Overflow)?;
        Ok(Conversion {
            from,
            to,
            debited: amount,
            credited: value / m_to,
            destroyed: value % m_to,
        })
    }
}
