//! Share-class identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one class of the asset, an index into the ledger's multiplier
/// table.
///
/// Whether a given id is in range is only known to the ledger that owns the
/// table; this type just carries the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(u16);

impl ClassId {
    /// Class 0, the class used by class-less balance queries.
    pub const BASE: Self = Self(0);

    /// Largest number of classes a ledger can hold.
    pub const MAX_CLASSES: usize = u16::MAX as usize + 1;

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// The id as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Build a class id from a table index, if it fits.
    pub fn from_index(index: usize) -> Option<Self> {
        u16::try_from(index).ok().map(Self)
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::BASE
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ClassId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}
