//! Ledger errors.

use strata_types::{AccountId, ClassId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("class {class} is out of range (ledger has {count} classes)")]
    InvalidClass { class: ClassId, count: usize },

    #[error("invalid account id {:?}", .0.as_str())]
    InvalidAccount(AccountId),

    #[error("{caller} is not authorized to issue")]
    Unauthorized { caller: AccountId },

    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, available {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("cannot convert class {0} into itself")]
    IdentityConversionRejected(ClassId),

    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("ledger invariant violated: {0}")]
    InvariantViolation(String),
}
