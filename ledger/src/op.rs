//! Serializable ledger operations.
//!
//! A [`LedgerOp`] names one mutating call together with its authenticated
//! caller. Transports and the replay tool hand these to [`Ledger::apply`].

use serde::{Deserialize, Serialize};
use strata_types::{AccountId, ClassId};

use crate::classes::Conversion;
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// One mutating ledger call.
///
/// `class` defaults to class 0 when omitted, matching the class-less
/// balance query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOp {
    Issue {
        caller: AccountId,
        account: AccountId,
        amount: u128,
        #[serde(default)]
        class: ClassId,
    },
    Transfer {
        caller: AccountId,
        to: AccountId,
        amount: u128,
        #[serde(default)]
        class: ClassId,
    },
    Approve {
        caller: AccountId,
        spender: AccountId,
        amount: u128,
        #[serde(default)]
        class: ClassId,
    },
    TransferFrom {
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u128,
        #[serde(default)]
        class: ClassId,
    },
    Convert {
        caller: AccountId,
        from_class: ClassId,
        to_class: ClassId,
        amount: u128,
    },
}

impl LedgerOp {
    /// The authenticated account on whose behalf the call is made.
    pub fn caller(&self) -> &AccountId {
        match self {
            Self::Issue { caller, .. }
            | Self::Transfer { caller, .. }
            | Self::Approve { caller, .. }
            | Self::TransferFrom { caller, .. }
            | Self::Convert { caller, .. } => caller,
        }
    }

    /// Short operation name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Issue { .. } => "issue",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Convert { .. } => "convert",
        }
    }
}

/// What a successfully applied [`LedgerOp`] did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpOutcome {
    Issued {
        account: AccountId,
        class: ClassId,
        amount: u128,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        class: ClassId,
        amount: u128,
    },
    Approved {
        owner: AccountId,
        spender: AccountId,
        class: ClassId,
        amount: u128,
    },
    Converted(Conversion),
}

impl Ledger {
    /// Dispatch a single operation. Atomic like the call it wraps.
    pub fn apply(&mut self, op: &LedgerOp) -> Result<OpOutcome, LedgerError> {
        match op {
            LedgerOp::Issue {
                caller,
                account,
                amount,
                class,
            } => {
                self.issue(caller, account, *amount, *class)?;
                Ok(OpOutcome::Issued {
                    account: account.clone(),
                    class: *class,
                    amount: *amount,
                })
            }
            LedgerOp::Transfer {
                caller,
                to,
                amount,
                class,
            } => {
                self.transfer(caller, to, *amount, *class)?;
                Ok(OpOutcome::Transferred {
                    from: caller.clone(),
                    to: to.clone(),
                    class: *class,
                    amount: *amount,
                })
            }
            LedgerOp::Approve {
                caller,
                spender,
                amount,
                class,
            } => {
                self.approve(caller, spender, *amount, *class)?;
                Ok(OpOutcome::Approved {
                    owner: caller.clone(),
                    spender: spender.clone(),
                    class: *class,
                    amount: *amount,
                })
            }
            LedgerOp::TransferFrom {
                caller,
                from,
                to,
                amount,
                class,
            } => {
                self.transfer_from(caller, from, to, *amount, *class)?;
                Ok(OpOutcome::Transferred {
                    from: from.clone(),
                    to: to.clone(),
                    class: *class,
                    amount: *amount,
                })
            }
            LedgerOp::Convert {
                caller,
                from_class,
                to_class,
                amount,
            } => self
                .convert(caller, *from_class, *to_class, *amount)
                .map(OpOutcome::Converted),
        }
    }
}
