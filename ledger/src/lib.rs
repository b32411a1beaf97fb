//! Multi-class diluted ledger.
//!
//! The asset is split into classes, each with a fixed dilution multiplier
//! saying how many base units one raw unit of the class is worth. An
//! account's fully diluted balance is `Σ balance(c) × m[c]`, and the fully
//! diluted total supply is the same sum over every account.
//!
//! This crate handles:
//! - Issuance gated by an issuer role fixed at construction
//! - Intra-class transfers, direct and delegated through per-class allowances
//! - Cross-class conversion with floor rounding on the credited side
//! - Running aggregates (class supply, fully diluted supply) kept exact
//! - Snapshots, TOML configuration and a thread-safe shared handle

pub mod allowance;
pub mod classes;
pub mod config;
pub mod error;
pub mod holdings;
pub mod ledger;
pub mod op;
pub mod shared;
pub mod snapshot;

pub use allowance::{AllowanceBook, AllowanceKey};
pub use classes::{ClassTable, Conversion};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use holdings::Holdings;
pub use ledger::Ledger;
pub use op::{LedgerOp, OpOutcome};
pub use shared::SharedLedger;
pub use snapshot::{AllowanceEntry, BalanceEntry, LedgerSnapshot, SNAPSHOT_VERSION};
pub use strata_types::{AccountId, ClassId};
