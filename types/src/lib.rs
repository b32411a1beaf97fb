//! Fundamental types for the Strata ledger.
//!
//! This crate defines the identity types shared by every other crate in the
//! workspace: opaque account identities and share-class identifiers.

pub mod account;
pub mod class;

pub use account::AccountId;
pub use class::ClassId;
