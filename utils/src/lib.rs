//! Shared utilities for the Strata ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat};
