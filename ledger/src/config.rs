//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use strata_types::AccountId;
use strata_utils::LogFormat;

use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Configuration for a new ledger.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The class table and issuer role
/// only matter when a ledger is first created; a ledger restored from a
/// snapshot carries its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Dilution multiplier per class, index = class id. TOML integers are
    /// 64-bit, so configured multipliers are too.
    pub multipliers: Vec<u64>,

    /// Accounts holding the issuer role.
    pub issuers: Vec<String>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    pub fn new(multipliers: Vec<u64>, issuers: Vec<String>) -> Self {
        Self {
            multipliers,
            issuers,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Construct an empty ledger from this configuration.
    pub fn build_ledger(&self) -> Result<Ledger, LedgerError> {
        Ledger::with_issuers(
            self.multipliers.iter().copied().map(u128::from).collect(),
            self.issuers.iter().map(AccountId::new),
        )
    }
}
