//! Subcommand implementations, kept free of argument parsing so they can be
//! driven from tests with in-memory readers and writers.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;
use strata_ledger::{Ledger, LedgerConfig, LedgerOp, LedgerSnapshot, OpOutcome};
use strata_types::AccountId;

/// Create an empty ledger from `config` and write its snapshot to `state`.
pub fn init(config: &LedgerConfig, state: &Path, force: bool) -> anyhow::Result<LedgerSnapshot> {
    if state.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            state.display()
        );
    }
    let ledger = config.build_ledger().context("invalid ledger configuration")?;
    let snapshot = ledger.snapshot();
    snapshot.save(state)?;
    tracing::info!(state = %state.display(), hash = %snapshot.hash_hex(), "initialised ledger");
    Ok(snapshot)
}

/// Load a snapshot file and restore the ledger it describes.
pub fn load_ledger(state: &Path) -> anyhow::Result<Ledger> {
    let snapshot = LedgerSnapshot::load(state)?;
    Ok(Ledger::from_snapshot(&snapshot)?)
}

/// One line of replay output.
#[derive(Debug, Serialize)]
pub struct ReplayRecord {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<&'static str>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OpOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub rejected: usize,
}

/// Apply every JSON line of `script` to `ledger`, writing one JSON record
/// per operation to `out`.
///
/// Blank lines and lines starting with `#` are skipped. A line that fails
/// to parse or is rejected by the ledger is reported and the replay moves
/// on; rejected operations leave the ledger unchanged.
pub fn replay<R: BufRead, W: Write>(
    ledger: &mut Ledger,
    script: R,
    mut out: W,
) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("reading script line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record = match serde_json::from_str::<LedgerOp>(trimmed) {
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "unparseable operation");
                stats.rejected += 1;
                ReplayRecord {
                    line: line_no,
                    op: None,
                    ok: false,
                    outcome: None,
                    error: Some(format!("parse error: {e}")),
                }
            }
            Ok(op) => match ledger.apply(&op) {
                Ok(outcome) => {
                    stats.applied += 1;
                    ReplayRecord {
                        line: line_no,
                        op: Some(op.name()),
                        ok: true,
                        outcome: Some(outcome),
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        line = line_no,
                        op = op.name(),
                        caller = %op.caller(),
                        error = %e,
                        "operation rejected"
                    );
                    stats.rejected += 1;
                    ReplayRecord {
                        line: line_no,
                        op: Some(op.name()),
                        ok: false,
                        outcome: None,
                        error: Some(e.to_string()),
                    }
                }
            },
        };
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    tracing::info!(applied = stats.applied, rejected = stats.rejected, "replay finished");
    Ok(stats)
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub account: AccountId,
    /// Raw balance per class, index = class id.
    pub balances: Vec<u128>,
    pub fully_diluted: u128,
}

#[derive(Debug, Serialize)]
pub struct LedgerSummary {
    pub snapshot_hash: String,
    pub multipliers: Vec<u128>,
    pub issuers: Vec<AccountId>,
    pub class_supply: Vec<u128>,
    pub fully_diluted_total_supply: u128,
    pub allowances: usize,
    pub accounts: Vec<AccountSummary>,
}

/// Summarise `ledger`, optionally restricted to one account.
pub fn summarize(ledger: &Ledger, only: Option<&AccountId>) -> LedgerSummary {
    let classes = ledger.classes();
    let describe = |account: &AccountId| AccountSummary {
        account: account.clone(),
        balances: classes
            .classes()
            .map(|c| ledger.balance_of_class(account, c))
            .collect(),
        fully_diluted: ledger.fully_diluted_balance_of(account),
    };

    let mut accounts: Vec<AccountSummary> = match only {
        Some(account) => vec![describe(account)],
        None => ledger.accounts().map(|(account, _)| describe(account)).collect(),
    };
    accounts.sort_by(|a, b| a.account.cmp(&b.account));

    LedgerSummary {
        snapshot_hash: ledger.snapshot().hash_hex(),
        multipliers: classes.multipliers().to_vec(),
        issuers: ledger.issuers().cloned().collect(),
        class_supply: classes.classes().map(|c| ledger.class_supply(c)).collect(),
        fully_diluted_total_supply: ledger.fully_diluted_total_supply(),
        allowances: ledger.allowances().len(),
        accounts,
    }
}
