//! Strata CLI: create, replay against, and inspect diluted ledger snapshots.

mod commands;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use strata_ledger::LedgerConfig;
use strata_types::AccountId;
use strata_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "strata", about = "Multi-class diluted token ledger")]
struct Cli {
    /// Log format: "human" or "json". For `init`, defaults to the config
    /// file's value.
    #[arg(long, global = true, env = "STRATA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "STRATA_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create an empty ledger snapshot from a TOML configuration file.
    Init {
        /// Path to the ledger configuration (multipliers, issuers).
        #[arg(long)]
        config: PathBuf,

        /// Where to write the snapshot.
        #[arg(long, default_value = "ledger.snap", env = "STRATA_STATE")]
        state: PathBuf,

        /// Overwrite an existing snapshot.
        #[arg(long)]
        force: bool,
    },
    /// Apply a JSON-lines operation script to a snapshot.
    Replay {
        #[arg(long, default_value = "ledger.snap", env = "STRATA_STATE")]
        state: PathBuf,

        /// One operation per line, e.g.
        /// {"transfer":{"caller":"alice","to":"bob","amount":10,"class":0}}
        #[arg(long)]
        script: PathBuf,

        /// Report outcomes without writing the snapshot back.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print class supplies, totals and balances as JSON.
    Inspect {
        #[arg(long, default_value = "ledger.snap", env = "STRATA_STATE")]
        state: PathBuf,

        /// Only show this account.
        #[arg(long)]
        account: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` reads its config before logging starts so the file's log
    // settings can act as defaults.
    let config = match &cli.command {
        Command::Init { config, .. } => Some(LedgerConfig::from_toml_file(config)?),
        _ => None,
    };
    let format = cli
        .log_format
        .or(config.as_ref().map(|c| c.log_format))
        .unwrap_or_default();
    let level = cli
        .log_level
        .clone()
        .or(config.as_ref().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_logging(format, &level);

    let stdout = io::stdout();
    match cli.command {
        Command::Init { state, force, .. } => {
            let config = config.context("configuration was not loaded")?;
            let snapshot = commands::init(&config, &state, force)?;
            let mut out = stdout.lock();
            writeln!(out, "{}", snapshot.hash_hex())?;
        }
        Command::Replay {
            state,
            script,
            dry_run,
        } => {
            let mut ledger = commands::load_ledger(&state)?;
            let file = File::open(&script)
                .with_context(|| format!("open script {}", script.display()))?;
            let stats = commands::replay(&mut ledger, BufReader::new(file), stdout.lock())?;

            if dry_run {
                tracing::info!(rejected = stats.rejected, "dry run, snapshot left untouched");
            } else {
                let snapshot = ledger.snapshot();
                snapshot.save(&state)?;
                tracing::info!(
                    state = %state.display(),
                    hash = %snapshot.hash_hex(),
                    "snapshot written"
                );
            }
        }
        Command::Inspect { state, account } => {
            let ledger = commands::load_ledger(&state)?;
            let account = account.map(AccountId::new);
            let summary = commands::summarize(&ledger, account.as_ref());
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &summary)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
