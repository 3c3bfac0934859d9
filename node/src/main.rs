// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Earn Node
//!
//! Entry point for the `nova-earn-node` binary, the operator tool for the
//! earn share ledger.
//!
//! - `validate-genesis`: check a genesis file offline
//! - `import`: load a genesis file into an empty database
//! - `audit`: run the ledger invariants against a database
//! - `export`: dump a database as a genesis file
//! - `version`: print build version information

mod cli;
mod logging;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use nova_earn::keeper::invariants::{register_invariants, InvariantSet};
use nova_earn::storage::{EarnDb, VaultLedger};
use nova_earn::{export_genesis, init_genesis, GenesisState};

use cli::{Commands, NovaEarnCli};
use logging::LogFormat;

/// Database directory inside the data directory.
const DB_DIR: &str = "db";

fn main() -> Result<()> {
    let cli = NovaEarnCli::parse();
    logging::init_logging(
        "nova_earn_node=info,nova_earn=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::ValidateGenesis(args) => {
            let state = load_genesis(&args.file)?;
            let summary = GenesisSummary::of(&state);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Commands::Import(args) => import(&args.genesis, &args.data.data_dir),
        Commands::Audit(args) => audit(&args.data_dir),
        Commands::Export(args) => {
            let json = export(&args.data.data_dir)?;
            match args.out {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{json}")?;
                }
            }
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// What `validate-genesis` prints for a valid file.
#[derive(Debug, Serialize)]
struct GenesisSummary {
    allowed_vaults: Vec<String>,
    vault_records: usize,
    vault_share_records: usize,
}

impl GenesisSummary {
    fn of(state: &GenesisState) -> Self {
        Self {
            allowed_vaults: state
                .params
                .allowed_vaults
                .iter()
                .map(|v| v.denom.clone())
                .collect(),
            vault_records: state.vault_records.0.len(),
            vault_share_records: state.vault_share_records.0.len(),
        }
    }
}

/// Reads and fully validates a genesis file.
fn load_genesis(path: &Path) -> Result<GenesisState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read genesis file {}", path.display()))?;
    let state = GenesisState::from_json(&json)
        .with_context(|| format!("failed to parse genesis file {}", path.display()))?;
    state
        .validate()
        .with_context(|| format!("genesis file {} is invalid", path.display()))?;
    tracing::info!(path = %path.display(), "genesis file valid");
    Ok(state)
}

fn open_ledger(data_dir: &Path) -> Result<(Arc<EarnDb>, VaultLedger)> {
    let db_path = data_dir.join(DB_DIR);
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let db = Arc::new(
        EarnDb::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?,
    );
    tracing::debug!(path = %db_path.display(), "database opened");
    let ledger = VaultLedger::new(db.clone());
    Ok((db, ledger))
}

/// Loads `genesis` into the database under `data_dir`. Refuses to touch a
/// database that already holds earn state.
fn import(genesis: &Path, data_dir: &Path) -> Result<()> {
    let state = load_genesis(genesis)?;
    let (db, ledger) = open_ledger(data_dir)?;
    if !db.is_empty() {
        bail!(
            "database at {} already holds earn state",
            data_dir.display()
        );
    }

    init_genesis(&ledger, &state).context("genesis import failed")?;
    db.flush().context("failed to flush database")?;

    tracing::info!(data_dir = %data_dir.display(), "genesis imported");
    Ok(())
}

/// Runs every registered invariant. Broken invariants are an error.
fn audit(data_dir: &Path) -> Result<()> {
    let (_db, ledger) = open_ledger(data_dir)?;

    let mut invariants = InvariantSet::new();
    register_invariants(&mut invariants);

    let mut broken = Vec::new();
    for report in invariants.check(&ledger) {
        let route = format!("{}/{}", report.module, report.route);
        if report.broken {
            println!("BROKEN {route}");
            print!("{}", report.message);
            broken.push(route);
        } else {
            println!("ok     {route}");
        }
    }

    if !broken.is_empty() {
        bail!("{} invariant(s) broken: {}", broken.len(), broken.join(", "));
    }
    tracing::info!(data_dir = %data_dir.display(), "all invariants hold");
    Ok(())
}

/// The database under `data_dir` as pretty genesis JSON.
fn export(data_dir: &Path) -> Result<String> {
    let (_db, ledger) = open_ledger(data_dir)?;
    let state = export_genesis(&ledger).context("genesis export failed")?;
    Ok(state.to_json_pretty()?)
}

fn print_version() {
    println!("nova-earn-node {}", env!("CARGO_PKG_VERSION"));
    println!("module         {}", nova_earn::config::MODULE_NAME);
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
