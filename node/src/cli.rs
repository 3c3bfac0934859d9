//! # CLI Interface
//!
//! Command-line structure for `nova-earn-node`, using `clap` derive.
//! Subcommands: `validate-genesis`, `import`, `audit`, `export` and
//! `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NOVA Earn operator tool.
///
/// Loads, checks and dumps the earn module's share ledger. Genesis files
/// are JSON; the ledger lives in a sled database under the data directory.
#[derive(Parser, Debug)]
#[command(
    name = "nova-earn-node",
    about = "NOVA Earn vault ledger operator tool",
    version,
    propagate_version = true
)]
pub struct NovaEarnCli {
    /// Log output format: `pretty` or `json`.
    #[arg(
        long,
        global = true,
        env = "NOVA_EARN_LOG_FORMAT",
        default_value = "pretty"
    )]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a genesis file without touching any database.
    ValidateGenesis(ValidateGenesisArgs),
    /// Load a genesis file into an empty database.
    Import(ImportArgs),
    /// Run every ledger invariant. Exits non-zero if any is broken.
    Audit(DataDirArgs),
    /// Write the database contents as a genesis file.
    Export(ExportArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for `validate-genesis`.
#[derive(Parser, Debug)]
pub struct ValidateGenesisArgs {
    /// Genesis JSON file.
    pub file: PathBuf,
}

/// Data directory holding the earn database.
#[derive(Parser, Debug)]
pub struct DataDirArgs {
    /// Created on import if it does not exist.
    #[arg(long, short = 'd', env = "NOVA_EARN_DATA_DIR", default_value = "./nova-earn-data")]
    pub data_dir: PathBuf,
}

/// Arguments for `import`.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Genesis JSON file to load.
    #[arg(long, short = 'g')]
    pub genesis: PathBuf,

    #[command(flatten)]
    pub data: DataDirArgs,
}

/// Arguments for `export`.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataDirArgs,

    /// Output file. Stdout when omitted.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}
