//! # vcreg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vcreg_cli::admin::{cmd_init, cmd_pause, cmd_status, run_chain, ChainArgs};
use vcreg_cli::credential::{run_credential, CredentialArgs};
use vcreg_cli::identity::{run_identity, IdentityArgs};
use vcreg_cli::ledger::DEFAULT_LEDGER;

/// vcreg: self-sovereign identity and verifiable credential registry.
///
/// Operates on a local JSON ledger holding the registry state, its SHA-256
/// digest, and the current block height.
#[derive(Parser, Debug)]
#[command(name = "vcreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the ledger file.
    #[arg(long, global = true, default_value = DEFAULT_LEDGER)]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty ledger.
    Init {
        /// Registry owner; fixed for the ledger's lifetime.
        #[arg(long)]
        owner: String,
    },

    /// Identity registration and lookup.
    Identity(IdentityArgs),

    /// Credential issuance, verification, and revocation.
    Credential(CredentialArgs),

    /// Toggle the pause flag (owner only).
    Pause {
        /// Calling principal; must be the owner.
        #[arg(long)]
        caller: String,
    },

    /// Height clock.
    Chain(ChainArgs),

    /// Show owner, pause state, height, and record counts.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(ledger = %cli.ledger.display(), "vcreg CLI starting");

    let ledger = cli.ledger.as_path();
    let result = match &cli.command {
        Commands::Init { owner } => cmd_init(ledger, owner),
        Commands::Identity(args) => run_identity(args, ledger),
        Commands::Credential(args) => run_credential(args, ledger),
        Commands::Pause { caller } => cmd_pause(ledger, caller),
        Commands::Chain(args) => run_chain(args, ledger),
        Commands::Status => cmd_status(ledger),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
