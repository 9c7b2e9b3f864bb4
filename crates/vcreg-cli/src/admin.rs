//! # Registry Administration
//!
//! `init`, `pause`, `status`, and the `chain` height commands.
//! Pausing and advancing the chain are owner-only.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use vcreg_core::{BlockHeight, Principal};
use vcreg_registry::RegistryError;

use crate::ledger::Ledger;

/// Arguments for the `vcreg chain` subcommand.
#[derive(Args, Debug)]
pub struct ChainArgs {
    #[command(subcommand)]
    pub command: ChainCommand,
}

/// Height clock subcommands.
#[derive(Subcommand, Debug)]
pub enum ChainCommand {
    /// Move the ledger height forward (owner only).
    Advance {
        /// Calling principal; must be the owner.
        #[arg(long)]
        caller: String,
        /// Blocks to advance by.
        #[arg(long, default_value_t = 1, conflicts_with = "to")]
        blocks: u64,
        /// Jump to an absolute height instead.
        #[arg(long)]
        to: Option<u64>,
    },

    /// Print the current ledger height.
    Height,
}

/// Create a new ledger.
pub fn cmd_init(ledger_path: &Path, owner: &str) -> Result<u8> {
    let owner = Principal::new(owner)?;
    let ledger = Ledger::init(ledger_path, owner.clone())?;
    println!(
        "OK: initialized registry owned by {owner} at {}",
        ledger.path().display()
    );
    Ok(0)
}

/// Toggle the pause flag.
pub fn cmd_pause(ledger_path: &Path, caller: &str) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let ledger = Ledger::load(ledger_path)?;
    let paused = ledger.registry.toggle_pause(&caller)?;
    ledger.save()?;
    println!(
        "OK: registry is now {}",
        if paused { "PAUSED" } else { "ACTIVE" }
    );
    Ok(0)
}

/// Print a registry overview.
pub fn cmd_status(ledger_path: &Path) -> Result<u8> {
    let ledger = Ledger::load(ledger_path)?;
    let registry = &ledger.registry;
    println!("Registry: {}", ledger.path().display());
    println!("  Owner: {}", registry.owner());
    println!("  State: {}", registry.pause_state());
    println!("  Height: {}", ledger.clock.current());
    println!("  Identities: {}", registry.identity_count());
    println!("  Credentials: {}", registry.credential_count());
    Ok(0)
}

/// Execute the chain subcommand.
pub fn run_chain(args: &ChainArgs, ledger_path: &Path) -> Result<u8> {
    match &args.command {
        ChainCommand::Advance { caller, blocks, to } => {
            cmd_advance(ledger_path, caller, *blocks, *to)
        }
        ChainCommand::Height => cmd_height(ledger_path),
    }
}

fn cmd_advance(ledger_path: &Path, caller: &str, blocks: u64, to: Option<u64>) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let ledger = Ledger::load(ledger_path)?;
    if caller != *ledger.registry.owner() {
        tracing::warn!(caller = %caller, "chain advance rejected: not owner");
        return Err(RegistryError::NotAuthorized.into());
    }
    let height = match to {
        Some(target) => {
            let target = BlockHeight(target);
            ledger.clock.set(target)?;
            target
        }
        None => ledger.clock.advance(blocks),
    };
    ledger.save()?;
    println!("OK: height is now {height}");
    Ok(0)
}

fn cmd_height(ledger_path: &Path) -> Result<u8> {
    let ledger = Ledger::load(ledger_path)?;
    println!("{}", ledger.clock.current());
    Ok(0)
}
