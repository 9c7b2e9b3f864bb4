//! # Identity Subcommand
//!
//! - `create`: register an identity for `--caller`.
//! - `update-metadata`: replace the caller's metadata.
//! - `show`: print an identity as JSON.
//! - `exists`: exit 0 if the principal has an identity, 2 if not.

use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use vcreg_core::{Did, Metadata, Principal, PublicKey};
use vcreg_registry::CallContext;

use crate::ledger::Ledger;

/// Arguments for the `vcreg identity` subcommand.
#[derive(Args, Debug)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands.
#[derive(Subcommand, Debug)]
pub enum IdentityCommand {
    /// Register an identity for the calling principal.
    Create {
        /// Calling principal; becomes the identity's key.
        #[arg(long)]
        caller: String,
        /// Decentralized identifier (≤ 100 ASCII chars).
        #[arg(long)]
        did: String,
        /// 33-byte compressed public key as hex.
        #[arg(long)]
        public_key: String,
        /// Free-form metadata (≤ 500 ASCII chars).
        #[arg(long, default_value = "")]
        metadata: String,
    },

    /// Replace the calling principal's identity metadata.
    UpdateMetadata {
        /// Calling principal.
        #[arg(long)]
        caller: String,
        /// New metadata (≤ 500 ASCII chars).
        #[arg(long)]
        metadata: String,
    },

    /// Print a registered identity as JSON.
    Show {
        /// Principal to look up.
        #[arg(long)]
        principal: String,
    },

    /// Check whether a principal has an identity.
    Exists {
        /// Principal to check.
        #[arg(long)]
        principal: String,
    },
}

/// Execute the identity subcommand.
pub fn run_identity(args: &IdentityArgs, ledger_path: &Path) -> Result<u8> {
    match &args.command {
        IdentityCommand::Create {
            caller,
            did,
            public_key,
            metadata,
        } => cmd_create(ledger_path, caller, did, public_key, metadata),
        IdentityCommand::UpdateMetadata { caller, metadata } => {
            cmd_update_metadata(ledger_path, caller, metadata)
        }
        IdentityCommand::Show { principal } => cmd_show(ledger_path, principal),
        IdentityCommand::Exists { principal } => cmd_exists(ledger_path, principal),
    }
}

fn cmd_create(
    ledger_path: &Path,
    caller: &str,
    did: &str,
    public_key: &str,
    metadata: &str,
) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let did = Did::new(did)?;
    let public_key = PublicKey::from_hex(public_key)?;
    let metadata = Metadata::new(metadata)?;

    let ledger = Ledger::load(ledger_path)?;
    let ctx = CallContext::new(caller.clone(), ledger.clock.current());
    ledger
        .registry
        .create_identity(&ctx, did.clone(), public_key, metadata)?;
    ledger.save()?;

    println!("OK: registered identity for {caller} ({did}) at height {}", ctx.height);
    Ok(0)
}

fn cmd_update_metadata(ledger_path: &Path, caller: &str, metadata: &str) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let metadata = Metadata::new(metadata)?;

    let ledger = Ledger::load(ledger_path)?;
    let ctx = CallContext::new(caller.clone(), ledger.clock.current());
    ledger.registry.update_identity_metadata(&ctx, metadata)?;
    ledger.save()?;

    println!("OK: updated metadata for {caller}");
    Ok(0)
}

fn cmd_show(ledger_path: &Path, principal: &str) -> Result<u8> {
    let principal = Principal::new(principal)?;
    let ledger = Ledger::load(ledger_path)?;
    let Some(identity) = ledger.registry.get_identity(&principal) else {
        bail!("no identity registered for {principal}");
    };
    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(0)
}

fn cmd_exists(ledger_path: &Path, principal: &str) -> Result<u8> {
    let principal = Principal::new(principal)?;
    let ledger = Ledger::load(ledger_path)?;
    if ledger.registry.identity_exists(&principal) {
        println!("{principal}: registered");
        Ok(0)
    } else {
        println!("{principal}: not registered");
        Ok(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcreg_registry::RegistryError;

    const KEY: &str = "020202020202020202020202020202020202020202020202020202020202020202";

    fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        Ledger::init(&path, Principal::new("owner").unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn create_then_show_and_exists() {
        let (_dir, path) = setup();
        assert_eq!(cmd_create(&path, "alice", "did:ex:a", KEY, "hi").unwrap(), 0);
        assert_eq!(cmd_show(&path, "alice").unwrap(), 0);
        assert_eq!(cmd_exists(&path, "alice").unwrap(), 0);
        assert_eq!(cmd_exists(&path, "bob").unwrap(), 2);
    }

    #[test]
    fn duplicate_create_surfaces_registry_error() {
        let (_dir, path) = setup();
        cmd_create(&path, "alice", "did:ex:a", KEY, "").unwrap();
        let err = cmd_create(&path, "alice", "did:ex:b", KEY, "").unwrap_err();
        assert_eq!(
            err.downcast_ref::<RegistryError>(),
            Some(&RegistryError::IdentityExists)
        );
    }

    #[test]
    fn update_metadata_persists() {
        let (_dir, path) = setup();
        cmd_create(&path, "alice", "did:ex:a", KEY, "v1").unwrap();
        cmd_update_metadata(&path, "alice", "v2").unwrap();
        let ledger = Ledger::load(&path).unwrap();
        let id = ledger
            .registry
            .get_identity(&Principal::new("alice").unwrap())
            .unwrap();
        assert_eq!(id.metadata.as_str(), "v2");
    }

    #[test]
    fn update_without_identity_fails() {
        let (_dir, path) = setup();
        let err = cmd_update_metadata(&path, "ghost", "x").unwrap_err();
        assert_eq!(
            err.downcast_ref::<RegistryError>(),
            Some(&RegistryError::IdentityNotFound)
        );
    }

    #[test]
    fn invalid_inputs_rejected_before_touching_ledger() {
        let (_dir, path) = setup();
        assert!(cmd_create(&path, "alice", "did:ex:a", "abcd", "").is_err());
        assert!(cmd_create(&path, "alice", &"d".repeat(101), KEY, "").is_err());
        assert!(cmd_create(&path, "", "did:ex:a", KEY, "").is_err());
        assert_eq!(cmd_exists(&path, "alice").unwrap(), 2);
    }

    #[test]
    fn show_missing_identity_fails() {
        let (_dir, path) = setup();
        assert!(cmd_show(&path, "nobody").is_err());
    }
}
