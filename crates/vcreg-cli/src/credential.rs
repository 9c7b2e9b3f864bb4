//! # Credential Subcommand
//!
//! - `issue`: issue a credential to `--subject` with `--caller` as issuer.
//! - `verify`: print the credential if valid at the ledger height (or `--at`);
//!   exit 2 when missing or expired.
//! - `revoke`: delete a credential; only its issuer may.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use vcreg_core::{BlockHeight, CredentialData, CredentialId, CredentialType, Principal};
use vcreg_registry::CallContext;

use crate::ledger::Ledger;

/// Arguments for the `vcreg credential` subcommand.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommand,
}

/// Credential subcommands.
#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// Issue a credential; the caller becomes the issuer of record.
    Issue {
        /// Issuing principal.
        #[arg(long)]
        caller: String,
        /// Subject principal (must have an identity).
        #[arg(long)]
        subject: String,
        /// Credential identifier, unique per subject.
        #[arg(long)]
        id: String,
        /// Credential type tag.
        #[arg(long = "type")]
        credential_type: String,
        /// Opaque payload.
        #[arg(long, default_value = "")]
        data: String,
        /// Height from which the credential stops verifying.
        #[arg(long)]
        expires_at: Option<u64>,
    },

    /// Verify a credential.
    Verify {
        /// Subject principal.
        #[arg(long)]
        subject: String,
        /// Credential identifier.
        #[arg(long)]
        id: String,
        /// Evaluate at this height instead of the ledger height.
        #[arg(long)]
        at: Option<u64>,
    },

    /// Revoke (delete) a credential.
    Revoke {
        /// Calling principal; must be the issuer.
        #[arg(long)]
        caller: String,
        /// Subject principal.
        #[arg(long)]
        subject: String,
        /// Credential identifier.
        #[arg(long)]
        id: String,
    },
}

/// Execute the credential subcommand.
pub fn run_credential(args: &CredentialArgs, ledger_path: &Path) -> Result<u8> {
    match &args.command {
        CredentialCommand::Issue {
            caller,
            subject,
            id,
            credential_type,
            data,
            expires_at,
        } => cmd_issue(
            ledger_path,
            caller,
            subject,
            id,
            credential_type,
            data,
            *expires_at,
        ),
        CredentialCommand::Verify { subject, id, at } => cmd_verify(ledger_path, subject, id, *at),
        CredentialCommand::Revoke {
            caller,
            subject,
            id,
        } => cmd_revoke(ledger_path, caller, subject, id),
    }
}

fn cmd_issue(
    ledger_path: &Path,
    caller: &str,
    subject: &str,
    id: &str,
    credential_type: &str,
    data: &str,
    expires_at: Option<u64>,
) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let subject = Principal::new(subject)?;
    let id = CredentialId::new(id)?;
    let credential_type = CredentialType::new(credential_type)?;
    let data = CredentialData::new(data)?;
    let expires_at = expires_at.map(BlockHeight);

    let ledger = Ledger::load(ledger_path)?;
    let ctx = CallContext::new(caller.clone(), ledger.clock.current());
    if let Some(limit) = expires_at {
        if limit <= ctx.height {
            tracing::warn!(
                expires_at = %limit,
                height = %ctx.height,
                "credential expires at or before the current height and will never verify"
            );
        }
    }
    ledger.registry.issue_credential(
        &ctx,
        subject.clone(),
        id.clone(),
        credential_type,
        data,
        expires_at,
    )?;
    ledger.save()?;

    println!("OK: {caller} issued credential {subject}/{id} at height {}", ctx.height);
    Ok(0)
}

fn cmd_verify(ledger_path: &Path, subject: &str, id: &str, at: Option<u64>) -> Result<u8> {
    let subject = Principal::new(subject)?;
    let id = CredentialId::new(id)?;

    let ledger = Ledger::load(ledger_path)?;
    let height = at.map(BlockHeight).unwrap_or_else(|| ledger.clock.current());
    match ledger.registry.verify_credential(&subject, &id, height) {
        Some(credential) => {
            println!("{}", serde_json::to_string_pretty(&credential)?);
            Ok(0)
        }
        None => {
            println!("INVALID: {subject}/{id} is missing or expired at height {height}");
            Ok(2)
        }
    }
}

fn cmd_revoke(ledger_path: &Path, caller: &str, subject: &str, id: &str) -> Result<u8> {
    let caller = Principal::new(caller)?;
    let subject = Principal::new(subject)?;
    let id = CredentialId::new(id)?;

    let ledger = Ledger::load(ledger_path)?;
    let ctx = CallContext::new(caller.clone(), ledger.clock.current());
    ledger.registry.revoke_credential(&ctx, &subject, &id)?;
    ledger.save()?;

    println!("OK: {caller} revoked credential {subject}/{id}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcreg_core::{Did, Metadata, PublicKey};
    use vcreg_registry::RegistryError;

    fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Ledger::init(&path, Principal::new("owner").unwrap()).unwrap();
        ledger
            .registry
            .create_identity(
                &CallContext::new(Principal::new("alice").unwrap(), BlockHeight(0)),
                Did::new("did:ex:a").unwrap(),
                PublicKey::from_bytes([0u8; 33]),
                Metadata::default(),
            )
            .unwrap();
        ledger.save().unwrap();
        (dir, path)
    }

    fn registry_error(err: anyhow::Error) -> Option<RegistryError> {
        err.downcast_ref::<RegistryError>().copied()
    }

    #[test]
    fn issue_verify_revoke() {
        let (_dir, path) = setup();
        assert_eq!(cmd_issue(&path, "bob", "alice", "cred1", "kyc", "ok", None).unwrap(), 0);
        assert_eq!(cmd_verify(&path, "alice", "cred1", None).unwrap(), 0);

        let err = cmd_revoke(&path, "alice", "alice", "cred1").unwrap_err();
        assert_eq!(registry_error(err), Some(RegistryError::NotAuthorized));

        assert_eq!(cmd_revoke(&path, "bob", "alice", "cred1").unwrap(), 0);
        assert_eq!(cmd_verify(&path, "alice", "cred1", None).unwrap(), 2);
    }

    #[test]
    fn verify_honours_expiry_and_at_override() {
        let (_dir, path) = setup();
        cmd_issue(&path, "bob", "alice", "c", "kyc", "", Some(10)).unwrap();
        assert_eq!(cmd_verify(&path, "alice", "c", None).unwrap(), 0);
        assert_eq!(cmd_verify(&path, "alice", "c", Some(9)).unwrap(), 0);
        assert_eq!(cmd_verify(&path, "alice", "c", Some(10)).unwrap(), 2);
    }

    #[test]
    fn issue_to_unknown_subject_fails() {
        let (_dir, path) = setup();
        let err = cmd_issue(&path, "bob", "carol", "c", "kyc", "", None).unwrap_err();
        assert_eq!(registry_error(err), Some(RegistryError::IdentityNotFound));
    }

    #[test]
    fn duplicate_issue_fails() {
        let (_dir, path) = setup();
        cmd_issue(&path, "bob", "alice", "c", "kyc", "", None).unwrap();
        let err = cmd_issue(&path, "dave", "alice", "c", "kyc", "", None).unwrap_err();
        assert_eq!(registry_error(err), Some(RegistryError::CredentialExists));
    }

    #[test]
    fn revoke_missing_fails() {
        let (_dir, path) = setup();
        let err = cmd_revoke(&path, "bob", "alice", "nope").unwrap_err();
        assert_eq!(registry_error(err), Some(RegistryError::CredentialNotFound));
    }

    #[test]
    fn oversized_type_rejected() {
        let (_dir, path) = setup();
        assert!(cmd_issue(&path, "bob", "alice", "c", &"t".repeat(51), "", None).is_err());
    }
}
