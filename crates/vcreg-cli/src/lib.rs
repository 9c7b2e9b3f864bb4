//! # vcreg-cli: Command-Line Interface for the Registry
//!
//! Provides the `vcreg` binary. Every command locks and loads the ledger
//! file, verifies its digest, runs one registry operation with the ledger
//! height as context, and writes the ledger back if anything changed.
//! Concurrent invocations on one ledger run one at a time.
//!
//! ## Subcommands
//!
//! - `vcreg init --owner <principal>`: create a ledger.
//! - `vcreg identity create|update-metadata|show|exists`
//! - `vcreg credential issue|verify|revoke`
//! - `vcreg pause --caller <principal>`: toggle the pause flag.
//! - `vcreg chain advance|height`: the ledger's height clock.
//! - `vcreg status`: overview.
//!
//! ## Exit Codes
//!
//! `0` success, `1` any error (including registry rejections), `2` a
//! negative answer from `identity exists` or `credential verify`.
//!
//! ```bash
//! vcreg init --owner admin
//! vcreg identity create --caller alice --did did:ex:a --public-key 02...
//! vcreg credential issue --caller bob --subject alice --id cred1 --type kyc
//! vcreg credential verify --subject alice --id cred1
//! ```

pub mod admin;
pub mod credential;
pub mod identity;
pub mod ledger;
