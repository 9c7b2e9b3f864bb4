//! # vcreg-core: Foundational Types for the Identity Registry
//!
//! This crate is the leaf of the vcreg dependency graph. It defines the
//! domain primitives that every value must pass through before it reaches
//! the registry state machine.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for every stored field.** `Principal`, `Did`,
//!    `Metadata`, `CredentialId`, `CredentialType`, `CredentialData`,
//!    `PublicKey`. No bare strings cross into `vcreg-registry`.
//!
//! 2. **Bounds are enforced at the boundary.** Each bounded field has a fixed
//!    maximum byte length and an ASCII-only alphabet. Construction and serde
//!    deserialization both reject oversize or non-ASCII input, so a value that
//!    exists is a value the registry may store.
//!
//! 3. **Heights, not wall clocks.** `BlockHeight` is the only notion of time.
//!    It is supplied by the host and compared lazily for expiry.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vcreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod fields;
pub mod height;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::ValidationError;
pub use fields::{CredentialData, CredentialId, CredentialType, Metadata};
pub use height::BlockHeight;
pub use identity::{Did, Principal, PublicKey, PUBLIC_KEY_LEN};
