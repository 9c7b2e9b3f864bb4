//! # vcreg-registry: Identity & Credential Registry State Machine
//!
//! Implements the whole registry: one cohesive state machine over two
//! ordered maps and a pause flag.
//!
//! ## Modules
//!
//! - **Registry** (`registry.rs`): the operations: `create_identity`,
//!   `update_identity_metadata`, `issue_credential`, `verify_credential`,
//!   `revoke_credential`, `identity_exists`, `toggle_pause`: plus read-only
//!   views.
//!
//! - **Records** (`record.rs`): `Identity`, `Credential`, and the composite
//!   `CredentialKey`.
//!
//! - **Pause** (`pause.rs`): the two-state `Active ⇄ Paused` gate.
//!
//! - **Clock** (`clock.rs`): `ChainClock`, a monotonic height source for
//!   hosts that do not already have one.
//!
//! - **Snapshot** (`snapshot.rs`): deterministic export/import of the full
//!   registry state with a SHA-256 content digest.
//!
//! ## Concurrency
//!
//! All state sits behind one `parking_lot::RwLock`. Every mutating
//! operation runs its entire check-then-act sequence under a single write
//! guard, so the registry behaves as if operations executed serially.
//!
//! ## Error Ordering
//!
//! Mutating operations check pause first, then existence/uniqueness, then
//! authorization, and return the first failure as a distinct
//! [`RegistryError`] variant.

pub mod clock;
pub mod error;
pub mod pause;
pub mod record;
pub mod registry;
pub mod snapshot;

pub use clock::{ChainClock, ClockError};
pub use error::RegistryError;
pub use pause::PauseState;
pub use record::{Credential, CredentialKey, Identity};
pub use registry::{CallContext, Registry};
pub use snapshot::{CredentialEntry, IdentityEntry, RegistrySnapshot, SnapshotError};
