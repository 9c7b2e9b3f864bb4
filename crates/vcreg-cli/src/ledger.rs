//! # Ledger File
//!
//! The CLI keeps the whole registry in one JSON file:
//!
//! ```json
//! {
//!   "height": 12,
//!   "registry": { "owner": "...", "paused": false, "identities": [...], "credentials": [...] },
//!   "digest": { "algorithm": "sha256", "hex": "..." }
//! }
//! ```
//!
//! `digest` is the SHA-256 of the serialized `{height, registry}` pair. It is
//! recomputed on every save and verified on every load, so hand edits to
//! either the registry or the height are rejected rather than silently
//! trusted.
//!
//! ## Locking
//!
//! A loaded [`Ledger`] holds an exclusive advisory lock on the sibling
//! `<ledger>.lock` file until it is dropped. Each command therefore runs its
//! load, mutate, and save sequence as one unit against other `vcreg`
//! processes. Writes go to a fresh temp file in the ledger's directory and
//! are renamed into place.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use vcreg_core::{sha256_digest, BlockHeight, ContentDigest, Principal};
use vcreg_registry::{ChainClock, Registry, RegistrySnapshot};

/// Default ledger location, relative to the working directory.
pub const DEFAULT_LEDGER: &str = ".vcreg/ledger.json";

/// On-disk ledger format.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    height: BlockHeight,
    registry: RegistrySnapshot,
    digest: ContentDigest,
}

/// The digested part of the ledger.
#[derive(Serialize)]
struct SealedContent<'a> {
    height: BlockHeight,
    registry: &'a RegistrySnapshot,
}

fn seal(height: BlockHeight, registry: &RegistrySnapshot) -> Result<ContentDigest> {
    let bytes = serde_json::to_vec(&SealedContent { height, registry })?;
    Ok(sha256_digest(&bytes))
}

/// A loaded ledger: live registry plus its height clock.
///
/// Holds the ledger lock for as long as it lives.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    pub registry: Registry,
    pub clock: ChainClock,
    _lock: File,
}

impl Ledger {
    /// Create a fresh ledger owned by `owner`. Fails if the file exists.
    pub fn init(path: &Path, owner: Principal) -> Result<Self> {
        let dir = parent_dir(path);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let lock = acquire_lock(path)?;
        if path.exists() {
            bail!("ledger already exists: {}", path.display());
        }
        let ledger = Self {
            path: path.to_path_buf(),
            registry: Registry::new(owner),
            clock: ChainClock::default(),
            _lock: lock,
        };
        ledger.save()?;
        Ok(ledger)
    }

    /// Lock, load, and verify a ledger.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "ledger not found: {} (run `vcreg init --owner <principal>` first)",
                path.display()
            );
        }
        let lock = acquire_lock(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger {}", path.display()))?;
        let file: LedgerFile = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse ledger {}", path.display()))?;

        let actual = seal(file.height, &file.registry)?;
        if actual != file.digest {
            bail!(
                "ledger {} failed integrity check: digest mismatch: expected {}, computed {}",
                path.display(),
                file.digest,
                actual
            );
        }

        let registry = Registry::from_snapshot(file.registry)
            .with_context(|| format!("ledger {} is inconsistent", path.display()))?;

        tracing::debug!(path = %path.display(), height = %file.height, "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            registry,
            clock: ChainClock::new(file.height),
            _lock: lock,
        })
    }

    /// Persist the current state.
    pub fn save(&self) -> Result<()> {
        let registry = self.registry.snapshot();
        let height = self.clock.current();
        let digest = seal(height, &registry)?;
        tracing::debug!(path = %self.path.display(), digest = %digest, "saving ledger");
        let json = serde_json::to_vec_pretty(&LedgerFile {
            height,
            registry,
            digest,
        })?;

        let dir = parent_dir(&self.path);
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(&json)
            .with_context(|| format!("failed to write {}", tmp.path().display()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Open the sibling lock file and block until it is held exclusively.
fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("failed to open lock file {}", lock_path.display()))?;
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("failed to lock {}", lock_path.display()))?;
    Ok(file)
}
