//! # Block Heights
//!
//! [`BlockHeight`] is the registry's only notion of time. The host supplies
//! it with every call; the registry stamps `created_at` / `issued_at` with it
//! and compares it against `expires_at` on every verification.
//!
//! Heights are monotonically non-decreasing from the registry's point of
//! view. Arithmetic saturates at `u64::MAX` rather than wrapping, so a
//! saturated height never appears to move backwards.

use serde::{Deserialize, Serialize};

/// A monotonically non-decreasing block height.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Height zero.
    pub const GENESIS: BlockHeight = BlockHeight(0);

    /// Construct a height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The raw height value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The next height, saturating at `u64::MAX`.
    pub fn next(&self) -> Self {
        self.advance(1)
    }

    /// Advance by `blocks`, saturating at `u64::MAX`.
    pub fn advance(&self, blocks: u64) -> Self {
        Self(self.0.saturating_add(blocks))
    }

    /// Whether a credential expiring at `expires_at` is still live at this height.
    ///
    /// Live means no expiry was set, or this height is strictly below it.
    pub fn is_before(&self, expires_at: Option<BlockHeight>) -> bool {
        match expires_at {
            None => true,
            Some(limit) => *self < limit,
        }
    }
}

impl From<u64> for BlockHeight {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
