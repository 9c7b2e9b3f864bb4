//! # Pause Gate
//!
//! ```text
//! Active ◀──── toggle_pause (owner) ────▶ Paused
//! ```
//!
//! `Paused` rejects the four mutating operations with
//! [`RegistryError::ContractPaused`](crate::RegistryError::ContractPaused).
//! Reads are available in both states, and `toggle_pause` itself is never
//! gated, otherwise the registry could not be resumed.

use serde::{Deserialize, Serialize};

/// The registry's pause state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseState {
    /// Mutations are accepted.
    #[default]
    Active,
    /// Mutations are rejected.
    Paused,
}

impl PauseState {
    /// Build from a raw flag.
    pub fn from_flag(paused: bool) -> Self {
        if paused {
            Self::Paused
        } else {
            Self::Active
        }
    }

    /// Whether mutations are currently rejected.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// The opposite state.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Paused,
            Self::Paused => Self::Active,
        }
    }
}

impl std::fmt::Display for PauseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
        };
        f.write_str(s)
    }
}
