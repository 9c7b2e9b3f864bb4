//! # Chain Clock
//!
//! A thread-safe, monotonically non-decreasing height counter for hosts that
//! do not sit on top of a real chain. The HTTP API and the CLI both use it to
//! produce the height they pass into [`CallContext`](crate::CallContext).
//!
//! The clock can only move forward: `advance` saturates at `u64::MAX` and
//! `set` rejects any height below the current one.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use vcreg_core::BlockHeight;

/// Errors from height clock updates.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The requested height is lower than the current height.
    #[error("height cannot move backwards: current {current}, requested {requested}")]
    Regression {
        /// Height at the time of the request.
        current: BlockHeight,
        /// Rejected height.
        requested: BlockHeight,
    },
}

/// Monotonic block height source.
#[derive(Debug, Default)]
pub struct ChainClock {
    height: AtomicU64,
}

impl ChainClock {
    /// Start the clock at `start`.
    pub fn new(start: BlockHeight) -> Self {
        Self {
            height: AtomicU64::new(start.value()),
        }
    }

    /// The current height.
    pub fn current(&self) -> BlockHeight {
        BlockHeight(self.height.load(Ordering::SeqCst))
    }

    /// Advance by `blocks` and return the new height.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(blocks))
            })
            .unwrap_or_else(|h| h);
        BlockHeight(previous.saturating_add(blocks))
    }

    /// Jump to `height`, which must not be below the current height.
    pub fn set(&self, height: BlockHeight) -> Result<(), ClockError> {
        self.height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                (height.value() >= h).then_some(height.value())
            })
            .map(|_| ())
            .map_err(|current| ClockError::Regression {
                current: BlockHeight(current),
                requested: height,
            })
    }
}
