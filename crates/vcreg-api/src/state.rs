//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Cloning is cheap: everything sits behind `Arc`.
//!
//! ## Height Ordering
//!
//! Registry mutations read the clock and commit while holding the height
//! gate for reading; clock moves take it for writing. A record stamped with
//! height `h` therefore never commits after the clock has moved past `h`.

use std::sync::Arc;

use parking_lot::RwLock;

use vcreg_core::BlockHeight;
use vcreg_registry::{CallContext, ChainClock, ClockError, Registry};

use crate::auth::{CallerIdentity, TokenTable};
use crate::config::AppConfig;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The registry.
    pub registry: Arc<Registry>,
    /// Height source for every registry call.
    pub clock: Arc<ChainClock>,
    /// Bearer token table.
    pub tokens: TokenTable,
    /// Request counters.
    pub metrics: ApiMetrics,
    /// Resolved configuration.
    pub config: Arc<AppConfig>,
    height_gate: Arc<RwLock<()>>,
}

impl AppState {
    /// Build a fresh, empty registry from `config`.
    pub fn new(config: AppConfig) -> Self {
        let registry = Registry::new(config.owner.clone());
        Self::with_registry(config, registry)
    }

    /// Serve an existing registry, e.g. one restored from a snapshot.
    pub fn with_registry(config: AppConfig, registry: Registry) -> Self {
        if config.tokens.is_empty() {
            tracing::warn!("no bearer tokens configured; every API request will be rejected");
        }
        Self {
            registry: Arc::new(registry),
            clock: Arc::new(ChainClock::new(config.start_height)),
            tokens: TokenTable::new(config.tokens.clone()),
            metrics: ApiMetrics::new(),
            config: Arc::new(config),
            height_gate: Arc::new(RwLock::new(())),
        }
    }

    /// Run `op` with a call context for `caller` at the current height.
    ///
    /// The clock cannot move until `op` returns.
    pub fn with_context<T>(
        &self,
        caller: &CallerIdentity,
        op: impl FnOnce(&CallContext) -> T,
    ) -> T {
        let _gate = self.height_gate.read();
        let ctx = CallContext::new(caller.principal.clone(), self.clock.current());
        op(&ctx)
    }

    /// Advance the clock once no mutation is in flight.
    pub fn advance_clock(&self, blocks: u64) -> BlockHeight {
        let _gate = self.height_gate.write();
        self.clock.advance(blocks)
    }

    /// Move the clock to `height` once no mutation is in flight.
    pub fn set_clock(&self, height: BlockHeight) -> Result<(), ClockError> {
        let _gate = self.height_gate.write();
        self.clock.set(height)
    }
}
