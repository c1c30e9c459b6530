//! Configuration types for realms.
//!
//! Execution is single-threaded per agent, so the limits of the realm most
//! recently created on a thread are the ones enforced on that thread.

use crate::error::{ObjectError, ObjectResult};
use std::cell::Cell;

/// Per-realm limits on unbounded object-graph walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmConfig {
    /// Maximum nesting of proxy trap forwarding (a proxy whose target is a proxy ...).
    /// Default: 256
    pub proxy_depth_limit: usize,

    /// Maximum number of prototype links followed by a single lookup or cycle check.
    /// Default: 100_000
    pub prototype_walk_limit: usize,
}

const DEFAULT_CONFIG: RealmConfig = RealmConfig {
    proxy_depth_limit: 256,
    prototype_walk_limit: 100_000,
};

impl Default for RealmConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl RealmConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the proxy nesting limit.
    pub fn proxy_depth_limit(mut self, limit: usize) -> Self {
        self.proxy_depth_limit = limit;
        self
    }

    /// Set the prototype walk limit.
    pub fn prototype_walk_limit(mut self, limit: usize) -> Self {
        self.prototype_walk_limit = limit;
        self
    }

    /// Make these limits the active ones for the current thread.
    pub(crate) fn install(&self) {
        ACTIVE.with(|active| active.set(*self));
    }
}

thread_local! {
    static ACTIVE: Cell<RealmConfig> = const { Cell::new(DEFAULT_CONFIG) };
    static PROXY_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// The limits in force on this thread
pub(crate) fn active() -> RealmConfig {
    ACTIVE.with(Cell::get)
}

/// Counts prototype links followed by one walk
pub(crate) struct WalkBudget {
    remaining: usize,
}

impl WalkBudget {
    pub(crate) fn new() -> Self {
        Self {
            remaining: active().prototype_walk_limit,
        }
    }

    /// Account for one more link
    pub(crate) fn step(&mut self) -> ObjectResult<()> {
        if self.remaining == 0 {
            return Err(ObjectError::StackOverflow);
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Held while a proxy forwards an operation; released on drop
pub(crate) struct ProxyDepthGuard(());

impl ProxyDepthGuard {
    pub(crate) fn enter() -> ObjectResult<Self> {
        let limit = active().proxy_depth_limit;
        PROXY_DEPTH.with(|depth| {
            let current = depth.get();
            if current >= limit {
                return Err(ObjectError::StackOverflow);
            }
            depth.set(current + 1);
            Ok(Self(()))
        })
    }
}

impl Drop for ProxyDepthGuard {
    fn drop(&mut self) {
        PROXY_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
