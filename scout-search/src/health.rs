//! Sticky per-engine health tracking.
//!
//! An engine whose attempt fails is marked blocked and skipped by every
//! later search until it either succeeds again or the caller resets the
//! tracker. There is no time-based expiry: a blocked engine stays blocked.
//!
//! ```text
//! ┌───────────┐  attempt failed   ┌─────────┐
//! │ Available ├──────────────────►│ Blocked │
//! └─────▲─────┘                   └────┬────┘
//!       │   non-empty results or reset  │
//!       └───────────────────────────────┘
//! ```

use crate::types::{EngineStatus, SearchEngine};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Health tracking data for a single search engine.
#[derive(Debug, Clone, Default)]
pub struct EngineHealth {
    /// Whether the engine is currently excluded from fallback.
    pub blocked: bool,
    /// Number of consecutive failed attempts since the last success.
    pub consecutive_failures: u32,
    /// Reason given by the most recent failure, if any.
    pub last_error: Option<String>,
    /// When the last failure occurred (if any).
    pub last_failure_at: Option<Instant>,
    /// When the last success occurred (if any).
    pub last_success_at: Option<Instant>,
}

/// One line of a health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub engine: SearchEngine,
    pub status: EngineStatus,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

/// Blocked-engine set plus failure diagnostics, owned by one orchestrator.
#[derive(Debug, Default)]
pub struct EngineHealthTracker {
    engines: HashMap<SearchEngine, EngineHealth>,
}

impl EngineHealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-empty result set, returning the engine to service.
    pub fn record_success(&mut self, engine: SearchEngine) {
        let health = self.engines.entry(engine).or_default();
        if health.blocked {
            tracing::info!(%engine, "engine recovered");
        }
        health.blocked = false;
        health.consecutive_failures = 0;
        health.last_success_at = Some(Instant::now());
    }

    /// Record a failed attempt, blocking the engine.
    pub fn record_failure(&mut self, engine: SearchEngine, reason: &str) {
        let health = self.engines.entry(engine).or_default();
        health.blocked = true;
        health.consecutive_failures += 1;
        health.last_error = Some(reason.to_owned());
        health.last_failure_at = Some(Instant::now());
    }

    /// Mark an engine blocked without an attempt having been made.
    pub fn block(&mut self, engine: SearchEngine) {
        self.engines.entry(engine).or_default().blocked = true;
    }

    pub fn is_blocked(&self, engine: SearchEngine) -> bool {
        self.engines.get(&engine).is_some_and(|h| h.blocked)
    }

    pub fn status(&self, engine: SearchEngine) -> EngineStatus {
        if self.is_blocked(engine) {
            EngineStatus::Blocked
        } else {
            EngineStatus::Available
        }
    }

    /// Currently blocked engines, in preference order.
    pub fn blocked_engines(&self) -> Vec<SearchEngine> {
        let mut blocked: Vec<SearchEngine> = self
            .engines
            .iter()
            .filter(|(_, health)| health.blocked)
            .map(|(engine, _)| *engine)
            .collect();
        blocked.sort();
        blocked
    }

    pub fn health(&self, engine: SearchEngine) -> Option<&EngineHealth> {
        self.engines.get(&engine)
    }

    /// Report on `engines`, in the order given.
    pub fn report(&self, engines: &[SearchEngine]) -> Vec<EngineReport> {
        engines
            .iter()
            .map(|engine| {
                let health = self.engines.get(engine);
                EngineReport {
                    engine: *engine,
                    status: self.status(*engine),
                    consecutive_failures: health.map_or(0, |h| h.consecutive_failures),
                    last_error: health.and_then(|h| h.last_error.clone()),
                }
            })
            .collect()
    }

    /// Return every engine to service and forget failure history.
    pub fn reset(&mut self) {
        self.engines.clear();
    }
}
