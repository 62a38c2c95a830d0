//! Core search orchestrator: ordered engine fallback over one browser session.
//!
//! Engines are tried strictly one after another in preference order. The
//! first engine to return a non-empty result list wins; a failing engine
//! is marked blocked and skipped by later searches until it recovers or
//! the caller resets engine health.

use std::collections::BTreeMap;

use crate::browser::{BrowserSession, SessionLauncher};
use crate::config::{MAX_PAGE_LENGTH, SearchConfig};
use crate::content::extract_text;
use crate::engine::{EngineAdapter, SearchRequest};
use crate::engines::standard_adapters;
use crate::error::{Result, SearchError};
use crate::health::{EngineHealthTracker, EngineReport};
use crate::types::{EngineStatus, PageContent, SearchEngine, SearchOutcome};

/// Owns the browser session, the engine adapters and engine health.
///
/// The session is launched lazily on the first operation that needs a
/// browser and kept until [`SearchOrchestrator::shutdown`]. Operations take
/// `&mut self`; callers sharing an orchestrator must serialise access.
pub struct SearchOrchestrator<L: SessionLauncher> {
    launcher: L,
    session: Option<L::Session>,
    adapters: Vec<Box<dyn EngineAdapter<L::Session>>>,
    health: EngineHealthTracker,
    config: SearchConfig,
}

impl<L: SessionLauncher> SearchOrchestrator<L> {
    /// Create an orchestrator with the standard Google → DuckDuckGo → Bing
    /// adapters.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(launcher: L, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let adapters = standard_adapters(&config);
        Ok(Self::with_adapters(launcher, config, adapters))
    }

    /// Create an orchestrator trying `adapters` in the order given.
    pub fn with_adapters(
        launcher: L,
        config: SearchConfig,
        adapters: Vec<Box<dyn EngineAdapter<L::Session>>>,
    ) -> Self {
        Self {
            launcher,
            session: None,
            adapters,
            health: EngineHealthTracker::new(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Engines in the order they are tried.
    pub fn engines(&self) -> Vec<SearchEngine> {
        self.adapters.iter().map(|adapter| adapter.engine()).collect()
    }

    /// Whether a browser session is currently open.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Search with ordered fallback.
    ///
    /// Each engine that is not blocked is tried in turn:
    ///
    /// 1. non-empty results: the engine is returned to service and its
    ///    results are returned immediately
    /// 2. empty results: logged, the next engine is tried, health unchanged
    /// 3. failure: the engine is marked blocked and the next one is tried
    ///
    /// When every engine is blocked or exhausted the outcome is empty with
    /// engine name `"none"`. `max_results` is clamped into `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Browser`] only if the browser session cannot
    /// be launched. Engine failures are never surfaced.
    pub async fn search_with_fallback(
        &mut self,
        query: &str,
        max_results: usize,
        include_snippets: bool,
    ) -> Result<SearchOutcome> {
        let request = SearchRequest::new(query, max_results, include_snippets);
        tracing::debug!(
            query = %request.query,
            max_results = request.max_results,
            "starting fallback search"
        );

        let Self {
            launcher,
            session,
            adapters,
            health,
            ..
        } = self;

        for adapter in adapters.iter() {
            let engine = adapter.engine();
            if health.is_blocked(engine) {
                tracing::debug!(%engine, "skipping blocked engine");
                continue;
            }

            let active = ensure_session(launcher, session).await?;
            match adapter.attempt(active, &request).await {
                Ok(results) if !results.is_empty() => {
                    health.record_success(engine);
                    tracing::info!(%engine, count = results.len(), "search succeeded");
                    return Ok(SearchOutcome {
                        results,
                        engine: Some(engine),
                    });
                }
                Ok(_) => {
                    tracing::info!(%engine, "engine returned no results; trying next engine");
                }
                Err(err) => {
                    tracing::warn!(%engine, error = %err, "engine failed; marking blocked");
                    health.record_failure(engine, &err.to_string());
                    if err.is_browser() {
                        discard_session(session).await;
                    }
                }
            }
        }

        tracing::warn!(
            blocked = ?health.blocked_engines(),
            "no engine produced results"
        );
        Ok(SearchOutcome::default())
    }

    /// Engine name → `available`/`blocked`, for every adapter's engine.
    pub fn engine_status(&self) -> BTreeMap<SearchEngine, EngineStatus> {
        self.adapters
            .iter()
            .map(|adapter| {
                let engine = adapter.engine();
                (engine, self.health.status(engine))
            })
            .collect()
    }

    /// Detailed health, in preference order.
    pub fn health_report(&self) -> Vec<EngineReport> {
        self.health.report(&self.engines())
    }

    /// Mark `engine` blocked as if its last attempt had failed.
    pub fn block_engine(&mut self, engine: SearchEngine) {
        self.health.block(engine);
    }

    /// Return every engine to service.
    pub fn reset_blocked_engines(&mut self) {
        self.health.reset();
        tracing::info!("search engine health reset");
    }

    /// Render `url` and extract its text, capped at `max_length` characters
    /// (itself capped at 20000).
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be launched, the page cannot
    /// be loaded, or the rendered page cannot be read.
    pub async fn fetch_page_content(&mut self, url: &str, max_length: usize) -> Result<PageContent> {
        let max_length = max_length.min(MAX_PAGE_LENGTH);
        let settle = self.config.page_settle();
        let active = ensure_session(&self.launcher, &mut self.session).await?;

        tracing::info!(url, "fetching page content");
        active.navigate(url).await?;
        tokio::time::sleep(settle).await;

        let title = active.current_title().await?;
        let markup = active.current_markup().await?;
        let content = extract_text(&markup, max_length);

        Ok(PageContent::new(url, title, content))
    }

    /// [`SearchOrchestrator::fetch_page_content`], with any failure folded
    /// into a [`PageContent::failed`] record.
    pub async fn get_webpage_content(&mut self, url: &str, max_length: usize) -> PageContent {
        match self.fetch_page_content(url, max_length).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(url, error = %err, "page fetch failed");
                if err.is_browser() {
                    discard_session(&mut self.session).await;
                }
                PageContent::failed(url, &err)
            }
        }
    }

    /// Close the browser session, if one is open. Safe to call repeatedly.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            match session.quit().await {
                Ok(()) => tracing::info!("browser session closed"),
                Err(err) => tracing::warn!(error = %err, "failed to close browser session"),
            }
        }
    }
}

impl<L: SessionLauncher> std::fmt::Debug for SearchOrchestrator<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("engines", &self.engines())
            .field("has_session", &self.has_session())
            .field("health", &self.health)
            .field("config", &self.config)
            .finish()
    }
}

async fn ensure_session<'s, L: SessionLauncher>(
    launcher: &L,
    slot: &'s mut Option<L::Session>,
) -> Result<&'s L::Session> {
    if slot.is_none() {
        tracing::info!("launching browser session");
        let session = launcher.launch().await.inspect_err(|err| {
            tracing::error!(error = %err, "failed to launch browser session");
        })?;
        *slot = Some(session);
    }
    slot.as_ref()
        .ok_or_else(|| SearchError::Browser("driver not initialized".into()))
}

/// Drop a session that stopped responding so the next call relaunches.
async fn discard_session<S: BrowserSession>(slot: &mut Option<S>) {
    if let Some(session) = slot.take() {
        tracing::warn!("discarding unresponsive browser session");
        if let Err(err) = session.quit().await {
            tracing::debug!(error = %err, "quit after session failure also failed");
        }
    }
}
