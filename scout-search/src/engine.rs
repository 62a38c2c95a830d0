//! Trait definition for pluggable engine adapters.
//!
//! Each engine (Google, DuckDuckGo, Bing) implements [`EngineAdapter`] to
//! drive a browser session through its results page and hand back
//! normalised [`SearchResult`] values.

use crate::browser::BrowserSession;
use crate::config::MAX_RESULTS_CEILING;
use crate::error::Result;
use crate::types::{SearchEngine, SearchResult};
use futures::future::BoxFuture;

/// One search as seen by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Always within `1..=100`.
    pub max_results: usize,
    pub include_snippets: bool,
}

impl SearchRequest {
    /// Build a request, clamping `max_results` into `1..=100`.
    pub fn new(query: impl Into<String>, max_results: usize, include_snippets: bool) -> Self {
        Self {
            query: query.into(),
            max_results: max_results.clamp(1, MAX_RESULTS_CEILING),
            include_snippets,
        }
    }
}

/// Drives one search engine's results page.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - load waits and (where relevant) block detection
/// - the selectors handed to [`crate::results::extract_results`]
///
/// An `Ok` with an empty list means the page loaded but held no usable
/// results; an `Err` means the engine should be treated as blocked.
pub trait EngineAdapter<S: BrowserSession>: Send + Sync {
    /// Which engine this adapter drives; also its health-tracking key.
    fn engine(&self) -> SearchEngine;

    /// Run one search against the engine using `session`.
    fn attempt<'a>(
        &'a self,
        session: &'a S,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>>;
}
