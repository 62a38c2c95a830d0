//! DuckDuckGo search engine — the first fallback.
//!
//! Uses the JavaScript results page at `https://duckduckgo.com/`, which the
//! browser renders like any visitor would see it. Result links may come
//! wrapped in DuckDuckGo's `/l/?uddg=` redirect; those are unwrapped during
//! extraction.

use crate::browser::{BrowserSession, Selector};
use crate::config::SearchConfig;
use crate::engine::{EngineAdapter, SearchRequest};
use crate::error::Result;
use crate::results::{ExtractionPlan, extract_results};
use crate::types::{SearchEngine, SearchResult};
use futures::future::BoxFuture;
use std::time::Duration;

use super::encode_query;

/// Present once the results column has rendered, even when it is empty.
pub const RESULTS_REGION: Selector =
    Selector::Css("section[data-testid='mainline'], ol.react-results--main, #links");

pub const CONTAINERS: Selector = Selector::Css("article[data-testid='result']");

pub const TITLE: Selector = Selector::Css("h2");

pub const LINKS: &[Selector] = &[
    Selector::Css("a[data-testid='result-title-a']"),
    Selector::Css("h2 a"),
];

pub const SNIPPETS: &[Selector] = &[
    Selector::Css("div[data-result='snippet']"),
    Selector::Css("[data-testid='result-snippet']"),
    Selector::Css(".result__snippet"),
];

const PLAN: ExtractionPlan = ExtractionPlan {
    engine: SearchEngine::DuckDuckGo,
    containers: CONTAINERS,
    title: TITLE,
    links: LINKS,
    snippets: SNIPPETS,
};

/// DuckDuckGo results-page adapter.
pub struct DuckDuckGoAdapter {
    wait: Duration,
}

impl DuckDuckGoAdapter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            wait: config.fallback_wait(),
        }
    }

    pub fn search_url(query: &str) -> String {
        format!("https://duckduckgo.com/?q={}", encode_query(query))
    }

    async fn run<S: BrowserSession>(
        &self,
        session: &S,
        request: &SearchRequest,
    ) -> Result<Vec<SearchResult>> {
        tracing::trace!(query = %request.query, "DuckDuckGo search");

        session.navigate(&Self::search_url(&request.query)).await?;
        session.wait_for(&RESULTS_REGION, self.wait).await?;

        extract_results(session, &PLAN, request.max_results, request.include_snippets).await
    }
}

impl<S: BrowserSession> EngineAdapter<S> for DuckDuckGoAdapter {
    fn engine(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }

    fn attempt<'a>(
        &'a self,
        session: &'a S,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        Box::pin(self.run(session, request))
    }
}
