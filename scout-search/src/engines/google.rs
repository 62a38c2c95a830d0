//! Google search engine — best results, aggressive bot detection.
//!
//! Google is the first engine tried. Its results page is rendered with
//! heavy JavaScript, so the adapter waits a fixed settle delay before
//! looking for the results region. A page that yields no results is then
//! checked for the "unusual traffic" interstitial, with the echoed query
//! removed first so a search for the interstitial's own wording is never
//! mistaken for it.

use crate::browser::{BrowserSession, Selector};
use crate::config::{MAX_RESULTS_CEILING, SearchConfig};
use crate::engine::{EngineAdapter, SearchRequest};
use crate::error::{Result, SearchError};
use crate::results::{ExtractionPlan, extract_results};
use crate::types::{SearchEngine, SearchResult};
use futures::future::BoxFuture;
use std::time::Duration;

use super::encode_query;

/// Present once organic results have rendered.
pub const RESULTS_REGION: Selector = Selector::Css("div#search, div#rso");

/// Organic result containers.
pub const CONTAINERS: Selector = Selector::XPath("//div[@class='g' or contains(@class, 'g ')]");

pub const TITLE: Selector = Selector::XPath(".//h3");

/// The anchor wrapping the title, then any anchor in the container.
pub const LINKS: &[Selector] = &[
    Selector::XPath(".//h3/parent::a | .//h3/ancestor::a"),
    Selector::XPath(".//a[@href]"),
];

/// Snippet locations across Google's markup generations, newest last.
pub const SNIPPETS: &[Selector] = &[
    Selector::XPath(".//span[contains(@class, 'aCOpRe')]"),
    Selector::XPath(".//div[contains(@class, 'VwiC3b')]"),
    Selector::XPath(".//span[contains(@class, 'st')]"),
    Selector::XPath(".//div[contains(@class, 's')]//span"),
    Selector::XPath(".//div//span[not(ancestor::h3)]"),
];

const PLAN: ExtractionPlan = ExtractionPlan {
    engine: SearchEngine::Google,
    containers: CONTAINERS,
    title: TITLE,
    links: LINKS,
    snippets: SNIPPETS,
};

/// Lowercase markers that only appear on Google's `/sorry/` interstitial.
pub const BLOCK_PHRASES: &[&str] = &[
    "our systems have detected unusual traffic",
    "action=\"/sorry/",
    "id=\"captcha-form\"",
];

/// Google results-page adapter.
pub struct GoogleAdapter {
    settle: Duration,
    wait: Duration,
}

impl GoogleAdapter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            settle: config.google_settle(),
            wait: config.google_wait(),
        }
    }

    /// Results page URL for `query`, requesting up to `max_results` hits.
    pub fn search_url(query: &str, max_results: usize) -> String {
        format!(
            "https://www.google.com/search?q={}&num={}",
            encode_query(query),
            max_results.min(MAX_RESULTS_CEILING)
        )
    }

    async fn run<S: BrowserSession>(
        &self,
        session: &S,
        request: &SearchRequest,
    ) -> Result<Vec<SearchResult>> {
        tracing::trace!(query = %request.query, "Google search");

        session
            .navigate(&Self::search_url(&request.query, request.max_results))
            .await?;
        tokio::time::sleep(self.settle).await;

        if let Err(err) = session.wait_for(&RESULTS_REGION, self.wait).await {
            // A block page never renders the results region; report it as such.
            return Err(match session.current_markup().await {
                Ok(markup) => block_error(&markup, &request.query).unwrap_or(err),
                Err(_) => err,
            });
        }

        let results =
            extract_results(session, &PLAN, request.max_results, request.include_snippets).await?;
        if !results.is_empty() {
            return Ok(results);
        }

        let markup = session.current_markup().await?;
        match block_error(&markup, &request.query) {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}

impl<S: BrowserSession> EngineAdapter<S> for GoogleAdapter {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Google
    }

    fn attempt<'a>(
        &'a self,
        session: &'a S,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        Box::pin(self.run(session, request))
    }
}

/// First block phrase found in `markup`, compared case-insensitively.
///
/// Google repeats the query in the title and the search box. A phrase the
/// query itself contains only counts when it survives removing those echoes.
pub fn detect_block(markup: &str, query: &str) -> Option<&'static str> {
    let lower = markup.to_lowercase();
    let query = query.trim().to_lowercase();
    let echoes = [escape_text(&query), escape_attribute(&query), query];

    BLOCK_PHRASES.iter().copied().find(|phrase| {
        if echoes.iter().any(|echo| echo.contains(phrase)) {
            let mut stripped = lower.clone();
            for echo in &echoes {
                stripped = stripped.replace(echo.as_str(), " ");
            }
            stripped.contains(phrase)
        } else {
            lower.contains(phrase)
        }
    })
}

/// Text-node escaping as browsers serialise it.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Attribute-value escaping as browsers serialise it.
fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;").replace('"', "&quot;")
}

fn block_error(markup: &str, query: &str) -> Option<SearchError> {
    detect_block(markup, query)
        .map(|phrase| SearchError::BlockDetected(format!("google served a block page ({phrase})")))
}
