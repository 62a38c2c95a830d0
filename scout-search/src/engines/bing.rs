//! Bing search engine — last-resort fallback with Microsoft's index.
//!
//! Bing routes most result links through `/ck/a` click-tracking redirects
//! whose `u` parameter carries the destination as base64; extraction
//! decodes those back to the real URL.

use crate::browser::{BrowserSession, Selector};
use crate::config::SearchConfig;
use crate::engine::{EngineAdapter, SearchRequest};
use crate::error::Result;
use crate::results::{ExtractionPlan, extract_results};
use crate::types::{SearchEngine, SearchResult};
use futures::future::BoxFuture;
use std::time::Duration;

use super::encode_query;

/// Results list; rendered even when a query has no hits.
pub const RESULTS_REGION: Selector = Selector::Css("#b_results");

pub const CONTAINERS: Selector = Selector::Css("li.b_algo");

pub const TITLE: Selector = Selector::Css("h2");

pub const LINKS: &[Selector] = &[Selector::Css("h2 a"), Selector::Css("a.tilk")];

pub const SNIPPETS: &[Selector] = &[
    Selector::Css(".b_caption p"),
    Selector::Css(".b_lineclamp2"),
    Selector::Css(".b_algoSlug"),
    Selector::Css("p"),
];

const PLAN: ExtractionPlan = ExtractionPlan {
    engine: SearchEngine::Bing,
    containers: CONTAINERS,
    title: TITLE,
    links: LINKS,
    snippets: SNIPPETS,
};

/// Bing results-page adapter.
pub struct BingAdapter {
    wait: Duration,
}

impl BingAdapter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            wait: config.fallback_wait(),
        }
    }

    pub fn search_url(query: &str) -> String {
        format!("https://www.bing.com/search?q={}", encode_query(query))
    }

    async fn run<S: BrowserSession>(
        &self,
        session: &S,
        request: &SearchRequest,
    ) -> Result<Vec<SearchResult>> {
        tracing::trace!(query = %request.query, "Bing search");

        session.navigate(&Self::search_url(&request.query)).await?;
        session.wait_for(&RESULTS_REGION, self.wait).await?;

        extract_results(session, &PLAN, request.max_results, request.include_snippets).await
    }
}

impl<S: BrowserSession> EngineAdapter<S> for BingAdapter {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Bing
    }

    fn attempt<'a>(
        &'a self,
        session: &'a S,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        Box::pin(self.run(session, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixtureLauncher, FixtureNode, FixturePage};

    const PREFIX: &str = "https://www.bing.com/search";

    fn adapter() -> BingAdapter {
        BingAdapter::new(&SearchConfig::without_delays())
    }

    fn algo(title: &str, href: &str) -> FixtureNode {
        FixtureNode::new()
            .child(TITLE, FixtureNode::with_text(title))
            .child(LINKS[0], FixtureNode::link(href, title))
    }

    fn results_page() -> FixturePage {
        FixturePage::new(PREFIX)
            .node(RESULTS_REGION, FixtureNode::new())
            .node(
                CONTAINERS,
                algo("Rust Programming Language", "https://www.rust-lang.org/").child(
                    SNIPPETS[0],
                    FixtureNode::with_text(
                        "A language empowering everyone to build reliable and efficient software.",
                    ),
                ),
            )
            .node(
                CONTAINERS,
                // "https://doc.rust-lang.org/book/" behind a click-tracking redirect.
                algo(
                    "The Rust Programming Language Book",
                    "https://www.bing.com/ck/a?!&&p=9f&u=a1aHR0cHM6Ly9kb2MucnVzdC1sYW5nLm9yZy9ib29rLw&ntb=1",
                )
                .child(SNIPPETS[0], FixtureNode::with_text("Short."))
                .child(
                    SNIPPETS[3],
                    FixtureNode::with_text("An introductory book about the Rust language."),
                ),
            )
            .node(CONTAINERS, algo("", "https://untitled.example/"))
    }

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            BingAdapter::search_url("c++ templates"),
            "https://www.bing.com/search?q=c%2B%2B+templates"
        );
    }

    #[tokio::test]
    async fn parses_results_page() {
        let session = FixtureLauncher::new(vec![results_page()]).session();
        let request = SearchRequest::new("rust", 10, true);
        let results = adapter().attempt(&session, &request).await.expect("results");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert!(results[0].snippet.contains("reliable and efficient software"));
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, "An introductory book about the Rust language.");
        assert_eq!(results[1].rank, 2);
        assert!(results.iter().all(|r| r.source_engine == SearchEngine::Bing));
    }

    #[tokio::test]
    async fn parse_respects_max_results() {
        let session = FixtureLauncher::new(vec![results_page()]).session();
        let request = SearchRequest::new("rust", 1, true);
        let results = adapter().attempt(&session, &request).await.expect("results");
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn missing_results_list_fails() {
        let session = FixtureLauncher::new(vec![FixturePage::new(PREFIX)]).session();
        let request = SearchRequest::new("rust", 10, true);
        assert!(adapter().attempt(&session, &request).await.is_err());
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BingAdapter>();
    }
}
