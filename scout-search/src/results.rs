//! Engine-agnostic result extraction.
//!
//! Every engine page is read the same way: find the result containers,
//! then pull a title, a link and optionally a snippet out of each one.
//! Engines differ only in the selectors they hand over in an
//! [`ExtractionPlan`].

use crate::browser::{BrowserSession, DomNode, Selector};
use crate::error::{Result, SearchError};
use crate::types::{SearchEngine, SearchResult};
use crate::url_normalize::{domain_of, resolve_result_url};

/// Snippet candidates must be longer than this many characters.
pub const MIN_SNIPPET_CHARS: usize = 20;

/// Selectors describing where results live on one engine's page.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionPlan {
    pub engine: SearchEngine,
    /// One match per organic result.
    pub containers: Selector,
    /// Title element within a container.
    pub title: Selector,
    /// Link candidates within a container, tried in order.
    pub links: &'static [Selector],
    /// Snippet candidates within a container, tried in order.
    pub snippets: &'static [Selector],
}

/// Fields read from one container before a rank is assigned.
struct ParsedContainer {
    title: String,
    url: String,
    snippet: String,
}

/// Extract up to `max_results` results from the page currently loaded in
/// `session`.
///
/// Containers without a usable title or link are skipped without consuming
/// a rank. Containers that fail to read are logged and skipped.
///
/// # Errors
///
/// Returns an error only if the container collection itself cannot be
/// queried.
pub async fn extract_results<S: BrowserSession>(
    session: &S,
    plan: &ExtractionPlan,
    max_results: usize,
    include_snippets: bool,
) -> Result<Vec<SearchResult>> {
    let containers = session.query(&plan.containers).await?;
    tracing::trace!(
        engine = %plan.engine,
        containers = containers.len(),
        "result containers located"
    );

    let mut results = Vec::new();
    for (index, container) in containers.iter().take(max_results).enumerate() {
        match read_container(container, plan, include_snippets).await {
            Ok(Some(parsed)) => {
                let rank = results.len() + 1;
                results.push(SearchResult {
                    domain: domain_of(&parsed.url),
                    title: parsed.title,
                    url: parsed.url,
                    snippet: parsed.snippet,
                    rank,
                    source_engine: plan.engine,
                });
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    engine = %plan.engine,
                    index,
                    error = %err,
                    "skipping unreadable result container"
                );
            }
        }
    }

    tracing::debug!(engine = %plan.engine, count = results.len(), "results parsed");
    Ok(results)
}

async fn read_container<N: DomNode>(
    container: &N,
    plan: &ExtractionPlan,
    include_snippets: bool,
) -> Result<Option<ParsedContainer>> {
    let Some(title_node) = container.query(&plan.title).await.map_err(as_parse)?.into_iter().next()
    else {
        return Ok(None);
    };
    let title = title_node.text().await.map_err(as_parse)?.trim().to_owned();
    if title.is_empty() {
        return Ok(None);
    }

    let Some(href) = first_link_href(container, plan.links).await? else {
        return Ok(None);
    };
    let Some(url) = resolve_result_url(&href) else {
        return Ok(None);
    };

    let snippet = if include_snippets {
        first_substantial_text(container, plan.snippets).await?
    } else {
        String::new()
    };

    Ok(Some(ParsedContainer {
        title,
        url,
        snippet,
    }))
}

/// `href` of the first element matched by the first link selector that
/// matches anything.
async fn first_link_href<N: DomNode>(container: &N, links: &[Selector]) -> Result<Option<String>> {
    for selector in links {
        let nodes = container.query(selector).await.map_err(as_parse)?;
        if let Some(link) = nodes.first() {
            return link.attribute("href").await.map_err(as_parse);
        }
    }
    Ok(None)
}

/// Text of the first candidate whose first match is substantial, or empty.
async fn first_substantial_text<N: DomNode>(container: &N, candidates: &[Selector]) -> Result<String> {
    for selector in candidates {
        let nodes = container.query(selector).await.map_err(as_parse)?;
        let Some(node) = nodes.first() else {
            continue;
        };
        let text = node.text().await.map_err(as_parse)?;
        let text = text.trim();
        if text.chars().count() > MIN_SNIPPET_CHARS {
            return Ok(text.to_owned());
        }
    }
    Ok(String::new())
}

fn as_parse(err: SearchError) -> SearchError {
    match err {
        SearchError::ContainerParse(_) => err,
        other => SearchError::ContainerParse(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixtureLauncher, FixtureNode, FixturePage};

    const CONTAINER: Selector = Selector::Css("div.result");
    const TITLE: Selector = Selector::Css("h3");
    const LINK: Selector = Selector::Css("h3 a");
    const ANY_LINK: Selector = Selector::Css("a[href]");
    const SNIPPET_A: Selector = Selector::Css(".snippet-a");
    const SNIPPET_B: Selector = Selector::Css(".snippet-b");

    const PLAN: ExtractionPlan = ExtractionPlan {
        engine: SearchEngine::DuckDuckGo,
        containers: CONTAINER,
        title: TITLE,
        links: &[LINK, ANY_LINK],
        snippets: &[SNIPPET_A, SNIPPET_B],
    };

    fn container(title: &str, href: &str) -> FixtureNode {
        FixtureNode::new()
            .child(TITLE, FixtureNode::with_text(title))
            .child(LINK, FixtureNode::link(href, title))
    }

    async fn run(containers: Vec<FixtureNode>, max: usize, snippets: bool) -> Vec<SearchResult> {
        let mut page = FixturePage::new("https://engine.test/");
        for node in containers {
            page = page.node(CONTAINER, node);
        }
        let session = FixtureLauncher::new(vec![page]).session();
        session.navigate("https://engine.test/?q=x").await.expect("navigate");
        extract_results(&session, &PLAN, max, snippets)
            .await
            .expect("extract")
    }

    #[tokio::test]
    async fn ranks_count_only_successful_containers() {
        let results = run(
            vec![
                container("First", "https://one.example/"),
                FixtureNode::new().child(LINK, FixtureNode::link("https://no-title.example/", "")),
                container("   ", "https://blank-title.example/"),
                container("Internal", "/search?q=more"),
                container("Second", "https://two.example/page"),
            ],
            10,
            false,
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].title, "Second");
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[1].domain, "two.example");
        assert!(results.iter().all(|r| r.source_engine == SearchEngine::DuckDuckGo));
    }

    #[tokio::test]
    async fn container_without_any_link_is_skipped() {
        let results = run(
            vec![FixtureNode::new().child(TITLE, FixtureNode::with_text("Lonely title"))],
            10,
            false,
        )
        .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_any_link_when_title_link_missing() {
        let node = FixtureNode::new()
            .child(TITLE, FixtureNode::with_text("Fallback"))
            .child(ANY_LINK, FixtureNode::link("https://fallback.example/", "x"));
        let results = run(vec![node], 10, false).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://fallback.example/");
    }

    #[tokio::test]
    async fn first_link_selector_with_matches_wins_even_if_href_is_bad() {
        let node = FixtureNode::new()
            .child(TITLE, FixtureNode::with_text("Anchor"))
            .child(LINK, FixtureNode::link("#fragment", "x"))
            .child(ANY_LINK, FixtureNode::link("https://ignored.example/", "x"));
        let results = run(vec![node], 10, false).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn google_redirect_is_unwrapped() {
        let results = run(
            vec![container("Wrapped", "/url?q=https://example.com/&sa=U&ved=2ah")],
            10,
            false,
        )
        .await;
        assert_eq!(results[0].url, "https://example.com/");
        assert_eq!(results[0].domain, "example.com");
    }

    #[tokio::test]
    async fn only_first_max_results_containers_are_examined() {
        let results = run(
            vec![
                container("Bad", "#top"),
                container("Good", "https://good.example/"),
                container("Late", "https://late.example/"),
            ],
            2,
            false,
        )
        .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Good");
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn short_snippet_candidates_are_rejected() {
        let node = container("Snippets", "https://s.example/")
            .child(SNIPPET_A, FixtureNode::with_text("exactly twenty chars"))
            .child(
                SNIPPET_B,
                FixtureNode::with_text("  this candidate is long enough to keep  "),
            );
        let results = run(vec![node], 10, true).await;
        assert_eq!(results[0].snippet, "this candidate is long enough to keep");
    }

    #[tokio::test]
    async fn all_short_snippets_yield_empty() {
        let node = container("Snippets", "https://s.example/")
            .child(SNIPPET_A, FixtureNode::with_text("short"))
            .child(SNIPPET_B, FixtureNode::with_text("exactly twenty chars"));
        let results = run(vec![node], 10, true).await;
        assert_eq!(results[0].snippet, "");
    }

    #[tokio::test]
    async fn only_first_match_of_a_candidate_is_considered() {
        let node = container("Snippets", "https://s.example/")
            .child(SNIPPET_A, FixtureNode::with_text("tiny"))
            .child(
                SNIPPET_A,
                FixtureNode::with_text("the second match would be long enough"),
            );
        let results = run(vec![node], 10, true).await;
        assert_eq!(results[0].snippet, "");
    }

    #[tokio::test]
    async fn snippets_are_skipped_when_not_requested() {
        let node = container("No snippet", "https://s.example/").child(
            SNIPPET_A,
            FixtureNode::with_text("a perfectly substantial snippet text"),
        );
        let results = run(vec![node], 10, false).await;
        assert_eq!(results[0].snippet, "");
    }

    #[tokio::test]
    async fn broken_container_is_skipped_without_consuming_rank() {
        let results = run(
            vec![
                container("Broken", "https://broken.example/").broken(),
                container("Fine", "https://fine.example/"),
            ],
            10,
            false,
        )
        .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Fine");
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn failing_container_query_is_an_error() {
        let page = FixturePage::new("https://engine.test/").failing(CONTAINER);
        let session = FixtureLauncher::new(vec![page]).session();
        session.navigate("https://engine.test/").await.expect("navigate");
        let result = extract_results(&session, &PLAN, 10, true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn no_containers_is_an_empty_success() {
        let results = run(vec![], 10, true).await;
        assert!(results.is_empty());
    }
}
