//! Search tools exposed to hosts.
//!
//! [`WebSearchService`] owns the one [`SearchOrchestrator`] of a process and
//! serialises every operation through an async mutex, so concurrent callers
//! queue instead of interleaving on the browser session.
//!
//! | Tool | Arguments |
//! |------|-----------|
//! | `search_web` | `query`, `max_results` (default 10, capped at 100), `include_snippets` (default true) |
//! | `get_search_engine_status` | none |
//! | `reset_search_engines` | none |
//! | `get_webpage_content` | `url`, `max_length` (default 5000, capped at 20000) |

use crate::error::{Result, ScoutError};
use scout_search::config::{MAX_PAGE_LENGTH, MAX_RESULTS_CEILING};
use scout_search::{
    EngineReport, EngineStatus, PageContent, SearchConfig, SearchEngine, SearchOrchestrator,
    SearchOutcome, SessionLauncher,
};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Confirmation returned by `reset_search_engines`.
pub const RESET_CONFIRMATION: &str = "All search engines have been reset to available.";

/// Name, description and JSON argument schema of one tool.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: serde_json::Value,
}

/// Arguments of `search_web`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWebArgs {
    pub query: String,
    pub max_results: usize,
    pub include_snippets: bool,
}

impl SearchWebArgs {
    /// Parse tool arguments, applying `defaults` for omitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::InvalidArguments`] if `query` is missing or
    /// blank, or an optional field has the wrong type.
    pub fn from_value(args: &serde_json::Value, defaults: &SearchConfig) -> Result<Self> {
        let query = args
            .get("query")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ScoutError::InvalidArguments("missing required argument: query".into()))?;
        if query.trim().is_empty() {
            return Err(ScoutError::InvalidArguments("query must not be empty".into()));
        }

        let max_results = optional_count(args, "max_results")?
            .unwrap_or(defaults.default_max_results)
            .min(MAX_RESULTS_CEILING);
        let include_snippets = match args.get("include_snippets") {
            None | Some(serde_json::Value::Null) => true,
            Some(value) => value.as_bool().ok_or_else(|| {
                ScoutError::InvalidArguments("include_snippets must be a boolean".into())
            })?,
        };

        Ok(Self {
            query: query.trim().to_owned(),
            max_results,
            include_snippets,
        })
    }
}

/// Arguments of `get_webpage_content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContentArgs {
    pub url: String,
    pub max_length: usize,
}

impl PageContentArgs {
    /// Parse tool arguments, applying `defaults` for omitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::InvalidArguments`] if `url` is missing or
    /// `max_length` has the wrong type. An unusable URL is not an argument
    /// error; it comes back from the fetch as a failure record.
    pub fn from_value(args: &serde_json::Value, defaults: &SearchConfig) -> Result<Self> {
        let url = args
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ScoutError::InvalidArguments("missing required argument: url".into()))?
            .trim()
            .to_owned();
        let max_length = optional_count(args, "max_length")?
            .unwrap_or(defaults.default_page_length)
            .min(MAX_PAGE_LENGTH);
        Ok(Self { url, max_length })
    }
}

fn optional_count(args: &serde_json::Value, field: &str) -> Result<Option<usize>> {
    match args.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(usize::try_from(n).unwrap_or(usize::MAX)))
            .ok_or_else(|| {
                ScoutError::InvalidArguments(format!("{field} must be a non-negative integer"))
            }),
    }
}

/// Why `url` cannot be fetched, if it is not an absolute `http`/`https` URL.
fn unfetchable_reason(url: &str) -> Option<String> {
    if url.is_empty() {
        return Some("url must not be empty".into());
    }
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "unsupported url scheme `{}` (allowed: http, https)",
            parsed.scheme()
        )),
        Err(e) => Some(format!("invalid url `{url}`: {e}")),
    }
}

/// The four search tools over one shared orchestrator.
pub struct WebSearchService<L: SessionLauncher> {
    orchestrator: Mutex<SearchOrchestrator<L>>,
    defaults: SearchConfig,
}

impl<L: SessionLauncher> WebSearchService<L> {
    pub fn new(orchestrator: SearchOrchestrator<L>) -> Self {
        let defaults = orchestrator.config().clone();
        Self {
            orchestrator: Mutex::new(orchestrator),
            defaults,
        }
    }

    /// Build the standard orchestrator over `launcher`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_launcher(launcher: L, config: SearchConfig) -> Result<Self> {
        Ok(Self::new(SearchOrchestrator::new(launcher, config)?))
    }

    pub fn defaults(&self) -> &SearchConfig {
        &self.defaults
    }

    /// Search with engine fallback.
    ///
    /// # Errors
    ///
    /// Fails only if the browser session cannot be launched.
    pub async fn search_web(&self, args: &SearchWebArgs) -> Result<SearchOutcome> {
        let mut orchestrator = self.orchestrator.lock().await;
        let outcome = orchestrator
            .search_with_fallback(&args.query, args.max_results, args.include_snippets)
            .await?;
        Ok(outcome)
    }

    /// Current `available`/`blocked` state of every engine.
    pub async fn get_search_engine_status(&self) -> BTreeMap<SearchEngine, EngineStatus> {
        self.orchestrator.lock().await.engine_status()
    }

    /// Per-engine failure detail, in preference order.
    pub async fn engine_report(&self) -> Vec<EngineReport> {
        self.orchestrator.lock().await.health_report()
    }

    /// Return every engine to service.
    pub async fn reset_search_engines(&self) -> &'static str {
        self.orchestrator.lock().await.reset_blocked_engines();
        RESET_CONFIRMATION
    }

    /// Fetch a page's text. Unusable URLs and load failures come back as a
    /// failure record, never as an error.
    pub async fn get_webpage_content(&self, args: &PageContentArgs) -> PageContent {
        if let Some(reason) = unfetchable_reason(&args.url) {
            tracing::debug!(url = %args.url, %reason, "refusing to fetch page");
            return PageContent::failed(args.url.clone(), reason);
        }
        let mut orchestrator = self.orchestrator.lock().await;
        orchestrator
            .get_webpage_content(&args.url, args.max_length)
            .await
    }

    /// Release the browser session. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.orchestrator.lock().await.shutdown().await;
    }

    /// Tool metadata for every operation.
    pub fn tool_specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "search_web",
                description: "Search the web through a real browser, trying Google, then DuckDuckGo, then Bing. Returns titles, URLs, domains and snippets.",
                schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results to return (default 10, max 100)"
                        },
                        "include_snippets": {
                            "type": "boolean",
                            "description": "Include result snippets (default true)"
                        }
                    },
                    "required": ["query"]
                }),
            },
            ToolSpec {
                name: "get_search_engine_status",
                description: "Report whether each search engine is available or blocked.",
                schema: serde_json::json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: "reset_search_engines",
                description: "Mark every search engine as available again.",
                schema: serde_json::json!({"type": "object", "properties": {}}),
            },
            ToolSpec {
                name: "get_webpage_content",
                description: "Render a web page in the browser and return its title and readable text.",
                schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "url": {
                            "type": "string",
                            "description": "Absolute http or https URL of the page"
                        },
                        "max_length": {
                            "type": "integer",
                            "description": "Maximum characters of text to return (default 5000, max 20000)"
                        }
                    },
                    "required": ["url"]
                }),
            },
        ]
    }
}

/// Render engine status with string keys, as reported to callers.
pub fn status_payload(status: &BTreeMap<SearchEngine, EngineStatus>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = status
        .iter()
        .map(|(engine, status)| (engine.name().to_owned(), status.as_str().into()))
        .collect();
    serde_json::Value::Object(map)
}
