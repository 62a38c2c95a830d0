//! Core types for search results, engine identification and page content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single result scraped from a rendered search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Visible title of the result. Never empty.
    pub title: String,
    /// Absolute destination URL, with engine redirect wrappers removed.
    pub url: String,
    /// Host component of `url`.
    pub domain: String,
    /// Descriptive text shown under the title, or empty when not requested
    /// or no substantial candidate was found.
    pub snippet: String,
    /// 1-based position among the results successfully parsed from the page.
    pub rank: usize,
    /// Engine whose page produced this result.
    pub source_engine: SearchEngine,
}

/// Search engines scout can drive, in fallback preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Google: best results, most aggressive bot detection.
    Google,
    /// DuckDuckGo: JavaScript results page, tolerant of automation.
    DuckDuckGo,
    /// Bing: last-resort fallback with an independent index.
    Bing,
}

impl SearchEngine {
    /// Returns the identity key of this engine, as reported to callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::DuckDuckGo => "duckduckgo",
            Self::Bing => "bing",
        }
    }

    /// Parse an engine identity key, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            "bing" => Some(Self::Bing),
            _ => None,
        }
    }

    /// Returns all engines in fallback preference order.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::DuckDuckGo, Self::Bing]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether an engine is currently eligible for fallback attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Available,
    Blocked,
}

impl EngineStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one fallback search: the results of exactly one engine,
/// or nothing when every eligible engine came back empty or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub engine: Option<SearchEngine>,
}

impl SearchOutcome {
    /// Name of the engine that produced the results, or `"none"`.
    pub fn engine_name(&self) -> &'static str {
        self.engine.map_or("none", |engine| engine.name())
    }
}

/// Readable text extracted from a rendered web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL that was requested.
    pub url: String,
    /// The document title reported by the browser.
    pub title: String,
    /// Cleaned page text, or an error description when the fetch failed.
    pub content: String,
    /// Character count of `content`; zero for failed fetches.
    pub length: usize,
}

impl PageContent {
    /// Build a successful page record, computing `length` from `content`.
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: String) -> Self {
        let length = content.chars().count();
        Self {
            url: url.into(),
            title: title.into(),
            content,
            length,
        }
    }

    /// Build the failure record returned in place of page text.
    pub fn failed(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: format!("Error fetching content: {reason}"),
            length: 0,
        }
    }

    /// Whether this record describes a failed fetch.
    pub fn is_failure(&self) -> bool {
        self.length == 0 && self.content.starts_with("Error fetching content:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> SearchResult {
        SearchResult {
            title: "Example".into(),
            url: "https://example.com/".into(),
            domain: "example.com".into(),
            snippet: String::new(),
            rank: 1,
            source_engine: SearchEngine::Bing,
        }
    }

    #[test]
    fn search_result_serializes_engine_as_lowercase_name() {
        let json = serde_json::to_value(sample_result()).expect("serialize");
        assert_eq!(json["source_engine"], "bing");
        assert_eq!(json["rank"], 1);
        assert_eq!(json["domain"], "example.com");
    }

    #[test]
    fn search_engine_names_are_identity_keys() {
        assert_eq!(SearchEngine::Google.name(), "google");
        assert_eq!(SearchEngine::DuckDuckGo.name(), "duckduckgo");
        assert_eq!(SearchEngine::Bing.to_string(), "bing");
    }

    #[test]
    fn search_engine_all_is_preference_order() {
        assert_eq!(
            SearchEngine::all(),
            &[SearchEngine::Google, SearchEngine::DuckDuckGo, SearchEngine::Bing]
        );
    }

    #[test]
    fn search_engine_parse_accepts_names_and_alias() {
        assert_eq!(SearchEngine::parse("Google"), Some(SearchEngine::Google));
        assert_eq!(SearchEngine::parse(" ddg "), Some(SearchEngine::DuckDuckGo));
        assert_eq!(SearchEngine::parse("bing"), Some(SearchEngine::Bing));
        assert_eq!(SearchEngine::parse("brave"), None);
    }

    #[test]
    fn search_engine_deserializes_from_name() {
        let engine: SearchEngine = serde_json::from_str("\"duckduckgo\"").expect("deserialize");
        assert_eq!(engine, SearchEngine::DuckDuckGo);
    }

    #[test]
    fn engine_status_wire_names() {
        assert_eq!(EngineStatus::Available.as_str(), "available");
        assert_eq!(
            serde_json::to_string(&EngineStatus::Blocked).expect("serialize"),
            "\"blocked\""
        );
    }

    #[test]
    fn empty_outcome_reports_none() {
        let outcome = SearchOutcome::default();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.engine_name(), "none");
    }

    #[test]
    fn outcome_reports_engine_name() {
        let outcome = SearchOutcome {
            results: vec![sample_result()],
            engine: Some(SearchEngine::Bing),
        };
        assert_eq!(outcome.engine_name(), "bing");
    }

    #[test]
    fn page_content_length_counts_chars() {
        let page = PageContent::new("https://example.com", "Café", "naïve text".into());
        assert_eq!(page.length, 10);
        assert!(!page.is_failure());
    }

    #[test]
    fn failed_page_content_shape() {
        let page = PageContent::failed("https://example.com", "connection refused");
        assert_eq!(page.url, "https://example.com");
        assert!(page.title.is_empty());
        assert_eq!(page.content, "Error fetching content: connection refused");
        assert_eq!(page.length, 0);
        assert!(page.is_failure());
    }
}
