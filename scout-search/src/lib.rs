//! # scout-search
//!
//! Browser-driven web search with ordered engine fallback.
//!
//! A real browser renders each engine's results page and results are read
//! from the rendered DOM, so no API keys or scraping endpoints are needed.
//!
//! ## Design
//!
//! - Google first, then DuckDuckGo, then Bing; the first engine with
//!   non-empty results wins
//! - An engine that fails is blocked and skipped until it is reset or
//!   succeeds again
//! - The browser itself sits behind [`browser::SessionLauncher`], so hosts
//!   pick the driver and tests run against [`testing`] fixtures
//! - Rendered pages can be reduced to clean, bounded text with
//!   [`content::extract_text`]
//!
//! ## Example
//!
//! ```no_run
//! # async fn example<L: scout_search::SessionLauncher>(launcher: L) -> scout_search::Result<()> {
//! let mut orchestrator =
//!     scout_search::SearchOrchestrator::new(launcher, scout_search::SearchConfig::default())?;
//! let outcome = orchestrator.search_with_fallback("rust ownership", 5, true).await?;
//! for result in &outcome.results {
//!     println!("{}. {} ({})", result.rank, result.title, result.url);
//! }
//! orchestrator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod results;
pub mod testing;
pub mod types;
pub mod url_normalize;

pub use browser::{BrowserSession, DomNode, SessionLauncher, Selector};
pub use config::SearchConfig;
pub use engine::{EngineAdapter, SearchRequest};
pub use error::{Result, SearchError};
pub use health::EngineReport;
pub use orchestrator::SearchOrchestrator;
pub use types::{EngineStatus, PageContent, SearchEngine, SearchOutcome, SearchResult};
