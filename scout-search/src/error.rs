//! Error types for the scout-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Queries never appear in error messages.

/// Errors that can occur while driving search engines or fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Navigation, load wait, or DOM query failed for an engine.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine served a blocking or CAPTCHA page.
    #[error("blocked by engine: {0}")]
    BlockDetected(String),

    /// A single result container could not be read.
    #[error("container parse error: {0}")]
    ContainerParse(String),

    /// The browser session could not be launched or stopped talking to us.
    #[error("browser error: {0}")]
    Browser(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether this error came from the browser session itself rather than
    /// from an engine's page.
    pub fn is_browser(&self) -> bool {
        matches!(self, Self::Browser(_))
    }
}

/// Convenience type alias for scout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
