//! Error types for the scout host.

use scout_search::SearchError;

/// Top-level error type for the search host.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Search core error (engine, browser session or search config).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// WebDriver session error outside a search operation.
    #[error("browser error: {0}")]
    Browser(String),

    /// Invalid tool or command arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Command routing or serialisation error.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;
