//! Scout: web search through a real browser.
//!
//! The search core lives in the `scout-search` crate. This crate supplies
//! what a running host needs around it:
//!
//! - **browser**: Chrome over WebDriver (`fantoccini`) implementing the
//!   core's session traits
//! - **config**: TOML configuration for search timings and the browser
//! - **tools**: the four search tools, serialised over one orchestrator
//! - **host**: a newline-delimited JSON command bridge over stdin/stdout

pub mod browser;
pub mod config;
pub mod error;
pub mod host;
pub mod tools;

pub use config::{BrowserConfig, ScoutConfig};
pub use error::{Result, ScoutError};
pub use tools::WebSearchService;
