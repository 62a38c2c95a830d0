//! Search engine adapters.
//!
//! Each module provides a struct implementing [`crate::engine::EngineAdapter`]
//! for one engine's rendered results page.

pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::BingAdapter;
pub use duckduckgo::DuckDuckGoAdapter;
pub use google::GoogleAdapter;

use crate::browser::BrowserSession;
use crate::config::SearchConfig;
use crate::engine::EngineAdapter;

/// Encode a query for a results-page URL, spaces as `+`.
pub fn encode_query(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Google, DuckDuckGo and Bing adapters, in fallback preference order.
pub fn standard_adapters<S: BrowserSession>(
    config: &SearchConfig,
) -> Vec<Box<dyn EngineAdapter<S>>> {
    vec![
        Box::new(GoogleAdapter::new(config)),
        Box::new(DuckDuckGoAdapter::new(config)),
        Box::new(BingAdapter::new(config)),
    ]
}
