//! Search orchestration: ordered engine fallback, blocked-engine tracking,
//! and page content fetching over a single lazily launched browser session.

pub mod search;

pub use search::SearchOrchestrator;
