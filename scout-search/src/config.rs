//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls how long engines are given to render, the
//! settle delays applied after navigation, and the default request sizes
//! used by the tool layer.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling on results requested from a single engine.
pub const MAX_RESULTS_CEILING: usize = 100;

/// Hard ceiling on characters returned from a fetched page.
pub const MAX_PAGE_LENGTH: usize = 20_000;

/// Configuration for browser-driven search and page fetching.
///
/// Use [`Default::default()`] for the standard timings, or construct with
/// field overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fixed delay after navigating to Google before waiting for results.
    pub google_settle_ms: u64,
    /// Maximum wait for Google's results region to appear.
    pub google_wait_secs: u64,
    /// Maximum wait for DuckDuckGo or Bing result containers to appear.
    pub fallback_wait_secs: u64,
    /// Fixed delay after navigating to an arbitrary page before reading it.
    pub page_settle_ms: u64,
    /// Results requested when the caller does not say.
    pub default_max_results: usize,
    /// Page text length used when the caller does not say.
    pub default_page_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google_settle_ms: 2_000,
            google_wait_secs: 15,
            fallback_wait_secs: 10,
            page_settle_ms: 2_000,
            default_max_results: 10,
            default_page_length: 5_000,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - both wait timeouts must be greater than 0
    /// - `default_max_results` must be within `1..=100`
    /// - `default_page_length` must be within `1..=20000`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.google_wait_secs == 0 {
            return Err(SearchError::Config(
                "google_wait_secs must be greater than 0".into(),
            ));
        }
        if self.fallback_wait_secs == 0 {
            return Err(SearchError::Config(
                "fallback_wait_secs must be greater than 0".into(),
            ));
        }
        if self.default_max_results == 0 || self.default_max_results > MAX_RESULTS_CEILING {
            return Err(SearchError::Config(format!(
                "default_max_results must be between 1 and {MAX_RESULTS_CEILING}"
            )));
        }
        if self.default_page_length == 0 || self.default_page_length > MAX_PAGE_LENGTH {
            return Err(SearchError::Config(format!(
                "default_page_length must be between 1 and {MAX_PAGE_LENGTH}"
            )));
        }
        Ok(())
    }

    pub fn google_settle(&self) -> Duration {
        Duration::from_millis(self.google_settle_ms)
    }

    pub fn google_wait(&self) -> Duration {
        Duration::from_secs(self.google_wait_secs)
    }

    pub fn fallback_wait(&self) -> Duration {
        Duration::from_secs(self.fallback_wait_secs)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    /// Configuration with no settle delays, for driving in-memory sessions.
    pub fn without_delays() -> Self {
        Self {
            google_settle_ms: 0,
            page_settle_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_standard_timings() {
        let config = SearchConfig::default();
        assert_eq!(config.google_settle(), Duration::from_secs(2));
        assert_eq!(config.google_wait(), Duration::from_secs(15));
        assert_eq!(config.fallback_wait(), Duration::from_secs(10));
        assert_eq!(config.page_settle(), Duration::from_secs(2));
        assert_eq!(config.default_max_results, 10);
        assert_eq!(config.default_page_length, 5_000);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(SearchConfig::without_delays().validate().is_ok());
    }

    #[test]
    fn zero_google_wait_rejected() {
        let config = SearchConfig {
            google_wait_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("google_wait_secs"));
    }

    #[test]
    fn zero_fallback_wait_rejected() {
        let config = SearchConfig {
            fallback_wait_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_wait_secs"));
    }

    #[test]
    fn max_results_above_ceiling_rejected() {
        let config = SearchConfig {
            default_max_results: 101,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_max_results"));
    }

    #[test]
    fn page_length_above_ceiling_rejected() {
        let config = SearchConfig {
            default_page_length: 20_001,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_page_length"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"google_wait_secs": 20}"#).expect("deserialize");
        assert_eq!(config.google_wait_secs, 20);
        assert_eq!(config.fallback_wait_secs, 10);
    }
}
