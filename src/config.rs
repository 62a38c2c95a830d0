//! Configuration for the search host.
//!
//! Stored as TOML. A missing file means defaults; a malformed one is an
//! error rather than a silent fallback.

use crate::error::{Result, ScoutError};
use scout_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SCOUT_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Engine timings and default request sizes.
    pub search: SearchConfig,
    /// WebDriver connection and Chrome window settings.
    pub browser: BrowserConfig,
}

/// Browser session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// URL of a running chromedriver (or compatible WebDriver server).
    pub webdriver_url: String,
    /// Run Chrome without a visible window.
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Fixed user agent. `None` picks one from the built-in desktop list
    /// each time a session launches.
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_owned(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
        }
    }
}

impl BrowserConfig {
    /// Validates browser settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] for an empty or non-HTTP WebDriver URL,
    /// a zero window dimension, or a blank user agent.
    pub fn validate(&self) -> Result<()> {
        let webdriver_url = self.webdriver_url.trim();
        if webdriver_url.is_empty() {
            return Err(ScoutError::Config("browser.webdriver_url must not be empty".into()));
        }
        let parsed = url::Url::parse(webdriver_url).map_err(|e| {
            ScoutError::Config(format!("browser.webdriver_url `{webdriver_url}` is invalid: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScoutError::Config(format!(
                "browser.webdriver_url must use http or https, got `{}`",
                parsed.scheme()
            )));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ScoutError::Config(
                "browser window dimensions must be greater than 0".into(),
            ));
        }
        if self.user_agent.as_deref().is_some_and(|ua| ua.trim().is_empty()) {
            return Err(ScoutError::Config(
                "browser.user_agent must not be blank when set".into(),
            ));
        }
        Ok(())
    }
}

impl ScoutConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.browser.validate()
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Config file location: `$SCOUT_CONFIG` if set, else
    /// `<config dir>/scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("scout")
            .join("config.toml")
    }
}
