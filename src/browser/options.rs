//! Chrome launch options for WebDriver sessions.

use crate::config::BrowserConfig;
use rand::seq::SliceRandom;
use serde_json::{Map, Value, json};

/// Desktop Chrome user agents, one picked per session.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

/// Select a random user agent from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

/// Command-line switches for a Chrome session using `user_agent`.
pub fn chrome_args(config: &BrowserConfig, user_agent: &str) -> Vec<String> {
    let mut args = Vec::with_capacity(8);
    if config.headless {
        args.push("--headless".to_owned());
    }
    args.extend(
        [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-blink-features=AutomationControlled",
        ]
        .map(str::to_owned),
    );
    args.push(format!(
        "--window-size={},{}",
        config.window_width, config.window_height
    ));
    args.push(format!("--user-agent={user_agent}"));
    args
}

/// WebDriver capabilities requesting Chrome with the configured switches.
///
/// The `enable-automation` switch is excluded so pages do not see the
/// "controlled by automated software" flag.
pub fn chrome_capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned());

    let mut caps = Map::new();
    caps.insert("browserName".to_owned(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_owned(),
        json!({
            "args": chrome_args(config, &user_agent),
            "excludeSwitches": ["enable-automation"],
        }),
    );
    caps
}
