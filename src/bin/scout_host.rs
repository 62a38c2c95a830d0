//! Headless search host speaking newline-delimited JSON over stdin/stdout.
//!
//! All tracing output goes to stderr so that stdout remains a clean JSON
//! protocol channel.

use scout::browser::WebDriverLauncher;
use scout::host::stdio::run_stdio_bridge;
use scout::{ScoutConfig, WebSearchService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = ScoutConfig::default_config_path();
    let config = ScoutConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", config_path.display()))?;

    tracing::info!(
        webdriver_url = %config.browser.webdriver_url,
        headless = config.browser.headless,
        "scout-host starting"
    );

    let launcher = WebDriverLauncher::new(config.browser.clone());
    let service = Arc::new(WebSearchService::with_launcher(launcher, config.search.clone())?);

    run_stdio_bridge(service).await.map_err(|e| {
        tracing::error!(error = %e, "scout-host exited with error");
        anyhow::anyhow!("scout-host failed: {e}")
    })?;

    tracing::info!("scout-host shut down cleanly");
    Ok(())
}
