//! WebDriver-backed browser sessions.
//!
//! Talks to a running chromedriver through `fantoccini`. One session owns
//! one Chrome window; all calls on it are sequential.

use super::options::chrome_capabilities;
use crate::config::BrowserConfig;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use scout_search::{BrowserSession, DomNode, SearchError, Selector, SessionLauncher};
use std::time::Duration;

/// Launches Chrome sessions through a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

impl SessionLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self) -> scout_search::Result<WebDriverSession> {
        let caps = chrome_capabilities(&self.config);
        tracing::debug!(
            webdriver_url = %self.config.webdriver_url,
            headless = self.config.headless,
            "connecting to WebDriver"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| {
                SearchError::Browser(format!(
                    "failed to start session via {}: {e}",
                    self.config.webdriver_url
                ))
            })?;

        tracing::info!("browser session started");
        Ok(WebDriverSession { client })
    }
}

/// A live Chrome session.
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
}

impl BrowserSession for WebDriverSession {
    type Node = WebDriverNode;

    async fn navigate(&self, url: &str) -> scout_search::Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| command_error(&format!("navigation to {url}"), e))
    }

    async fn current_markup(&self) -> scout_search::Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| command_error("reading page source", e))
    }

    async fn current_title(&self) -> scout_search::Result<String> {
        self.client
            .title()
            .await
            .map_err(|e| command_error("reading page title", e))
    }

    async fn wait_for(&self, selector: &Selector, timeout: Duration) -> scout_search::Result<()> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(locator(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(SearchError::EngineUnavailable(format!(
                "timed out after {}s waiting for {selector}",
                timeout.as_secs()
            ))),
            Err(e) => Err(command_error(&format!("waiting for {selector}"), e)),
        }
    }

    async fn query(&self, selector: &Selector) -> scout_search::Result<Vec<WebDriverNode>> {
        let elements = self
            .client
            .find_all(locator(selector))
            .await
            .map_err(|e| command_error(&format!("querying {selector}"), e))?;
        Ok(elements.into_iter().map(WebDriverNode).collect())
    }

    async fn quit(self) -> scout_search::Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| SearchError::Browser(format!("failed to close session: {e}")))
    }
}

/// An element in a [`WebDriverSession`]'s current page.
#[derive(Debug, Clone)]
pub struct WebDriverNode(Element);

impl DomNode for WebDriverNode {
    async fn text(&self) -> scout_search::Result<String> {
        self.0
            .text()
            .await
            .map_err(|e| SearchError::ContainerParse(format!("reading element text: {e}")))
    }

    async fn attribute(&self, name: &str) -> scout_search::Result<Option<String>> {
        self.0
            .attr(name)
            .await
            .map_err(|e| SearchError::ContainerParse(format!("reading attribute {name}: {e}")))
    }

    async fn query(&self, selector: &Selector) -> scout_search::Result<Vec<Self>> {
        let elements = self
            .0
            .find_all(locator(selector))
            .await
            .map_err(|e| SearchError::ContainerParse(format!("querying {selector}: {e}")))?;
        Ok(elements.into_iter().map(Self).collect())
    }
}

fn locator(selector: &Selector) -> Locator<'static> {
    match *selector {
        Selector::Css(expr) => Locator::Css(expr),
        Selector::XPath(expr) => Locator::XPath(expr),
    }
}

/// Map a WebDriver command failure onto the search error taxonomy.
///
/// A lost connection or dead session means the browser itself is gone;
/// anything else is a failure of the page currently being driven.
fn command_error(action: &str, err: CmdError) -> SearchError {
    let message = format!("{action} failed: {err}");
    if is_session_lost(&err) {
        SearchError::Browser(message)
    } else {
        SearchError::EngineUnavailable(message)
    }
}

fn is_session_lost(err: &CmdError) -> bool {
    if matches!(err, CmdError::Lost(_)) {
        return true;
    }
    let text = err.to_string().to_ascii_lowercase();
    text.contains("invalid session id") || text.contains("no such window")
}
