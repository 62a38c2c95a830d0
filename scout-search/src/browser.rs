//! Browser capability traits consumed by engine adapters and the orchestrator.
//!
//! The crate never talks to a browser directly. A host supplies a
//! [`SessionLauncher`] whose [`BrowserSession`] renders pages and exposes
//! the resulting DOM through [`DomNode`] handles.

use crate::error::Result;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// A DOM query, expressed either as a CSS selector or an XPath expression.
///
/// XPath expressions evaluated against a [`DomNode`] are relative to that
/// node when they start with `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(&'static str),
    XPath(&'static str),
}

impl Selector {
    /// The raw selector expression.
    pub fn expression(&self) -> &'static str {
        match self {
            Self::Css(expr) | Self::XPath(expr) => expr,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(expr) => write!(f, "css `{expr}`"),
            Self::XPath(expr) => write!(f, "xpath `{expr}`"),
        }
    }
}

/// A handle to an element in the currently rendered page.
pub trait DomNode: Send + Sync + Sized {
    /// Rendered text of the element and its descendants.
    fn text(&self) -> impl Future<Output = Result<String>> + Send;

    /// Value of an attribute, if present.
    fn attribute(&self, name: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Elements below this one matching `selector`, in document order.
    fn query(&self, selector: &Selector) -> impl Future<Output = Result<Vec<Self>>> + Send;
}

/// A live browser session able to render pages.
///
/// Sessions are driven strictly sequentially; implementations need not
/// support overlapping calls.
pub trait BrowserSession: Send + Sync {
    type Node: DomNode;

    /// Load `url` in the session's only tab.
    fn navigate(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Serialised markup of the rendered document.
    fn current_markup(&self) -> impl Future<Output = Result<String>> + Send;

    /// Title of the rendered document.
    fn current_title(&self) -> impl Future<Output = Result<String>> + Send;

    /// Wait until at least one element matches `selector`, failing once
    /// `timeout` elapses.
    fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Elements in the document matching `selector`, in document order.
    fn query(&self, selector: &Selector) -> impl Future<Output = Result<Vec<Self::Node>>> + Send;

    /// Close the session and release the browser.
    fn quit(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// Creates browser sessions on demand.
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession + 'static;

    /// Start a new session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Browser`] if the browser or its driver
    /// cannot be started.
    fn launch(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}
