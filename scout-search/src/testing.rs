//! In-memory browser for exercising adapters and the orchestrator offline.
//!
//! A [`FixtureLauncher`] serves canned pages. Each [`FixturePage`] maps
//! selectors to prebuilt [`FixtureNode`] trees, so engine extraction can be
//! driven without a browser or a network. Selector expressions are never
//! evaluated: a query matches only what the fixture registered under that
//! exact [`Selector`].

use crate::browser::{BrowserSession, DomNode, SessionLauncher, Selector};
use crate::error::{Result, SearchError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A canned DOM element.
#[derive(Debug, Clone, Default)]
pub struct FixtureNode {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<Selector, Vec<FixtureNode>>,
    broken: bool,
}

impl FixtureNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element whose rendered text is `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// An anchor element with the given `href` and text.
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_text(text).attr("href", href)
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Register `node` as a match for `selector` below this element.
    #[must_use]
    pub fn child(mut self, selector: Selector, node: FixtureNode) -> Self {
        self.children.entry(selector).or_default().push(node);
        self
    }

    /// Make every read of this element fail, like a stale element handle.
    #[must_use]
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(SearchError::ContainerParse(
                "stale element reference".into(),
            ));
        }
        Ok(())
    }
}

impl DomNode for FixtureNode {
    async fn text(&self) -> Result<String> {
        self.check()?;
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.attributes.get(name).cloned())
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<Self>> {
        self.check()?;
        Ok(self.children.get(selector).cloned().unwrap_or_default())
    }
}

/// A canned page served for every URL starting with `url_prefix`.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    url_prefix: String,
    title: String,
    markup: String,
    root: FixtureNode,
    failing: HashSet<Selector>,
    unreachable: bool,
}

impl FixturePage {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    /// Register a document-level match for `selector`.
    #[must_use]
    pub fn node(mut self, selector: Selector, node: FixtureNode) -> Self {
        self.root = self.root.child(selector, node);
        self
    }

    /// Make document-level queries for `selector` fail.
    #[must_use]
    pub fn failing(mut self, selector: Selector) -> Self {
        self.failing.insert(selector);
        self
    }

    /// Make navigation to this page fail.
    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

/// Counters shared between a launcher and the test that owns it.
#[derive(Debug, Default)]
pub struct FixtureLog {
    launches: AtomicUsize,
    quits: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl FixtureLog {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    /// Every URL navigated to, across all sessions, in order.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

/// Launches [`FixtureSession`]s serving a fixed set of pages.
#[derive(Debug, Clone, Default)]
pub struct FixtureLauncher {
    pages: Arc<Vec<FixturePage>>,
    log: Arc<FixtureLog>,
    fail_launch: bool,
}

impl FixtureLauncher {
    pub fn new(pages: Vec<FixturePage>) -> Self {
        Self {
            pages: Arc::new(pages),
            ..Self::default()
        }
    }

    /// A launcher whose sessions can never start.
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> Arc<FixtureLog> {
        Arc::clone(&self.log)
    }

    /// Open a session directly, bypassing the launch counter.
    pub fn session(&self) -> FixtureSession {
        FixtureSession {
            pages: Arc::clone(&self.pages),
            log: Arc::clone(&self.log),
            current: Mutex::new(None),
        }
    }
}

impl SessionLauncher for FixtureLauncher {
    type Session = FixtureSession;

    async fn launch(&self) -> Result<FixtureSession> {
        if self.fail_launch {
            return Err(SearchError::Browser("driver not initialized".into()));
        }
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        Ok(self.session())
    }
}

/// A session over canned pages.
#[derive(Debug)]
pub struct FixtureSession {
    pages: Arc<Vec<FixturePage>>,
    log: Arc<FixtureLog>,
    current: Mutex<Option<usize>>,
}

impl FixtureSession {
    fn with_page<T>(&self, read: impl FnOnce(&FixturePage) -> Result<T>) -> Result<T> {
        let index = self
            .current
            .lock()
            .map_err(|_| SearchError::Browser("fixture session poisoned".into()))?
            .ok_or_else(|| SearchError::EngineUnavailable("no page loaded".into()))?;
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| SearchError::EngineUnavailable("no page loaded".into()))?;
        read(page)
    }
}

impl BrowserSession for FixtureSession {
    type Node = FixtureNode;

    async fn navigate(&self, url: &str) -> Result<()> {
        if let Ok(mut urls) = self.log.navigations.lock() {
            urls.push(url.to_owned());
        }
        let index = self
            .pages
            .iter()
            .position(|page| url.starts_with(&page.url_prefix))
            .ok_or_else(|| SearchError::EngineUnavailable(format!("navigation failed: {url}")))?;
        if self.pages[index].unreachable {
            return Err(SearchError::EngineUnavailable(format!(
                "navigation failed: {url}"
            )));
        }
        let mut current = self
            .current
            .lock()
            .map_err(|_| SearchError::Browser("fixture session poisoned".into()))?;
        *current = Some(index);
        Ok(())
    }

    async fn current_markup(&self) -> Result<String> {
        self.with_page(|page| Ok(page.markup.clone()))
    }

    async fn current_title(&self) -> Result<String> {
        self.with_page(|page| Ok(page.title.clone()))
    }

    async fn wait_for(&self, selector: &Selector, timeout: Duration) -> Result<()> {
        self.with_page(|page| {
            let present = page
                .root
                .children
                .get(selector)
                .is_some_and(|nodes| !nodes.is_empty());
            if present {
                Ok(())
            } else {
                Err(SearchError::EngineUnavailable(format!(
                    "timed out after {}s waiting for {selector}",
                    timeout.as_secs()
                )))
            }
        })
    }

    async fn query(&self, selector: &Selector) -> Result<Vec<FixtureNode>> {
        self.with_page(|page| {
            if page.failing.contains(selector) {
                return Err(SearchError::EngineUnavailable(format!(
                    "query failed for {selector}"
                )));
            }
            Ok(page.root.children.get(selector).cloned().unwrap_or_default())
        })
    }

    async fn quit(self) -> Result<()> {
        self.log.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
