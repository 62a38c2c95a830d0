//! Wire contract of the search host: one JSON object per line.
//!
//! Clients send [`CommandEnvelope`]s. Every command gets exactly one
//! [`ResponseEnvelope`] carrying the same `request_id`, and state changes
//! are announced as [`EventEnvelope`]s interleaved with the responses.

use serde::{Deserialize, Serialize};

/// Contract version carried in the `v` field of every envelope.
pub const EVENT_VERSION: u32 = 1;

/// Commands understood by the search host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "tools.list")]
    ToolsList,
    #[serde(rename = "search.web")]
    SearchWeb,
    #[serde(rename = "search.engine_status")]
    SearchEngineStatus,
    #[serde(rename = "search.reset_engines")]
    SearchResetEngines,
    #[serde(rename = "page.content")]
    PageContent,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
}

const COMMANDS: [(CommandName, &str); 8] = [
    (CommandName::HostPing, "host.ping"),
    (CommandName::HostVersion, "host.version"),
    (CommandName::ToolsList, "tools.list"),
    (CommandName::SearchWeb, "search.web"),
    (CommandName::SearchEngineStatus, "search.engine_status"),
    (CommandName::SearchResetEngines, "search.reset_engines"),
    (CommandName::PageContent, "page.content"),
    (CommandName::RuntimeStop, "runtime.stop"),
];

impl CommandName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        COMMANDS
            .iter()
            .find(|(name, _)| *name == self)
            .map_or("", |(_, wire)| *wire)
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        COMMANDS
            .iter()
            .find(|(_, wire)| *wire == raw)
            .map(|(name, _)| *name)
    }
}

/// Notifications the host pushes without being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// A `search.web` command finished; payload names the engine and count.
    #[serde(rename = "search.completed")]
    SearchCompleted,
    /// Every engine was returned to the available state.
    #[serde(rename = "search.engines_reset")]
    EnginesReset,
    /// `runtime.stop` released the browser; no further commands are read.
    #[serde(rename = "runtime.stopped")]
    RuntimeStopped,
}

/// Reply to one command. Exactly one of `payload` and `error` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// A failed command: `payload` is null and `error` holds the message.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// One command from the client. `payload` may be omitted for commands
/// without arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Check the contract version and that the request can be answered.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] for a foreign version or a blank `request_id`.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.v != EVENT_VERSION {
            return Err(EnvelopeError::UnsupportedVersion { found: self.v });
        }
        if self.request_id.trim().is_empty() {
            return Err(EnvelopeError::MissingRequestId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: HostEvent,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(event_id: impl Into<String>, event: HostEvent, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event,
            payload,
        }
    }
}

/// A command envelope the host refuses to route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("unsupported contract version {found}; expected {expected}", expected = EVENT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("request_id cannot be empty")]
    MissingRequestId,
}
