//! Host command channel and router.
//!
//! A [`HostCommandClient`] sends validated [`CommandEnvelope`]s to a single
//! [`HostCommandServer`] task, which handles them one at a time against a
//! [`SearchCommandHandler`] and replies through a oneshot channel.

use crate::error::{Result, ScoutError};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, HostEvent, ResponseEnvelope};
use crate::tools::{PageContentArgs, SearchWebArgs, ToolSpec, WebSearchService, status_payload};
use scout_search::{
    EngineReport, EngineStatus, PageContent, SearchConfig, SearchEngine, SearchOutcome,
    SessionLauncher,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Search operations the router dispatches to.
pub trait SearchCommandHandler: Send + Sync + 'static {
    /// Defaults applied to omitted command arguments.
    fn defaults(&self) -> &SearchConfig;

    fn search_web(&self, args: SearchWebArgs) -> impl Future<Output = Result<SearchOutcome>> + Send;

    fn engine_status(&self)
    -> impl Future<Output = BTreeMap<SearchEngine, EngineStatus>> + Send;

    fn engine_report(&self) -> impl Future<Output = Vec<EngineReport>> + Send;

    /// Reset engine health, returning a confirmation message.
    fn reset_engines(&self) -> impl Future<Output = &'static str> + Send;

    fn page_content(&self, args: PageContentArgs) -> impl Future<Output = PageContent> + Send;

    fn tool_specs(&self) -> Vec<ToolSpec>;

    /// Release browser resources. Called on `runtime.stop` and again when
    /// the bridge exits, so it must tolerate repeated calls.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

impl<L> SearchCommandHandler for WebSearchService<L>
where
    L: SessionLauncher + 'static,
{
    fn defaults(&self) -> &SearchConfig {
        WebSearchService::defaults(self)
    }

    async fn search_web(&self, args: SearchWebArgs) -> Result<SearchOutcome> {
        WebSearchService::search_web(self, &args).await
    }

    async fn engine_status(&self) -> BTreeMap<SearchEngine, EngineStatus> {
        self.get_search_engine_status().await
    }

    async fn engine_report(&self) -> Vec<EngineReport> {
        WebSearchService::engine_report(self).await
    }

    async fn reset_engines(&self) -> &'static str {
        self.reset_search_engines().await
    }

    async fn page_content(&self, args: PageContentArgs) -> PageContent {
        self.get_webpage_content(&args).await
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        WebSearchService::<L>::tool_specs()
    }

    async fn shutdown(&self) {
        WebSearchService::shutdown(self).await;
    }
}

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<Result<ResponseEnvelope>>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            ScoutError::Pipeline(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| ScoutError::Channel(format!("failed to send host command request: {e}")))?;

        response_rx
            .await
            .map_err(|e| ScoutError::Channel(format!("host command response dropped: {e}")))?
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

pub struct HostCommandServer<H: SearchCommandHandler> {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
    handler: Arc<H>,
    event_seq: AtomicU64,
}

#[must_use]
pub fn command_channel<H: SearchCommandHandler>(
    request_capacity: usize,
    event_capacity: usize,
    handler: Arc<H>,
) -> (HostCommandClient, HostCommandServer<H>) {
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            event_tx: event_tx.clone(),
        },
        HostCommandServer {
            request_rx,
            event_tx,
            handler,
            event_seq: AtomicU64::new(0),
        },
    )
}

impl<H: SearchCommandHandler> HostCommandServer<H> {
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.route(&request.envelope).await;
            let _ = request.response_tx.send(response);
        }
    }

    /// Route a command envelope to the appropriate handler.
    pub async fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        match envelope.command {
            CommandName::HostPing => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({"pong": true}),
            )),
            CommandName::HostVersion => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({
                    "contract_version": crate::host::contract::EVENT_VERSION,
                    "host_version": env!("CARGO_PKG_VERSION"),
                    "channel": "host_command_v1"
                }),
            )),
            CommandName::ToolsList => Ok(ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({"tools": self.handler.tool_specs()}),
            )),
            CommandName::SearchWeb => self.handle_search_web(envelope).await,
            CommandName::SearchEngineStatus => self.handle_engine_status(envelope).await,
            CommandName::SearchResetEngines => self.handle_reset_engines(envelope).await,
            CommandName::PageContent => self.handle_page_content(envelope).await,
            CommandName::RuntimeStop => self.handle_runtime_stop(envelope).await,
        }
    }

    async fn handle_search_web(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let args = SearchWebArgs::from_value(&envelope.payload, self.handler.defaults())?;
        let outcome = self.handler.search_web(args).await?;

        self.emit_event(
            HostEvent::SearchCompleted,
            serde_json::json!({
                "request_id": envelope.request_id,
                "engine": outcome.engine_name(),
                "count": outcome.results.len()
            }),
        );

        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({
                "engine": outcome.engine_name(),
                "count": outcome.results.len(),
                "results": outcome.results
            }),
        ))
    }

    async fn handle_engine_status(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let status = self.handler.engine_status().await;
        let detailed = envelope
            .payload
            .get("detail")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let mut payload = serde_json::json!({"engines": status_payload(&status)});
        if detailed {
            payload["detail"] = serde_json::to_value(self.handler.engine_report().await)
                .map_err(|e| ScoutError::Pipeline(format!("failed to serialize engine report: {e}")))?;
        }
        Ok(ResponseEnvelope::ok(envelope.request_id.clone(), payload))
    }

    async fn handle_reset_engines(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let message = self.handler.reset_engines().await;

        self.emit_event(
            HostEvent::EnginesReset,
            serde_json::json!({"request_id": envelope.request_id}),
        );

        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"message": message}),
        ))
    }

    async fn handle_page_content(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let args = PageContentArgs::from_value(&envelope.payload, self.handler.defaults())?;
        let page = self.handler.page_content(args).await;
        let payload = serde_json::to_value(&page)
            .map_err(|e| ScoutError::Pipeline(format!("failed to serialize page content: {e}")))?;
        Ok(ResponseEnvelope::ok(envelope.request_id.clone(), payload))
    }

    async fn handle_runtime_stop(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        self.handler.shutdown().await;

        self.emit_event(
            HostEvent::RuntimeStopped,
            serde_json::json!({"request_id": envelope.request_id}),
        );

        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"accepted": true}),
        ))
    }

    fn emit_event(&self, event: HostEvent, payload: serde_json::Value) {
        let seq = self.event_seq.fetch_add(1, Ordering::Relaxed) + 1;
        // No subscribers is fine; events are best-effort.
        let _ = self
            .event_tx
            .send(EventEnvelope::new(format!("evt-{seq}"), event, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_search::SearchResult;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct RecordingHandler {
        defaults: SearchConfig,
        searches: Mutex<Vec<SearchWebArgs>>,
        pages: Mutex<Vec<PageContentArgs>>,
        resets: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    impl SearchCommandHandler for RecordingHandler {
        fn defaults(&self) -> &SearchConfig {
            &self.defaults
        }

        async fn search_web(&self, args: SearchWebArgs) -> Result<SearchOutcome> {
            self.searches.lock().expect("lock").push(args);
            Ok(SearchOutcome {
                results: vec![SearchResult {
                    title: "Rust".into(),
                    url: "https://www.rust-lang.org/".into(),
                    domain: "www.rust-lang.org".into(),
                    snippet: String::new(),
                    rank: 1,
                    source_engine: SearchEngine::Bing,
                }],
                engine: Some(SearchEngine::Bing),
            })
        }

        async fn engine_status(&self) -> BTreeMap<SearchEngine, EngineStatus> {
            SearchEngine::all()
                .iter()
                .map(|engine| {
                    let status = if *engine == SearchEngine::Google {
                        EngineStatus::Blocked
                    } else {
                        EngineStatus::Available
                    };
                    (*engine, status)
                })
                .collect()
        }

        async fn engine_report(&self) -> Vec<EngineReport> {
            vec![EngineReport {
                engine: SearchEngine::Google,
                status: EngineStatus::Blocked,
                consecutive_failures: 2,
                last_error: Some("blocked by engine: captcha".into()),
            }]
        }

        async fn reset_engines(&self) -> &'static str {
            self.resets.fetch_add(1, Ordering::SeqCst);
            "reset"
        }

        async fn page_content(&self, args: PageContentArgs) -> PageContent {
            let url = args.url.clone();
            self.pages.lock().expect("lock").push(args);
            PageContent::new(url, "Title", "Body text".to_owned())
        }

        fn tool_specs(&self) -> Vec<ToolSpec> {
            WebSearchService::<scout_search::testing::FixtureLauncher>::tool_specs()
        }

        async fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn make_server() -> (HostCommandServer<RecordingHandler>, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let (_client, server) = command_channel(8, 8, Arc::clone(&handler));
        (server, handler)
    }

    fn make_envelope(command: CommandName, payload: serde_json::Value) -> CommandEnvelope {
        CommandEnvelope::new("test-req-1", command, payload)
    }

    #[tokio::test]
    async fn ping_and_version() {
        let (server, _) = make_server();
        let resp = server
            .route(&make_envelope(CommandName::HostPing, serde_json::json!({})))
            .await
            .expect("route");
        assert_eq!(resp.payload["pong"], true);

        let resp = server
            .route(&make_envelope(CommandName::HostVersion, serde_json::json!({})))
            .await
            .expect("route");
        assert_eq!(resp.payload["contract_version"], 1);
    }

    #[tokio::test]
    async fn search_web_applies_defaults_and_reports_engine() {
        let (server, handler) = make_server();
        let envelope = make_envelope(CommandName::SearchWeb, serde_json::json!({"query": "rust"}));
        let resp = server.route(&envelope).await.expect("route");
        assert!(resp.ok);
        assert_eq!(resp.payload["engine"], "bing");
        assert_eq!(resp.payload["count"], 1);
        assert_eq!(resp.payload["results"][0]["source_engine"], "bing");

        let searches = handler.searches.lock().expect("lock");
        assert_eq!(searches[0].max_results, 10);
        assert!(searches[0].include_snippets);
    }

    #[tokio::test]
    async fn search_web_empty_query_is_rejected_before_dispatch() {
        let (server, handler) = make_server();
        let envelope = make_envelope(CommandName::SearchWeb, serde_json::json!({"query": " "}));
        assert!(server.route(&envelope).await.is_err());
        assert!(handler.searches.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn engine_status_uses_engine_names() {
        let (server, _) = make_server();
        let resp = server
            .route(&make_envelope(CommandName::SearchEngineStatus, serde_json::json!({})))
            .await
            .expect("route");
        assert_eq!(
            resp.payload["engines"],
            serde_json::json!({"google": "blocked", "duckduckgo": "available", "bing": "available"})
        );
        assert!(resp.payload.get("detail").is_none());
    }

    #[tokio::test]
    async fn engine_status_detail_includes_last_error() {
        let (server, _) = make_server();
        let resp = server
            .route(&make_envelope(
                CommandName::SearchEngineStatus,
                serde_json::json!({"detail": true}),
            ))
            .await
            .expect("route");
        assert_eq!(resp.payload["detail"][0]["consecutive_failures"], 2);
        assert_eq!(resp.payload["detail"][0]["status"], "blocked");
    }

    #[tokio::test]
    async fn reset_engines_emits_event() {
        let handler = Arc::new(RecordingHandler::default());
        let (client, server) = command_channel(8, 8, Arc::clone(&handler));
        let mut events = client.subscribe_events();

        let resp = server
            .route(&make_envelope(CommandName::SearchResetEngines, serde_json::json!({})))
            .await
            .expect("route");
        assert_eq!(resp.payload["message"], "reset");
        assert_eq!(handler.resets.load(Ordering::SeqCst), 1);

        let event = events.recv().await.expect("event");
        assert_eq!(event.event, HostEvent::EnginesReset);
        assert_eq!(event.payload["request_id"], "test-req-1");
    }

    #[tokio::test]
    async fn page_content_requires_url_argument() {
        let (server, handler) = make_server();
        let missing = make_envelope(CommandName::PageContent, serde_json::json!({"max_length": 10}));
        assert!(server.route(&missing).await.is_err());
        assert!(handler.pages.lock().expect("lock").is_empty());

        let good = make_envelope(
            CommandName::PageContent,
            serde_json::json!({"url": "https://example.com/", "max_length": 25_000}),
        );
        let resp = server.route(&good).await.expect("route");
        assert_eq!(resp.payload["title"], "Title");
        assert_eq!(resp.payload["length"], 9);
        assert_eq!(handler.pages.lock().expect("lock")[0].max_length, 20_000);
    }

    #[tokio::test]
    async fn runtime_stop_shuts_down_handler() {
        let (server, handler) = make_server();
        let resp = server
            .route(&make_envelope(CommandName::RuntimeStop, serde_json::json!({})))
            .await
            .expect("route");
        assert_eq!(resp.payload["accepted"], true);
        assert_eq!(handler.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tools_list_names_every_tool() {
        let (server, _) = make_server();
        let resp = server
            .route(&make_envelope(CommandName::ToolsList, serde_json::json!({})))
            .await
            .expect("route");
        let tools = resp.payload["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0]["name"], "search_web");
    }

    #[tokio::test]
    async fn client_rejects_invalid_envelope() {
        let handler = Arc::new(RecordingHandler::default());
        let (client, server) = command_channel(8, 8, handler);
        let server_task = tokio::spawn(server.run());

        let mut envelope = make_envelope(CommandName::HostPing, serde_json::json!({}));
        envelope.v = 99;
        assert!(client.send(envelope).await.is_err());

        let ok = client
            .send(make_envelope(CommandName::HostPing, serde_json::json!({})))
            .await
            .expect("send");
        assert!(ok.ok);

        drop(client);
        server_task.await.expect("server exits");
    }
}
