//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages, dispatches them
//! through the `HostCommandServer` router, and writes `ResponseEnvelope` and
//! `EventEnvelope` messages as newline-delimited JSON.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::error::{Result, ScoutError};
use crate::host::channel::{HostCommandClient, SearchCommandHandler, command_channel};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Request channel capacity. Commands are handled one at a time, so this
/// only bounds how far a client may run ahead.
const REQUEST_CAPACITY: usize = 64;

const EVENT_CAPACITY: usize = 128;

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

/// Run the bridge over the process's stdin and stdout until EOF,
/// `runtime.stop`, SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub async fn run_stdio_bridge<H: SearchCommandHandler>(handler: Arc<H>) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_bridge(stdin, tokio::io::stdout(), handler, shutdown_signal()).await
}

/// Resolves on the first SIGINT (Ctrl-C) or, on unix, SIGTERM.
///
/// A signal that cannot be listened for is logged and never fires.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

/// Run the bridge until `input` closes, a `runtime.stop` command is
/// handled, or `shutdown` resolves.
///
/// Three tasks cooperate: the reader (on the current task) dispatches each
/// command and writes its response, an event forwarder copies broadcast
/// events to `output`, and the router server handles commands in order.
///
/// The handler is shut down before returning on every exit path, including
/// `shutdown` and read and write errors. A command already handed to the
/// router finishes first.
pub async fn run_bridge<R, W, H, S>(input: R, output: W, handler: Arc<H>, shutdown: S) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    H: SearchCommandHandler,
    S: Future<Output = ()>,
{
    let (client, server) = command_channel(REQUEST_CAPACITY, EVENT_CAPACITY, Arc::clone(&handler));
    let writer: SharedWriter<W> = Arc::new(Mutex::new(BufWriter::new(output)));

    let server_handle = tokio::spawn(server.run());

    let event_writer = Arc::clone(&writer);
    let mut event_rx = client.subscribe_events();
    let event_handle = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        let mut w = event_writer.lock().await;
                        if let Err(e) = write_line(&mut w, &json).await {
                            tracing::warn!(error = %e, "failed to write event; stopping event forwarder");
                            break;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "failed to serialize event; skipping"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let reader_result = tokio::select! {
        result = run_reader(input, client, Arc::clone(&writer)) => result,
        () = shutdown => {
            tracing::info!("shutdown requested; closing bridge");
            Ok(())
        }
    };

    // The reader dropped the client, so the server drains and exits; with
    // both event senders gone the forwarder flushes what is left and stops.
    let _ = server_handle.await;
    let _ = event_handle.await;

    handler.shutdown().await;
    tracing::info!("bridge stopped; browser released");

    reader_result
}

/// Read lines, dispatch each command, and write responses.
async fn run_reader<R, W>(mut input: R, client: HostCommandClient, writer: SharedWriter<W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = input
            .read_line(&mut line)
            .await
            .map_err(|e| ScoutError::Channel(format!("failed to read command input: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        let request_id = envelope.request_id.clone();
        let is_stop = envelope.command == CommandName::RuntimeStop;
        tracing::debug!(request_id = %request_id, command = envelope.command.as_str(), "dispatching command");

        let response = match client.send(envelope).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "host command failed");
                ResponseEnvelope::error(request_id, e.to_string())
            }
        };
        write_response(&writer, &response).await?;

        if is_stop {
            tracing::info!("runtime.stop received; shutting down bridge");
            break;
        }
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &SharedWriter<W>,
    response: &ResponseEnvelope,
) -> Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| ScoutError::Pipeline(format!("failed to serialize response envelope: {e}")))?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut BufWriter<W>, json: &str) -> Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
