//! Live log stream endpoint.
//!
//! `GET /api/logs/stream` follows the EVE log over Server-Sent Events. Each
//! appended line becomes one `data:` message: the decoded record when the
//! line parses, or a `{"raw_line": ...}` wrapper when it does not — the
//! live view must never hide data the operator may need to see. Terminal
//! conditions (missing file, follower exit) are reported as one
//! `{"error": ...}` message before the stream closes.
//!
//! One follower process serves one subscriber. The channel between them is
//! small and bounded, so a slow client backpressures the producer instead
//! of growing a queue, and a disconnect tears the follower down promptly.

use std::convert::Infallible;
use std::path::PathBuf;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use serde_json::json;
use shared::models::EveRecord;
use shared::tail::{TailEvent, TailFollower};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::state::AppState;

/// In-flight messages per subscriber before the producer blocks.
const CHANNEL_CAPACITY: usize = 16;

/// Creates the live log stream routes.
///
/// # Routes
///
/// - `GET /api/logs/stream` - Server-Sent Events follow of the EVE log
pub fn stream_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/logs/stream", get(stream_logs))
        .with_state(state)
}

/// Handler for the live log stream.
///
/// Spawns the follow session on its own task so a slow or silent
/// subscriber never blocks other requests, and bridges its channel into
/// the SSE response body.
async fn stream_logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let path = state.config().eve_log.clone();
    tokio::spawn(run_session(path, tx));

    let stream = ReceiverStream::new(rx).map(|payload: String| Ok(Event::default().data(payload)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Runs one follow session, producing JSON payloads until the log becomes
/// unavailable, the follower dies, or the subscriber goes away.
///
/// The session owns exactly one follower process. Every exit path stops it
/// with the graceful-then-forceful escalation, so a disconnected client
/// cannot leak an OS process or its pipe handles.
async fn run_session(path: PathBuf, tx: mpsc::Sender<String>) {
    if !path.exists() {
        let message = format!("log file not found: {}", path.display());
        let _ = tx.send(error_payload(&message)).await;
        return;
    }

    let mut follower = match TailFollower::spawn(&path) {
        Ok(follower) => follower,
        Err(error) => {
            tracing::error!(%error, "Failed to start log follower");
            let _ = tx.send(error_payload("failed to start log follower")).await;
            return;
        }
    };

    loop {
        tokio::select! {
            // Subscriber went away while we were waiting for a line.
            () = tx.closed() => break,
            event = follower.next_event() => match event {
                TailEvent::Line(line) => {
                    if tx.send(line_payload(&line)).await.is_err() {
                        break;
                    }
                }
                TailEvent::Exited(code) => {
                    tracing::warn!(?code, "Log follower exited unexpectedly");
                    let message = match code {
                        Some(code) => format!("log follower exited with status {code}"),
                        None => "log follower was terminated by a signal".to_string(),
                    };
                    let _ = tx.send(error_payload(&message)).await;
                    break;
                }
            }
        }
    }

    follower.stop().await;
}

/// Renders one log line as an SSE payload: the decoded record, or the raw
/// fallback wrapper for lines that do not parse.
fn line_payload(line: &str) -> String {
    match EveRecord::decode(line) {
        Some(record) => {
            serde_json::to_string(&record).unwrap_or_else(|_| raw_payload(line))
        }
        None => raw_payload(line),
    }
}

fn raw_payload(line: &str) -> String {
    json!({ "raw_line": line }).to_string()
}

fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}
