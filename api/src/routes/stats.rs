//! Aggregate statistics endpoints.
//!
//! Each endpoint re-reads a bounded window of the EVE log and folds it into
//! a chart-ready JSON shape. There is no cache and no shared mutable state:
//! a missing or empty log yields the empty shape (or 404 where "no data
//! yet" must be distinguishable from "all zeros"), and only a real I/O
//! failure produces a 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::aggregate::{self, CountersSnapshot, TopCounts};
use std::io;

use super::ErrorResponse;
use crate::state::AppState;

/// Ranked label/count pairs for the top-N chart endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    /// Ranked labels, most frequent first.
    pub labels: Vec<String>,
    /// Occurrence count for each label.
    pub values: Vec<u64>,
}

impl From<TopCounts> for ChartResponse {
    fn from(top: TopCounts) -> Self {
        Self {
            labels: top.labels,
            values: top.values,
        }
    }
}

/// The latest performance counters snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountersResponse {
    /// Timestamp of the `stats` record the counters were taken from.
    pub timestamp: Option<String>,
    /// Capture-layer counters.
    pub capture: Value,
    /// Decoder counters.
    pub decoder: Value,
    /// Flow-engine counters.
    pub flow_stats: Value,
    /// Application-layer counters.
    pub app_layer: Value,
}

impl From<CountersSnapshot> for CountersResponse {
    fn from(snapshot: CountersSnapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            capture: snapshot.capture,
            decoder: snapshot.decoder,
            flow_stats: snapshot.flow,
            app_layer: snapshot.app_layer,
        }
    }
}

/// Creates the aggregate statistics routes.
///
/// # Routes
///
/// - `GET /api/stats/top_signatures` - Top alert signatures
/// - `GET /api/stats/top_dns` - Top DNS query names
/// - `GET /api/stats/top_tls_sni` - Top TLS server names
/// - `GET /api/stats/latest_counters` - Latest performance counters
/// - `GET /api/stats/capture_history` - Capture/drop time series
pub fn stats_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/stats/top_signatures", get(top_signatures))
        .route("/api/stats/top_dns", get(top_dns))
        .route("/api/stats/top_tls_sni", get(top_tls_sni))
        .route("/api/stats/latest_counters", get(latest_counters))
        .route("/api/stats/capture_history", get(capture_history))
        .with_state(state)
}

async fn top_signatures(State(state): State<AppState>) -> Response {
    chart(aggregate::top_signatures(&state.config().eve_log))
}

async fn top_dns(State(state): State<AppState>) -> Response {
    chart(aggregate::top_dns(&state.config().eve_log))
}

async fn top_tls_sni(State(state): State<AppState>) -> Response {
    chart(aggregate::top_tls_sni(&state.config().eve_log))
}

/// Handler for the latest counters snapshot.
///
/// A window without any `stats` record yields 404: the engine has not
/// produced counters yet, which must not read as "counters are zero".
async fn latest_counters(State(state): State<AppState>) -> Response {
    match aggregate::latest_counters(&state.config().eve_log) {
        Ok(Some(snapshot)) => Json(CountersResponse::from(snapshot)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no stats record in the event log yet")),
        )
            .into_response(),
        Err(error) => internal_error(&error),
    }
}

async fn capture_history(State(state): State<AppState>) -> Response {
    match aggregate::capture_history(&state.config().eve_log) {
        Ok(history) => Json(history).into_response(),
        Err(error) => internal_error(&error),
    }
}

fn chart(result: io::Result<TopCounts>) -> Response {
    match result {
        Ok(top) => Json(ChartResponse::from(top)).into_response(),
        Err(error) => internal_error(&error),
    }
}

fn internal_error(error: &io::Error) -> Response {
    tracing::error!(%error, "Failed to aggregate the event log");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("failed to read the event log")),
    )
        .into_response()
}
