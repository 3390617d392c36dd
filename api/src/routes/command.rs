//! Engine control command endpoint.
//!
//! `POST /api/command` relays one operator command to the engine's control
//! socket and returns the engine's JSON reply verbatim. Control-channel
//! failures come back in the `{"return": "FAILED", "message": ...}` shape
//! the frontend shows operators.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::control::EngineClient;
use shared::models::CommandRequest;
use shared::validator::Validate;

use crate::state::AppState;

/// Failure body for command relay errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandFailure {
    /// Always `"FAILED"`, mirroring the engine's own failure replies.
    #[serde(rename = "return")]
    pub result: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl CommandFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            result: "FAILED".to_string(),
            message: message.into(),
        }
    }
}

/// Creates the engine command routes.
///
/// # Routes
///
/// - `POST /api/command` - Relay a control command to the engine
pub fn command_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/command", post(relay_command))
        .with_state(state)
}

/// Handler for command relay.
///
/// Validates the request, opens a control-channel session (handshake
/// included), sends the command, and passes the engine's reply through
/// untouched.
async fn relay_command(
    State(state): State<AppState>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<CommandFailure>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(CommandFailure::new(rejection.body_text())),
        )
    })?;

    request.validate().map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(CommandFailure::new(error.to_string())),
        )
    })?;

    let mut client = EngineClient::connect(&state.config().control_socket)
        .await
        .map_err(relay_failure)?;
    let reply = client.send_command(&request).await.map_err(relay_failure)?;

    tracing::debug!(command = %request.command, "Relayed engine command");
    Ok(Json(reply))
}

/// Maps a control-channel failure onto the HTTP surface.
///
/// The engine being unreachable or misbehaving is an upstream problem, not
/// a malformed request, so everything maps to 502.
fn relay_failure(error: shared::control::ControlError) -> (StatusCode, Json<CommandFailure>) {
    tracing::error!(%error, "Engine command relay failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(CommandFailure::new(error.to_string())),
    )
}
