//! Rule-update trigger endpoint.
//!
//! `POST /api/update` runs the configured external rule-update tool and
//! returns its captured output. The run is bounded: a wedged tool comes
//! back as a timeout failure rather than a hung request.

use axum::{
    extract::State, http::StatusCode, response::Json, routing::post, Router,
};
use serde::{Deserialize, Serialize};
use shared::update::{self, UpdateError};

use crate::state::AppState;

/// Response body for a completed update run.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Failure body for update runs; captured output is preserved when the
/// tool produced any before failing.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateFailure {
    /// Human-readable description of the failure.
    pub error: String,
    /// Captured standard output, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// Captured standard error, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Creates the rule-update routes.
///
/// # Routes
///
/// - `POST /api/update` - Run the external rule-update tool
pub fn update_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/update", post(trigger_update))
        .with_state(state)
}

/// Handler for the update trigger.
async fn trigger_update(
    State(state): State<AppState>,
) -> Result<Json<UpdateResponse>, (StatusCode, Json<UpdateFailure>)> {
    let config = state.config();
    let (program, args) = config.update_invocation();

    let output = update::run_update(&program, &args, config.update_timeout)
        .await
        .map_err(update_failure)?;

    tracing::info!("Rule update completed");
    Ok(Json(UpdateResponse {
        status: "ok".to_string(),
        stdout: output.stdout,
        stderr: output.stderr,
    }))
}

/// Maps an update failure onto the HTTP surface: 504 for a timeout, 502
/// for tool problems, 500 for anything else.
fn update_failure(error: UpdateError) -> (StatusCode, Json<UpdateFailure>) {
    tracing::error!(%error, "Rule update failed");
    let message = error.to_string();
    match error {
        UpdateError::TimedOut(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(UpdateFailure {
                error: message,
                stdout: None,
                stderr: None,
            }),
        ),
        UpdateError::Failed { stdout, stderr, .. } => (
            StatusCode::BAD_GATEWAY,
            Json(UpdateFailure {
                error: message,
                stdout: Some(stdout),
                stderr: Some(stderr),
            }),
        ),
        UpdateError::Missing(_) => (
            StatusCode::BAD_GATEWAY,
            Json(UpdateFailure {
                error: message,
                stdout: None,
                stderr: None,
            }),
        ),
        UpdateError::Io(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UpdateFailure {
                error: message,
                stdout: None,
                stderr: None,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_router(update_command: &str, timeout: Duration) -> Router {
        update_routes(AppState::new(Config {
            update_command: update_command.to_string(),
            update_timeout: timeout,
            ..Config::default()
        }))
    }

    async fn trigger(app: Router) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/update")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_successful_update_returns_output() {
        let app = test_router("echo rules refreshed", Duration::from_secs(5));

        let (status, body) = trigger(app).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["stdout"].as_str().unwrap().trim(), "rules refreshed");
    }

    #[tokio::test]
    async fn test_failed_update_preserves_output() {
        let app = test_router("false", Duration::from_secs(5));

        let (status, body) = trigger(app).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("status"));
        assert!(body["stdout"].is_string());
    }

    #[tokio::test]
    async fn test_missing_tool_is_structured() {
        let app = test_router("definitely-not-a-real-update-tool", Duration::from_secs(5));

        let (status, body) = trigger(app).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_gateway_timeout() {
        let app = test_router("sleep 30", Duration::from_secs(1));

        let (status, body) = trigger(app).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body["error"].as_str().unwrap().contains("timed out"));
    }
}
