//! Rule-control file endpoints.
//!
//! Exposes the engine's `enable.conf` and `disable.conf` for editing from
//! the web UI. Anything outside that allowlist is rejected before touching
//! the filesystem.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::rules::{self, RulesError};

use super::ErrorResponse;
use crate::state::AppState;

/// Response body for reading a rule-control file.
#[derive(Debug, Serialize, Deserialize)]
pub struct RulesFileResponse {
    /// The file that was read.
    pub filename: String,
    /// Its full content; empty when the file does not exist yet.
    pub content: String,
}

/// Request body for saving a rule-control file.
#[derive(Debug, Deserialize)]
pub struct SaveRulesRequest {
    /// The full replacement content.
    pub content: String,
}

/// Response body for a successful save.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRulesResponse {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Creates the rule-control file routes.
///
/// # Routes
///
/// - `GET /api/config/{filename}` - Read a rule-control file
/// - `POST /api/config/{filename}` - Replace a rule-control file
pub fn rules_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/config/{filename}",
            get(get_rules_file).post(save_rules_file),
        )
        .with_state(state)
}

/// Handler for reading a rule-control file.
async fn get_rules_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<RulesFileResponse>, (StatusCode, Json<ErrorResponse>)> {
    let content = rules::read_control_file(&state.config().rules_dir, &filename)
        .map_err(rules_error)?;

    Ok(Json(RulesFileResponse { filename, content }))
}

/// Handler for replacing a rule-control file.
async fn save_rules_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: Result<Json<SaveRulesRequest>, JsonRejection>,
) -> Result<Json<SaveRulesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(rejection.body_text())),
        )
    })?;

    rules::write_control_file(&state.config().rules_dir, &filename, &request.content)
        .map_err(rules_error)?;

    tracing::info!(%filename, "Saved rule-control file");
    Ok(Json(SaveRulesResponse {
        status: "success".to_string(),
        message: format!("{filename} saved successfully"),
    }))
}

fn rules_error(error: RulesError) -> (StatusCode, Json<ErrorResponse>) {
    match error {
        RulesError::InvalidFilename(name) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "not an editable rule-control file: {name}"
            ))),
        ),
        RulesError::Io(error) => {
            tracing::error!(%error, "Rule-control file access failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("rule-control file access failed")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router(rules_dir: std::path::PathBuf) -> Router {
        rules_routes(AppState::new(Config {
            rules_dir,
            ..Config::default()
        }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_read_missing_file_returns_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path().to_path_buf());

        let (status, body) = get_json(app, "/api/config/enable.conf").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filename"], "enable.conf");
        assert_eq!(body["content"], "");
    }

    #[tokio::test]
    async fn test_save_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let app = test_router(dir.path().to_path_buf());
        let (status, body) = post_json(
            app,
            "/api/config/disable.conf",
            serde_json::json!({"content": "2019401\n"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let app = test_router(dir.path().to_path_buf());
        let (status, body) = get_json(app, "/api/config/disable.conf").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "2019401\n");
    }

    #[tokio::test]
    async fn test_unlisted_filename_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path().to_path_buf());

        let (status, body) = get_json(app, "/api/config/suricata.yaml").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_save_without_content_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path().to_path_buf());

        let (status, body) = post_json(
            app,
            "/api/config/enable.conf",
            serde_json::json!({"data": "oops"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
