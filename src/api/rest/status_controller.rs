use crate::api::rest::{ApiQuery, ApiResult, AppState};
use crate::models::{OperationResponse, StatusResponse};
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub camera_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
}

/// Create the status and detection control router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/detection/start", post(start_detection))
        .route("/api/detection/stop", post(stop_detection))
        .route("/api/health", get(health))
}

/// Per-camera status with `camera_id`, global status otherwise
async fn get_status(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StatusParams>,
) -> ApiResult<Json<StatusResponse>> {
    let response = match params.camera_id.filter(|id| !id.is_empty()) {
        Some(camera_id) => StatusResponse::Camera(state.backend.camera_status(&camera_id).await?),
        None => StatusResponse::System(state.backend.system_status().await?),
    };
    Ok(Json(response))
}

async fn start_detection(State(state): State<AppState>) -> ApiResult<Json<OperationResponse>> {
    info!("Starting detection");
    let response = state.backend.set_detection(true).await?;
    Ok(Json(response))
}

async fn stop_detection(State(state): State<AppState>) -> ApiResult<Json<OperationResponse>> {
    info!("Stopping detection");
    let response = state.backend.set_detection(false).await?;
    Ok(Json(response))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.kind().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::rest::test_support::{call, fixture_router};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_health() {
        let router = fixture_router();
        let (status, body) = call(&router, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "backend": "fixture"}));
    }

    #[tokio::test]
    async fn test_camera_and_global_status() {
        let router = fixture_router();

        let (status, body) = call(&router, Method::GET, "/api/status?camera_id=cam-001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["person_detected"].is_boolean());
        assert!(body.get("system_status").is_none());

        let (status, body) = call(&router, Method::GET, "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["system_status"], "operational");

        let (status, _) = call(&router, Method::GET, "/api/status?camera_id=cam-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_stop_detection() {
        let router = fixture_router();

        let (status, body) = call(&router, Method::POST, "/api/detection/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = call(&router, Method::GET, "/api/status", None).await;
        assert_eq!(body["system_status"], "paused");

        let (_, body) = call(&router, Method::GET, "/api/status?camera_id=cam-001", None).await;
        assert_eq!(body["detection_active"], false);

        let (status, _) = call(&router, Method::POST, "/api/detection/start", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&router, Method::GET, "/api/status", None).await;
        assert_eq!(body["system_status"], "operational");
    }
}
