use crate::api::rest::{ApiJson, ApiResult, AppState};
use crate::models::{Camera, OperationResponse};
use crate::services::camera_service::{parse_camera_update, parse_new_camera, parse_roi_update};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use serde_json::Value;

/// Create the camera controller router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/cameras", get(get_cameras).post(create_camera))
        .route(
            "/api/cameras/:id",
            get(get_camera)
                .put(update_camera)
                .patch(update_camera)
                .delete(delete_camera),
        )
        .route("/api/cameras/:id/roi", post(update_roi))
        .route("/api/cameras/:id/roi/clear", post(clear_roi))
}

async fn get_cameras(State(state): State<AppState>) -> ApiResult<Json<Vec<Camera>>> {
    let cameras = state.backend.list_cameras().await?;
    Ok(Json(cameras))
}

async fn create_camera(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<(StatusCode, Json<Camera>)> {
    let new_camera = parse_new_camera(&body)?;
    info!("Creating camera {} ({})", new_camera.id, new_camera.name);

    let camera = state.backend.create_camera(new_camera).await?;
    Ok((StatusCode::CREATED, Json(camera)))
}

async fn get_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Camera>> {
    let camera = state.backend.get_camera(&id).await?;
    Ok(Json(camera))
}

async fn update_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Camera>> {
    let update = parse_camera_update(&body)?;
    let camera = state.backend.update_camera(&id, &update).await?;
    Ok(Json(camera))
}

async fn delete_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OperationResponse>> {
    info!("Deleting camera {}", id);
    let response = state.backend.delete_camera(&id).await?;
    Ok(Json(response))
}

async fn update_roi(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<OperationResponse>> {
    let roi = parse_roi_update(&body)?;
    info!(
        "Updating ROI for camera {}: ({}, {}) to ({}, {}), direction {}",
        id, roi.roi.x1, roi.roi.y1, roi.roi.x2, roi.roi.y2, roi.entry_direction
    );

    let response = state.backend.update_roi(&id, &roi).await?;
    Ok(Json(response))
}

async fn clear_roi(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OperationResponse>> {
    info!("Clearing ROI for camera {}", id);
    let response = state.backend.clear_roi(&id).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::api::rest::test_support::{call, fixture_router};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_get() {
        let router = fixture_router();

        let (status, body) = call(&router, Method::GET, "/api/cameras", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);

        let (status, body) = call(&router, Method::GET, "/api/cameras/cam-001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Front Door");
        assert_eq!(body["entry_direction"], "1,0");

        let (status, _) = call(&router, Method::GET, "/api/cameras/cam-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_camera() {
        let router = fixture_router();
        let body = json!({"id": "cam-006", "name": "Side Gate", "source": "rtsp://192.168.1.105:554/stream1"});

        let (status, created) = call(&router, Method::POST, "/api/cameras", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["active"], true);
        assert_eq!(created["detection_enabled"], false);
        assert!(created.get("roi").is_none());

        let (status, _) = call(&router, Method::POST, "/api/cameras", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, error) = call(&router, Method::POST, "/api/cameras", Some(json!({"id": "cam-007"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].as_str().unwrap().contains("Missing required fields"));
    }

    #[tokio::test]
    async fn test_roi_from_dashboard_box() {
        let router = fixture_router();

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/cameras/cam-004/roi",
            Some(json!({
                "roi": {"x": 50, "y": 100, "width": 200, "height": 150},
                "entry_direction": "LTR"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, camera) = call(&router, Method::GET, "/api/cameras/cam-004", None).await;
        assert_eq!(camera["roi"], json!({"x1": 50.0, "y1": 100.0, "x2": 250.0, "y2": 250.0}));
        assert_eq!(camera["entry_direction"], "1,0");
    }

    #[tokio::test]
    async fn test_invalid_roi_leaves_camera_unchanged() {
        let router = fixture_router();
        let (_, before) = call(&router, Method::GET, "/api/cameras/cam-001", None).await;

        for body in [
            json!({"roi": {"x": "left", "y": 100, "width": 200, "height": 150}}),
            json!({"x1": 300, "y1": 100, "x2": 50, "y2": 250}),
            json!({"x1": 0, "y1": 0, "x2": 10, "y2": 10, "entry_direction": "abc"}),
            json!({"x1": 0, "y1": 0, "x2": 10, "y2": 10, "entry_direction": "1,2,3"}),
        ] {
            let (status, _) = call(&router, Method::POST, "/api/cameras/cam-001/roi", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

            let (status, _) = call(&router, Method::PUT, "/api/cameras/cam-001", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        }

        let (_, after) = call(&router, Method::GET, "/api/cameras/cam-001", None).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_clear_roi_removes_field() {
        let router = fixture_router();

        let (status, _) = call(&router, Method::POST, "/api/cameras/cam-003/roi/clear", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, camera) = call(&router, Method::GET, "/api/cameras/cam-003", None).await;
        assert!(camera.get("roi").is_none());

        let (status, _) = call(&router, Method::POST, "/api/cameras/cam-404/roi/clear", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let router = fixture_router();

        let (status, camera) = call(
            &router,
            Method::PATCH,
            "/api/cameras/cam-002",
            Some(json!({"active": true, "entry_direction": "RTL"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(camera["active"], true);
        assert_eq!(camera["name"], "Backyard");
        assert_eq!(camera["entry_direction"], "-1,0");

        let (status, body) = call(&router, Method::DELETE, "/api/cameras/cam-002", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = call(&router, Method::DELETE, "/api/cameras/cam-002", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
