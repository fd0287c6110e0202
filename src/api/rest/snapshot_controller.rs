use crate::api::rest::{ApiResult, AppState};
use crate::models::SnapshotRef;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::debug;

/// Create the snapshot router
pub fn create_router() -> Router<AppState> {
    Router::new().route("/api/snapshot/*path", get(get_snapshot))
}

/// `{camera_id}/{filename}`, or just `{camera_id}` for the latest image
async fn get_snapshot(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    let snapshot_ref = SnapshotRef::parse(path.trim_start_matches('/'))?;
    debug!(
        "Fetching snapshot {} for camera {}",
        snapshot_ref.filename, snapshot_ref.camera_id
    );

    let snapshot = state.backend.snapshot(&snapshot_ref).await?;
    Ok(([(header::CONTENT_TYPE, snapshot.content_type)], snapshot.data).into_response())
}
