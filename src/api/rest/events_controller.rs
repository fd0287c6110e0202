use crate::api::rest::{ApiQuery, ApiResult, AppState};
use crate::models::{DetectionEvent, SystemEvent};
use crate::services::event_query::{detection_count, event_query};
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use log::debug;

/// Create the events router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(get_events))
        .route("/api/detections/recent", get(get_recent_detections))
}

// Raw pairs so `types` can repeat.
async fn get_events(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<SystemEvent>>> {
    let query = event_query(&params)?;
    debug!("Fetching events: {:?}", query);

    let mut events = state.backend.events(&query).await?;
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(Json(events))
}

async fn get_recent_detections(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<DetectionEvent>>> {
    let count = detection_count(&params)?;
    debug!("Fetching {} recent detections", count);

    let mut detections = state.backend.recent_detections(count).await?;
    detections.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(Json(detections))
}
