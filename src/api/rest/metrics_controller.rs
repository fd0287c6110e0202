use crate::api::rest::{ApiQuery, ApiResult, AppState};
use crate::models::{ComparisonResponse, DailyData, MetricsResponse, SummaryResponse, TimeRange};
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use log::debug;
use serde::Deserialize;

/// Query parameters shared by the metrics endpoints
#[derive(Debug, Default, Deserialize)]
pub struct MetricsParams {
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
    pub cam_id: Option<String>,
}

impl MetricsParams {
    fn range(&self) -> TimeRange {
        TimeRange::parse(self.time_range.as_deref())
    }

    fn camera_id(&self) -> Option<&str> {
        self.cam_id.as_deref().filter(|id| !id.is_empty() && *id != "all")
    }
}

/// Create the metrics and analytics router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/metrics", get(get_metrics))
        .route("/api/metrics/summary", get(get_summary))
        .route("/api/metrics/daily", get(get_daily))
        .route("/api/analytics/compare", get(compare_cameras))
}

async fn get_metrics(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MetricsParams>,
) -> ApiResult<Json<MetricsResponse>> {
    debug!("Metrics for {:?} camera {:?}", params.range(), params.camera_id());
    let metrics = state
        .backend
        .metrics(params.range(), params.camera_id())
        .await?;
    Ok(Json(metrics))
}

async fn get_summary(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MetricsParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = state
        .backend
        .summary(params.range(), params.camera_id())
        .await?;
    Ok(Json(summary))
}

async fn get_daily(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MetricsParams>,
) -> ApiResult<Json<Vec<DailyData>>> {
    let daily = state
        .backend
        .daily(params.range(), params.camera_id())
        .await?;
    Ok(Json(daily))
}

async fn compare_cameras(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MetricsParams>,
) -> ApiResult<Json<ComparisonResponse>> {
    let comparison = state.backend.compare(params.range()).await?;
    Ok(Json(comparison))
}
