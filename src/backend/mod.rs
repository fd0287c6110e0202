use crate::config::BackendConfig;
use crate::models::{
    Camera, CameraStatus, CameraUpdate, ComparisonResponse, DailyData, DetectionEvent, EventQuery,
    MetricsResponse, NewCamera, OperationResponse, RoiUpdate, Snapshot, SnapshotRef,
    SummaryResponse, SystemEvent, SystemStatus, TimeRange,
};
use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod fixture;
mod fixture_data;
pub mod http;

pub use fixture::FixtureBackend;
pub use http::HttpBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Http,
    Fixture,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Fixture => write!(f, "fixture"),
        }
    }
}

/// Everything the gateway needs from the camera/detection backend.
///
/// Errors are `anyhow` errors wrapping [`crate::error::Error`] so the API
/// layer can map them to status codes.
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn list_cameras(&self) -> Result<Vec<Camera>>;

    async fn get_camera(&self, camera_id: &str) -> Result<Camera>;

    async fn create_camera(&self, camera: NewCamera) -> Result<Camera>;

    async fn update_camera(&self, camera_id: &str, update: &CameraUpdate) -> Result<Camera>;

    async fn delete_camera(&self, camera_id: &str) -> Result<OperationResponse>;

    async fn update_roi(&self, camera_id: &str, roi: &RoiUpdate) -> Result<OperationResponse>;

    /// Remove the ROI entirely; the camera is left without one.
    async fn clear_roi(&self, camera_id: &str) -> Result<OperationResponse>;

    async fn camera_status(&self, camera_id: &str) -> Result<CameraStatus>;

    async fn system_status(&self) -> Result<SystemStatus>;

    async fn set_detection(&self, enabled: bool) -> Result<OperationResponse>;

    async fn metrics(&self, range: TimeRange, camera_id: Option<&str>) -> Result<MetricsResponse>;

    async fn summary(&self, range: TimeRange, camera_id: Option<&str>) -> Result<SummaryResponse>;

    async fn daily(&self, range: TimeRange, camera_id: Option<&str>) -> Result<Vec<DailyData>>;

    async fn compare(&self, range: TimeRange) -> Result<ComparisonResponse>;

    async fn events(&self, query: &EventQuery) -> Result<Vec<SystemEvent>>;

    async fn recent_detections(&self, count: usize) -> Result<Vec<DetectionEvent>>;

    async fn snapshot(&self, snapshot: &SnapshotRef) -> Result<Snapshot>;
}

/// Build the backend selected by configuration
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn DetectionBackend>> {
    if config.use_mock_data {
        info!("Using built-in fixture data instead of the detection backend");
        return Ok(Arc::new(FixtureBackend::seeded()));
    }

    info!("Forwarding to detection backend at {}", config.url);
    Ok(Arc::new(HttpBackend::new(config)?))
}
