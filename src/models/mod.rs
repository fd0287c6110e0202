pub mod camera_models;
pub mod detection_models;
pub mod direction;
pub mod event_models;
pub mod metrics_models;
pub mod roi;
pub mod snapshot_models;

pub use camera_models::{Camera, CameraUpdate, NewCamera, OperationResponse, RoiUpdate};
pub use detection_models::{CameraStatus, DetectionEvent, StatusResponse, SystemStatus};
pub use direction::EntryDirection;
pub use event_models::{EventQuery, SystemEvent};
pub use metrics_models::{
    CameraAnalytics, ComparisonResponse, DailyData, DirectionData, HourlyData, MetricsResponse,
    SummaryResponse, TimeRange,
};
pub use roi::{Roi, RoiBox};
pub use snapshot_models::{Snapshot, SnapshotInfo, SnapshotRef};
