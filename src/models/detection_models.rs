use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single person-crossing detected by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub camera_id: String,
    /// `LTR`, `RTL` or an `"x,y"` vector, as reported by the backend
    pub direction: String,
    /// Detector confidence in `0..=1`
    pub confidence: f32,
    pub snapshot_path: String,
}

/// Live detection status of one camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub detection_active: bool,
    pub person_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_detection_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Global system status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default = "default_system_status")]
    pub system_status: String,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub active_cameras: u32,
    /// Anything else the backend reports (dashboard counters, per-camera maps)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_system_status() -> String {
    "unknown".to_string()
}

/// Body of `/api/status`, per camera or global
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Camera(CameraStatus),
    System(SystemStatus),
}
