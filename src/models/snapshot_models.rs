use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LATEST_SNAPSHOT: &str = "latest.jpg";

/// A snapshot addressed as `{camera_id}/{filename}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    pub camera_id: String,
    pub filename: String,
}

impl SnapshotRef {
    /// Parse the tail of `/api/snapshot/{path}`.
    ///
    /// A single segment is a camera id and resolves to its latest snapshot.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let path = path.trim_matches('/');
        let segments: Vec<&str> = path.split('/').collect();

        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(Error::Validation(format!("Invalid snapshot path: {}", path)));
        }

        match segments.as_slice() {
            [camera_id] => Ok(Self {
                camera_id: camera_id.to_string(),
                filename: LATEST_SNAPSHOT.to_string(),
            }),
            [camera_id, filename] => Ok(Self {
                camera_id: camera_id.to_string(),
                filename: filename.to_string(),
            }),
            _ => Err(Error::Validation(format!("Invalid snapshot path: {}", path))),
        }
    }

    pub fn is_latest(&self) -> bool {
        self.filename == LATEST_SNAPSHOT
    }

    pub fn public_path(&self) -> String {
        format!("/snapshots/{}/{}", self.camera_id, self.filename)
    }
}

/// Snapshot metadata, returned when no image bytes are available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub success: bool,
    pub path: String,
    pub camera_id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Snapshot payload relayed to the browser
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub content_type: String,
    pub data: Vec<u8>,
}
