use super::direction::EntryDirection;
use super::roi::{normalize_roi, Roi};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Camera model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub name: String,
    /// Stream URI, file path or local device index
    #[serde(deserialize_with = "deserialize_source")]
    pub source: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub detection_enabled: bool,
    /// Absent when no ROI is configured
    #[serde(
        default,
        deserialize_with = "deserialize_roi",
        skip_serializing_if = "Option::is_none"
    )]
    pub roi: Option<Roi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_direction: Option<EntryDirection>,
}

impl Camera {
    pub fn from_new(new_camera: NewCamera) -> Self {
        Self {
            id: new_camera.id,
            name: new_camera.name,
            source: new_camera.source,
            active: true,
            detection_enabled: false,
            roi: None,
            entry_direction: None,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &CameraUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(source) = &update.source {
            self.source = source.clone();
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(detection_enabled) = update.detection_enabled {
            self.detection_enabled = detection_enabled;
        }
        if let Some(roi) = update.roi {
            self.roi = Some(roi);
        }
        if let Some(direction) = &update.entry_direction {
            self.entry_direction = Some(direction.clone());
        }
    }
}

/// Payload for creating a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCamera {
    pub id: String,
    pub name: String,
    pub source: String,
}

/// Partial camera update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<Roi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_direction: Option<EntryDirection>,
}

/// ROI update as sent to the detection backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiUpdate {
    #[serde(flatten)]
    pub roi: Roi,
    pub entry_direction: EntryDirection,
}

/// Generic acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

// The detection backend reports local devices by numeric index.
fn deserialize_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Source {
        Text(String),
        Index(i64),
    }

    Ok(match Source::deserialize(deserializer)? {
        Source::Text(text) => text,
        Source::Index(index) => index.to_string(),
    })
}

// Accepts either ROI form. Older backends clear an ROI by writing an
// all-zero rectangle, which is read back as "no ROI".
fn deserialize_roi<'de, D>(deserializer: D) -> Result<Option<Roi>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let roi = normalize_roi(&value).map_err(D::Error::custom)?;
    if roi == Roi::default() {
        return Ok(None);
    }
    Ok(Some(roi))
}
