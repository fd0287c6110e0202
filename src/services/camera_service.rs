use crate::error::Error;
use crate::models::roi::normalize_roi;
use crate::models::{CameraUpdate, EntryDirection, NewCamera, RoiUpdate};
use serde_json::Value;

/// Validate a create-camera body.
///
/// `id`, `name` and `source` are required; `source` may be a device index.
pub fn parse_new_camera(body: &Value) -> Result<NewCamera, Error> {
    let id = non_empty_string(body, "id");
    let name = non_empty_string(body, "name");
    let source = source_field(body, "source");

    match (id, name, source) {
        (Some(id), Some(name), Some(source)) => Ok(NewCamera { id, name, source }),
        _ => Err(Error::Validation(
            "Missing required fields: id, name and source".to_string(),
        )),
    }
}

/// Validate a partial camera update.
///
/// An ROI in either form and an entry direction are normalized here, so
/// nothing reaches the backend unless the whole body is valid.
pub fn parse_camera_update(body: &Value) -> Result<CameraUpdate, Error> {
    if !body.is_object() {
        return Err(Error::Validation("Request body must be a JSON object".to_string()));
    }

    let mut update = CameraUpdate::default();

    if let Some(name) = body.get("name") {
        update.name = Some(
            name.as_str()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| Error::Validation("'name' must be a non-empty string".to_string()))?
                .to_string(),
        );
    }
    if body.get("source").is_some() {
        update.source = Some(source_field(body, "source").ok_or_else(|| {
            Error::Validation("'source' must be a string or device index".to_string())
        })?);
    }
    update.active = bool_field(body, "active")?;
    update.detection_enabled = bool_field(body, "detection_enabled")?;

    if has_roi(body) {
        update.roi = Some(normalize_roi(body)?);
    }
    update.entry_direction = direction_field(body)?;

    Ok(update)
}

/// Validate an ROI update body; the direction defaults to left-to-right.
pub fn parse_roi_update(body: &Value) -> Result<RoiUpdate, Error> {
    let roi = normalize_roi(body)?;
    let entry_direction = direction_field(body)?.unwrap_or_default();

    Ok(RoiUpdate {
        roi,
        entry_direction,
    })
}

/// `entry_direction` as a label or `"x,y"` vector, or `entry_angle` in
/// degrees as set by the dashboard's compass. At most one may be given.
fn direction_field(body: &Value) -> Result<Option<EntryDirection>, Error> {
    let direction = match body.get("entry_direction") {
        None | Some(Value::Null) => None,
        Some(Value::String(direction)) => Some(EntryDirection::parse(direction)?),
        Some(_) => {
            return Err(Error::Validation(
                "'entry_direction' must be a string".to_string(),
            ))
        }
    };
    let angle = match body.get("entry_angle") {
        None | Some(Value::Null) => None,
        Some(angle) => Some(
            angle
                .as_f64()
                .filter(|a| a.is_finite())
                .map(EntryDirection::from_angle)
                .ok_or_else(|| Error::Validation("'entry_angle' must be a number".to_string()))?,
        ),
    };

    match (direction, angle) {
        (Some(_), Some(_)) => Err(Error::Validation(
            "Give either 'entry_direction' or 'entry_angle', not both".to_string(),
        )),
        (direction, angle) => Ok(direction.or(angle)),
    }
}

fn has_roi(body: &Value) -> bool {
    matches!(body.get("roi"), Some(roi) if !roi.is_null())
        || body.get("x1").is_some()
        || body.get("width").is_some()
}

fn non_empty_string(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn source_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(source) if !source.trim().is_empty() => Some(source.trim().to_string()),
        Value::Number(index) => index.as_u64().map(|i| i.to_string()),
        _ => None,
    }
}

fn bool_field(body: &Value, key: &str) -> Result<Option<bool>, Error> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(Error::Validation(format!("'{}' must be a boolean", key))),
    }
}
