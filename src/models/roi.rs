use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Region of interest in corner form, absolute pixel coordinates.
///
/// Always satisfies `x2 >= x1` and `y2 >= y1`; use [`Roi::new`] or
/// [`RoiBox::to_corners`] to build one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Region of interest in box form, as drawn by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, Error> {
        for value in [x1, y1, x2, y2] {
            if !value.is_finite() {
                return Err(Error::Validation("Invalid ROI data".to_string()));
            }
        }
        if x2 < x1 || y2 < y1 {
            return Err(Error::Validation(format!(
                "Invalid ROI data: corners ({}, {}) and ({}, {}) are inverted",
                x1, y1, x2, y2
            )));
        }

        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn to_box(&self) -> RoiBox {
        RoiBox {
            x: self.x1,
            y: self.y1,
            width: self.x2 - self.x1,
            height: self.y2 - self.y1,
        }
    }
}

impl RoiBox {
    pub fn to_corners(&self) -> Result<Roi, Error> {
        Roi::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Normalize a request body into corner form.
///
/// Accepts the box form nested under `roi` (what the dashboard sends),
/// the box form at the top level, or the corner form at the top level.
pub fn normalize_roi(body: &Value) -> Result<Roi, Error> {
    if let Some(nested) = body.get("roi") {
        if !nested.is_object() {
            return Err(Error::Validation("Invalid ROI data".to_string()));
        }
        return normalize_roi(nested);
    }

    if body.get("x1").is_none() && body.get("width").is_some() {
        let roi_box = RoiBox {
            x: number_field(body, "x")?,
            y: number_field(body, "y")?,
            width: number_field(body, "width")?,
            height: number_field(body, "height")?,
        };
        return roi_box.to_corners();
    }

    Roi::new(
        number_field(body, "x1")?,
        number_field(body, "y1")?,
        number_field(body, "x2")?,
        number_field(body, "y2")?,
    )
}

fn number_field(body: &Value, key: &str) -> Result<f64, Error> {
    body.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Validation(format!("Invalid ROI data: '{}' must be a number", key)))
}
