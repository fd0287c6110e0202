use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// System event model (configuration changes, errors, lifecycle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub message: String,
    pub camera_id: Option<String>,
}

/// Resolved filter for an events listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub types: Vec<String>,
    pub limit: usize,
}
