use crate::models::{Camera, CameraAnalytics, DetectionEvent, EntryDirection, Roi, SystemEvent};
use chrono::{DateTime, Utc};

fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

fn camera(id: &str, name: &str, host: u8, active: bool, detection_enabled: bool) -> Camera {
    Camera {
        id: id.to_string(),
        name: name.to_string(),
        source: format!("rtsp://192.168.1.{}:554/stream1", host),
        active,
        detection_enabled,
        roi: None,
        entry_direction: None,
    }
}

pub(crate) fn cameras() -> Vec<Camera> {
    let mut front_door = camera("cam-001", "Front Door", 100, true, true);
    front_door.roi = Some(Roi {
        x1: 50.0,
        y1: 100.0,
        x2: 250.0,
        y2: 250.0,
    });
    front_door.entry_direction = Some(EntryDirection::left_to_right());

    let mut garage = camera("cam-003", "Garage", 102, true, true);
    garage.roi = Some(Roi {
        x1: 100.0,
        y1: 150.0,
        x2: 400.0,
        y2: 350.0,
    });
    garage.entry_direction = Some(EntryDirection::right_to_left());

    vec![
        front_door,
        camera("cam-002", "Backyard", 101, false, false),
        garage,
        camera("cam-004", "Side Entrance", 103, true, false),
        camera("cam-005", "Driveway", 104, true, true),
    ]
}

pub(crate) fn events() -> Vec<SystemEvent> {
    [
        ("evt-001", "2023-04-07T08:23:15Z", "system", "System started", None),
        ("evt-002", "2023-04-07T09:15:22Z", "error", "Connection lost to camera cam-002", Some("cam-002")),
        ("evt-003", "2023-04-07T10:45:11Z", "config", "ROI updated for camera cam-001", Some("cam-001")),
        ("evt-004", "2023-04-07T12:30:45Z", "system", "Detection system paused", None),
        ("evt-005", "2023-04-07T13:05:33Z", "config", "New camera added: Side Gate", Some("cam-006")),
        ("evt-006", "2023-04-07T14:22:18Z", "system", "Detection system resumed", None),
        ("evt-007", "2023-04-07T15:40:09Z", "error", "Low disk space warning", None),
        ("evt-008", "2023-04-07T16:55:27Z", "config", "Detection sensitivity increased for camera cam-003", Some("cam-003")),
    ]
    .into_iter()
    .map(|(id, timestamp, event_type, message, camera_id)| SystemEvent {
        id: id.to_string(),
        timestamp: at(timestamp),
        event_type: event_type.to_string(),
        message: message.to_string(),
        camera_id: camera_id.map(str::to_string),
    })
    .collect()
}

pub(crate) fn detections() -> Vec<DetectionEvent> {
    [
        ("det-001", "2023-04-07T08:30:15Z", "cam-001", "LTR", 0.92),
        ("det-002", "2023-04-07T09:12:33Z", "cam-003", "RTL", 0.87),
        ("det-003", "2023-04-07T10:05:22Z", "cam-001", "LTR", 0.95),
        ("det-004", "2023-04-07T11:45:10Z", "cam-005", "RTL", 0.89),
        ("det-005", "2023-04-07T12:33:45Z", "cam-003", "LTR", 0.91),
        ("det-006", "2023-04-07T13:20:18Z", "cam-001", "RTL", 0.88),
        ("det-007", "2023-04-07T14:15:33Z", "cam-005", "LTR", 0.93),
        ("det-008", "2023-04-07T15:40:22Z", "cam-003", "LTR", 0.90),
        ("det-009", "2023-04-07T16:25:11Z", "cam-001", "RTL", 0.86),
        ("det-010", "2023-04-07T17:10:45Z", "cam-005", "LTR", 0.94),
    ]
    .into_iter()
    .map(|(id, timestamp, camera_id, direction, confidence)| DetectionEvent {
        id: id.to_string(),
        timestamp: at(timestamp),
        camera_id: camera_id.to_string(),
        direction: direction.to_string(),
        confidence,
        snapshot_path: format!("/snapshots/{}.jpg", id),
    })
    .collect()
}

pub(crate) fn comparison() -> Vec<CameraAnalytics> {
    [
        ("cam-001", "Front Door", 245, 180),
        ("cam-002", "Backyard", 85, 47),
        ("cam-003", "Garage", 190, 128),
        ("cam-004", "Side Entrance", 120, 95),
        ("cam-005", "Driveway", 102, 56),
    ]
    .into_iter()
    .map(|(id, name, ltr, rtl)| CameraAnalytics {
        id: id.to_string(),
        name: name.to_string(),
        count: ltr + rtl,
        ltr,
        rtl,
    })
    .collect()
}

/// Typical 24h footfall profile, one count per hour starting at 00:00
pub(crate) const HOURLY_PROFILE: [u32; 24] = [
    12, 8, 5, 3, 2, 4, 10, 25, 45, 60, 68, 72, 78, 74, 70, 68, 65, 60, 55, 45, 32, 25, 18, 15,
];
