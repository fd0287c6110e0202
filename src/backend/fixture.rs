use super::fixture_data::{self, HOURLY_PROFILE};
use super::{BackendKind, DetectionBackend};
use crate::error::Error;
use crate::models::{
    Camera, CameraAnalytics, CameraStatus, CameraUpdate, ComparisonResponse, DailyData, DetectionEvent,
    DirectionData, EventQuery, HourlyData, MetricsResponse, NewCamera, OperationResponse,
    RoiUpdate, Snapshot, SnapshotInfo, SnapshotRef, SummaryResponse, SystemEvent, SystemStatus,
    TimeRange,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc, Weekday};
use log::{debug, info};
use rand::Rng;
use std::time::Instant;
use tokio::sync::RwLock;

/// In-process stand-in for the detection backend.
///
/// Seeded with a fixed set of cameras, events and detections. Mutations are
/// kept in memory and recorded as `config`/`system` events so the events
/// page reflects them. Per-camera status is randomised on every call.
pub struct FixtureBackend {
    state: RwLock<FixtureState>,
    started_at: Instant,
}

struct FixtureState {
    cameras: Vec<Camera>,
    events: Vec<SystemEvent>,
    detections: Vec<DetectionEvent>,
    detection_running: bool,
    next_event_id: usize,
}

impl FixtureState {
    fn camera_mut(&mut self, camera_id: &str) -> Result<&mut Camera> {
        self.cameras
            .iter_mut()
            .find(|c| c.id == camera_id)
            .ok_or_else(|| Error::NotFound(format!("Camera not found: {}", camera_id)).into())
    }

    fn record(&mut self, event_type: &str, message: String, camera_id: Option<&str>) {
        self.next_event_id += 1;
        self.events.push(SystemEvent {
            id: format!("evt-{:03}", self.next_event_id),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            message,
            camera_id: camera_id.map(str::to_string),
        });
    }
}

impl FixtureBackend {
    /// Backend pre-populated with the demo site
    pub fn seeded() -> Self {
        let events = fixture_data::events();
        Self {
            state: RwLock::new(FixtureState {
                cameras: fixture_data::cameras(),
                next_event_id: events.len(),
                events,
                detections: fixture_data::detections(),
                detection_running: true,
            }),
            started_at: Instant::now(),
        }
    }

    /// Backend with no cameras, events or detections
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(FixtureState {
                cameras: Vec::new(),
                events: Vec::new(),
                detections: Vec::new(),
                detection_running: true,
                next_event_id: 0,
            }),
            started_at: Instant::now(),
        }
    }

    /// Share of site-wide footfall attributed to one camera, or the whole site.
    async fn scale_for(&self, camera_id: Option<&str>) -> Result<(u32, u32)> {
        let comparison = fixture_data::comparison();
        let site_total: u32 = comparison.iter().map(|c| c.count).sum();

        let Some(camera_id) = camera_id else {
            return Ok((site_total, site_total));
        };

        let state = self.state.read().await;
        if !state.cameras.iter().any(|c| c.id == camera_id) {
            return Err(Error::NotFound(format!("Camera not found: {}", camera_id)).into());
        }
        let camera_count = comparison
            .iter()
            .find(|c| c.id == camera_id)
            .map(|c| c.count)
            .unwrap_or(0);
        Ok((camera_count, site_total))
    }
}

fn scaled(value: u32, (numerator, denominator): (u32, u32)) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((value as u64 * numerator as u64) / denominator as u64) as u32
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_uptime(elapsed: std::time::Duration) -> String {
    let minutes = elapsed.as_secs() / 60;
    format!("{}d {}h {}m", minutes / 1440, (minutes / 60) % 24, minutes % 60)
}

#[async_trait]
impl DetectionBackend for FixtureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fixture
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>> {
        Ok(self.state.read().await.cameras.clone())
    }

    async fn get_camera(&self, camera_id: &str) -> Result<Camera> {
        self.state
            .read()
            .await
            .cameras
            .iter()
            .find(|c| c.id == camera_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Camera not found: {}", camera_id)).into())
    }

    async fn create_camera(&self, new_camera: NewCamera) -> Result<Camera> {
        let mut state = self.state.write().await;
        if state.cameras.iter().any(|c| c.id == new_camera.id) {
            return Err(Error::AlreadyExists(format!(
                "Camera with this ID already exists: {}",
                new_camera.id
            ))
            .into());
        }

        let camera = Camera::from_new(new_camera);
        state.cameras.push(camera.clone());
        state.record(
            "config",
            format!("New camera added: {}", camera.name),
            Some(&camera.id),
        );
        info!("Fixture backend added camera {}", camera.id);

        Ok(camera)
    }

    async fn update_camera(&self, camera_id: &str, update: &CameraUpdate) -> Result<Camera> {
        let mut state = self.state.write().await;
        let camera = state.camera_mut(camera_id)?;
        camera.apply(update);
        let camera = camera.clone();
        state.record(
            "config",
            format!("Settings updated for camera {}", camera_id),
            Some(camera_id),
        );

        Ok(camera)
    }

    async fn delete_camera(&self, camera_id: &str) -> Result<OperationResponse> {
        let mut state = self.state.write().await;
        let before = state.cameras.len();
        state.cameras.retain(|c| c.id != camera_id);
        if state.cameras.len() == before {
            return Err(Error::NotFound(format!("Camera not found: {}", camera_id)).into());
        }
        state.record(
            "config",
            format!("Camera removed: {}", camera_id),
            Some(camera_id),
        );

        Ok(OperationResponse::with_message(format!(
            "Camera {} deleted",
            camera_id
        )))
    }

    async fn update_roi(&self, camera_id: &str, roi: &RoiUpdate) -> Result<OperationResponse> {
        let mut state = self.state.write().await;
        let camera = state.camera_mut(camera_id)?;
        camera.roi = Some(roi.roi);
        camera.entry_direction = Some(roi.entry_direction.clone());
        state.record(
            "config",
            format!("ROI updated for camera {}", camera_id),
            Some(camera_id),
        );

        Ok(OperationResponse::ok())
    }

    async fn clear_roi(&self, camera_id: &str) -> Result<OperationResponse> {
        let mut state = self.state.write().await;
        let camera = state.camera_mut(camera_id)?;
        camera.roi = None;
        camera.entry_direction = None;
        state.record(
            "config",
            format!("ROI cleared for camera {}", camera_id),
            Some(camera_id),
        );

        Ok(OperationResponse::ok())
    }

    async fn camera_status(&self, camera_id: &str) -> Result<CameraStatus> {
        let camera = self.get_camera(camera_id).await?;
        let detection_running = self.state.read().await.detection_running;

        let mut rng = rand::thread_rng();
        let person_detected = rng.gen_bool(0.3);
        let mut status = CameraStatus {
            detection_active: detection_running && camera.active,
            person_detected,
            last_detection_time: None,
            camera_id: None,
            direction: None,
        };
        if person_detected {
            status.last_detection_time = Some(Utc::now());
            status.camera_id = Some(camera.id);
            status.direction = Some(if rng.gen_bool(0.5) { "LTR" } else { "RTL" }.to_string());
        }

        debug!(
            "Fixture status for {}: person_detected={}",
            camera_id, status.person_detected
        );
        Ok(status)
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        let state = self.state.read().await;
        Ok(SystemStatus {
            system_status: if state.detection_running {
                "operational"
            } else {
                "paused"
            }
            .to_string(),
            uptime: format_uptime(self.started_at.elapsed()),
            active_cameras: state.cameras.iter().filter(|c| c.active).count() as u32,
            extra: Default::default(),
        })
    }

    async fn set_detection(&self, enabled: bool) -> Result<OperationResponse> {
        let mut state = self.state.write().await;
        state.detection_running = enabled;
        let (message, event) = if enabled {
            ("Detection started successfully", "Detection system resumed")
        } else {
            ("Detection stopped successfully", "Detection system paused")
        };
        state.record("system", event.to_string(), None);
        info!("{}", message);

        Ok(OperationResponse::with_message(message))
    }

    async fn metrics(&self, range: TimeRange, camera_id: Option<&str>) -> Result<MetricsResponse> {
        let scale = self.scale_for(camera_id).await?;
        let today = Utc::now().date_naive();
        let days = range.days();

        let mut hourly_data = Vec::with_capacity(days as usize * 24);
        for offset in (0..days).rev() {
            let date = today - Duration::days(offset as i64);
            for (hour, count) in HOURLY_PROFILE.iter().enumerate() {
                hourly_data.push(HourlyData {
                    hour: format!("{:02}:00", hour),
                    date: Some(date.format("%Y-%m-%d").to_string()),
                    count: scaled(*count, scale),
                });
            }
        }
        let total: u32 = hourly_data.iter().map(|h| h.count).sum();

        let comparison = fixture_data::comparison();
        let (ltr_site, rtl_site) = comparison
            .iter()
            .filter(|c| camera_id.map_or(true, |id| c.id == id))
            .fold((0, 0), |(l, r), c| (l + c.ltr, r + c.rtl));
        let ltr = scaled(total, (ltr_site, ltr_site + rtl_site));
        let rtl = total - ltr;
        let percentage = |part: u32| {
            if total == 0 {
                0.0
            } else {
                one_decimal(part as f64 * 100.0 / total as f64)
            }
        };

        Ok(MetricsResponse {
            total,
            change: 12.5,
            hourly_data,
            directions: DirectionData {
                ltr,
                rtl,
                ltr_percentage: percentage(ltr),
                rtl_percentage: percentage(rtl),
                change: 5.2,
            },
        })
    }

    async fn summary(&self, range: TimeRange, camera_id: Option<&str>) -> Result<SummaryResponse> {
        let scale = self.scale_for(camera_id).await?;
        let per_day: u32 = HOURLY_PROFILE.iter().map(|c| scaled(*c, scale)).sum();
        let (peak_hour, peak) = HOURLY_PROFILE
            .iter()
            .enumerate()
            .max_by_key(|(_, count)| **count)
            .map(|(hour, count)| (hour, *count))
            .unwrap_or((0, 0));

        Ok(SummaryResponse {
            total_detections: per_day * range.days(),
            avg_per_day: per_day,
            peak_hour: format!("{:02}:00 - {:02}:00", peak_hour, (peak_hour + 1) % 24),
            peak_count: scaled(peak, scale),
            change: 8.3,
        })
    }

    async fn daily(&self, range: TimeRange, camera_id: Option<&str>) -> Result<Vec<DailyData>> {
        let scale = self.scale_for(camera_id).await?;
        let per_day: u32 = HOURLY_PROFILE.iter().map(|c| scaled(*c, scale)).sum();
        let today = Utc::now().date_naive();

        Ok((0..range.days())
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset as i64);
                let count = match date.weekday() {
                    Weekday::Sat | Weekday::Sun => per_day * 4 / 5,
                    _ => per_day,
                };
                DailyData {
                    date: date.format("%Y-%m-%d").to_string(),
                    count,
                }
            })
            .collect())
    }

    async fn compare(&self, _range: TimeRange) -> Result<ComparisonResponse> {
        let state = self.state.read().await;
        let known = fixture_data::comparison();
        let cameras = state
            .cameras
            .iter()
            .map(|camera| {
                known
                    .iter()
                    .find(|c| c.id == camera.id)
                    .cloned()
                    .map(|mut c| {
                        c.name = camera.name.clone();
                        c
                    })
                    .unwrap_or_else(|| CameraAnalytics {
                        id: camera.id.clone(),
                        name: camera.name.clone(),
                        count: 0,
                        ltr: 0,
                        rtl: 0,
                    })
            })
            .collect();

        Ok(ComparisonResponse { cameras })
    }

    async fn events(&self, query: &EventQuery) -> Result<Vec<SystemEvent>> {
        let state = self.state.read().await;
        let mut events: Vec<SystemEvent> = state
            .events
            .iter()
            .filter(|e| query.types.is_empty() || query.types.contains(&e.event_type))
            .filter(|e| query.from.map_or(true, |from| e.timestamp.date_naive() >= from))
            .filter(|e| query.to.map_or(true, |to| e.timestamp.date_naive() <= to))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(query.limit);

        Ok(events)
    }

    async fn recent_detections(&self, count: usize) -> Result<Vec<DetectionEvent>> {
        let mut detections = self.state.read().await.detections.clone();
        detections.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        detections.truncate(count);

        Ok(detections)
    }

    async fn snapshot(&self, snapshot: &SnapshotRef) -> Result<Snapshot> {
        self.get_camera(&snapshot.camera_id).await?;

        let info = SnapshotInfo {
            success: true,
            path: snapshot.public_path(),
            camera_id: snapshot.camera_id.clone(),
            filename: snapshot.filename.clone(),
            timestamp: Some(Utc::now()),
        };

        Ok(Snapshot {
            content_type: "application/json".to_string(),
            data: serde_json::to_vec(&info).map_err(Error::from)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryDirection, Roi};
    use chrono::NaiveDate;

    fn new_camera(id: &str) -> NewCamera {
        NewCamera {
            id: id.to_string(),
            name: format!("Camera {}", id),
            source: "rtsp://10.0.0.1/stream".to_string(),
        }
    }

    fn error_of(err: anyhow::Error) -> Error {
        err.downcast::<Error>().expect("typed error")
    }

    #[tokio::test]
    async fn test_seeded_cameras() {
        let backend = FixtureBackend::seeded();
        let cameras = backend.list_cameras().await.unwrap();
        assert_eq!(cameras.len(), 5);
        let front = backend.get_camera("cam-001").await.unwrap();
        assert_eq!(front.roi, Some(Roi::new(50.0, 100.0, 250.0, 250.0).unwrap()));
        assert_eq!(front.entry_direction, Some(EntryDirection::left_to_right()));
    }

    #[tokio::test]
    async fn test_create_duplicate_and_missing() {
        let backend = FixtureBackend::empty();
        backend.create_camera(new_camera("cam-1")).await.unwrap();
        let err = backend.create_camera(new_camera("cam-1")).await.unwrap_err();
        assert!(matches!(error_of(err), Error::AlreadyExists(_)));

        let err = backend.get_camera("cam-404").await.unwrap_err();
        assert!(matches!(error_of(err), Error::NotFound(_)));
        let err = backend.delete_camera("cam-404").await.unwrap_err();
        assert!(matches!(error_of(err), Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_roi_removes_field() {
        let backend = FixtureBackend::seeded();
        backend.clear_roi("cam-001").await.unwrap();
        let camera = backend.get_camera("cam-001").await.unwrap();
        assert_eq!(camera.roi, None);
        assert_eq!(camera.entry_direction, None);
    }

    #[tokio::test]
    async fn test_mutations_are_logged_as_events() {
        let backend = FixtureBackend::seeded();
        backend
            .update_roi(
                "cam-002",
                &RoiUpdate {
                    roi: Roi::new(0.0, 0.0, 10.0, 10.0).unwrap(),
                    entry_direction: EntryDirection::right_to_left(),
                },
            )
            .await
            .unwrap();

        let latest = backend
            .events(&EventQuery {
                from: None,
                to: None,
                types: vec!["config".to_string()],
                limit: 1,
            })
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].message, "ROI updated for camera cam-002");
        assert_eq!(latest[0].id, "evt-009");
    }

    #[tokio::test]
    async fn test_events_filtered_and_sorted() {
        let backend = FixtureBackend::seeded();
        let day = NaiveDate::from_ymd_opt(2023, 4, 7);
        let errors = backend
            .events(&EventQuery {
                from: day,
                to: day,
                types: vec!["error".to_string()],
                limit: 10,
            })
            .await
            .unwrap();
        let ids: Vec<&str> = errors.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-007", "evt-002"]);

        let none = backend
            .events(&EventQuery {
                from: NaiveDate::from_ymd_opt(2024, 1, 1),
                to: None,
                types: vec![],
                limit: 10,
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_recent_detections_newest_first() {
        let backend = FixtureBackend::seeded();
        let detections = backend.recent_detections(3).await.unwrap();
        let ids: Vec<&str> = detections.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["det-010", "det-009", "det-008"]);
    }

    #[tokio::test]
    async fn test_status_for_unknown_camera() {
        let backend = FixtureBackend::seeded();
        let err = backend.camera_status("cam-404").await.unwrap_err();
        assert!(matches!(error_of(err), Error::NotFound(_)));

        let status = backend.camera_status("cam-001").await.unwrap();
        assert!(status.detection_active);
        if status.person_detected {
            assert_eq!(status.camera_id.as_deref(), Some("cam-001"));
        } else {
            assert!(status.direction.is_none());
        }
    }

    #[tokio::test]
    async fn test_stop_detection_deactivates_status() {
        let backend = FixtureBackend::seeded();
        backend.set_detection(false).await.unwrap();
        assert!(!backend.camera_status("cam-001").await.unwrap().detection_active);
        assert_eq!(backend.system_status().await.unwrap().system_status, "paused");
    }

    #[tokio::test]
    async fn test_metrics_shapes() {
        let backend = FixtureBackend::seeded();
        let metrics = backend.metrics(TimeRange::Hours24, None).await.unwrap();
        assert_eq!(metrics.hourly_data.len(), 24);
        assert_eq!(metrics.total, HOURLY_PROFILE.iter().sum::<u32>());
        assert_eq!(metrics.directions.ltr + metrics.directions.rtl, metrics.total);

        let week = backend.daily(TimeRange::Days7, Some("cam-001")).await.unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(
            week.last().map(|d| d.date.clone()),
            Some(Utc::now().date_naive().format("%Y-%m-%d").to_string())
        );

        let summary = backend.summary(TimeRange::Days30, None).await.unwrap();
        assert_eq!(summary.peak_hour, "12:00 - 13:00");
        assert_eq!(summary.total_detections, summary.avg_per_day * 30);

        let err = backend.metrics(TimeRange::Days7, Some("cam-404")).await.unwrap_err();
        assert!(matches!(error_of(err), Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_snapshot_info() {
        let backend = FixtureBackend::seeded();
        let snapshot = backend
            .snapshot(&SnapshotRef::parse("cam-003").unwrap())
            .await
            .unwrap();
        assert_eq!(snapshot.content_type, "application/json");
        let info: SnapshotInfo = serde_json::from_slice(&snapshot.data).unwrap();
        assert_eq!(info.path, "/snapshots/cam-003/latest.jpg");
    }
}
