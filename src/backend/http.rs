use super::{BackendKind, DetectionBackend};
use crate::config::BackendConfig;
use crate::error::Error;
use crate::models::{
    Camera, CameraStatus, CameraUpdate, ComparisonResponse, DailyData, DetectionEvent,
    EntryDirection, EventQuery, MetricsResponse, NewCamera, OperationResponse, Roi, RoiUpdate,
    Snapshot, SnapshotRef, SummaryResponse, SystemEvent, SystemStatus, TimeRange,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Forwards every call to the detection backend's REST API.
///
/// Upstream failures are reported as errors; nothing is substituted.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the backend at `config.url`
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid backend URL '{}': {}", config.url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid backend URL '{}'", config.url)).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/api/{segments...}`, each segment percent-encoded on its own.
    ///
    /// Caller-supplied ids can never add, remove or rewrite path segments
    /// or start a query string.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(Error::Validation(format!("Invalid path segment '{}'", bad)).into());
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Backend URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Detection backend request failed ({}): {}", what, e);
            Error::Unavailable(format!("{}: {}", what, e))
        })?;

        let status = response.status();
        debug!("Detection backend responded {} for {}", status, what);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = upstream_message(&body).unwrap_or_else(|| status.to_string());
        let err = match status {
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(detail),
            StatusCode::CONFLICT => Error::AlreadyExists(detail),
            _ => Error::Unavailable(format!("{} returned {}: {}", what, status, detail)),
        };
        Err(err.into())
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            Error::Unavailable(format!("Unexpected response from {}: {}", what, e)).into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &[&str], query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path)?;
        debug!("GET {} {:?}", url, query);
        let response = self.send(self.client.get(url.clone()).query(query), url.path()).await?;
        Self::read_json(response, url.path()).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &[&str], body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request, url.path()).await?;
        Self::read_json(response, url.path()).await
    }

    /// Like `send_json`, but tolerates an empty or non-JSON success body
    async fn send_ack<B>(&self, method: Method, path: &[&str], body: Option<&B>) -> Result<OperationResponse>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request, url.path()).await?;
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| OperationResponse::ok()))
    }
}

fn range_query(range: TimeRange, camera_id: Option<&str>) -> Vec<(&'static str, String)> {
    let (key, value) = range.backend_param();
    let mut query = vec![(key, value.to_string())];
    if let Some(camera_id) = camera_id {
        query.push(("cam_id", camera_id.to_string()));
    }
    query
}

fn upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[async_trait]
impl DetectionBackend for HttpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Http
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>> {
        self.get_json(&["cameras"], &[]).await
    }

    async fn get_camera(&self, camera_id: &str) -> Result<Camera> {
        self.get_json(&["cameras", camera_id], &[]).await
    }

    async fn create_camera(&self, camera: NewCamera) -> Result<Camera> {
        self.send_json(Method::POST, &["cameras"], Some(&camera)).await
    }

    async fn update_camera(&self, camera_id: &str, update: &CameraUpdate) -> Result<Camera> {
        // The backend has no PATCH; partial updates go through PUT.
        self.send_json(Method::PUT, &["cameras", camera_id], Some(update))
            .await
    }

    async fn delete_camera(&self, camera_id: &str) -> Result<OperationResponse> {
        self.send_ack::<()>(Method::DELETE, &["cameras", camera_id], None)
            .await
    }

    async fn update_roi(&self, camera_id: &str, roi: &RoiUpdate) -> Result<OperationResponse> {
        self.send_ack(Method::POST, &["cameras", camera_id, "roi"], Some(roi))
            .await
    }

    async fn clear_roi(&self, camera_id: &str) -> Result<OperationResponse> {
        // The backend has no clear route; an all-zero rectangle means "no ROI".
        let cleared = RoiUpdate {
            roi: Roi::default(),
            entry_direction: EntryDirection::default(),
        };
        self.send_ack(Method::POST, &["cameras", camera_id, "roi"], Some(&cleared))
            .await
    }

    async fn camera_status(&self, camera_id: &str) -> Result<CameraStatus> {
        self.get_json(&["cameras", camera_id, "status"], &[]).await
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        self.get_json(&["status"], &[]).await
    }

    async fn set_detection(&self, enabled: bool) -> Result<OperationResponse> {
        let action = if enabled { "start" } else { "stop" };
        self.send_ack::<()>(Method::POST, &["detection", action], None)
            .await
    }

    async fn metrics(&self, range: TimeRange, camera_id: Option<&str>) -> Result<MetricsResponse> {
        self.get_json(&["metrics"], &range_query(range, camera_id))
            .await
    }

    async fn summary(&self, range: TimeRange, camera_id: Option<&str>) -> Result<SummaryResponse> {
        self.get_json(&["metrics", "summary"], &range_query(range, camera_id))
            .await
    }

    async fn daily(&self, range: TimeRange, camera_id: Option<&str>) -> Result<Vec<DailyData>> {
        self.get_json(&["metrics", "daily"], &range_query(range, camera_id))
            .await
    }

    async fn compare(&self, range: TimeRange) -> Result<ComparisonResponse> {
        let mut query = range_query(range, None);
        query.push(("timeRange", range.as_str().to_string()));
        self.get_json(&["analytics", "compare"], &query).await
    }

    async fn events(&self, query: &EventQuery) -> Result<Vec<SystemEvent>> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(from) = query.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = query.to {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        for event_type in &query.types {
            params.push(("types", event_type.clone()));
        }

        self.get_json(&["events"], &params).await
    }

    async fn recent_detections(&self, count: usize) -> Result<Vec<DetectionEvent>> {
        self.get_json(&["detections", "recent"], &[("count", count.to_string())])
            .await
    }

    async fn snapshot(&self, snapshot: &SnapshotRef) -> Result<Snapshot> {
        // The backend addresses the newest image as "latest", without extension.
        let filename = if snapshot.is_latest() {
            "latest"
        } else {
            snapshot.filename.as_str()
        };
        let url = self.url(&["snapshot-image", snapshot.camera_id.as_str(), filename])?;
        debug!("GET {}", url);
        let response = self.send(self.client.get(url.clone()), url.path()).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| Error::Unavailable(format!("Failed to read snapshot: {}", e)))?;

        Ok(Snapshot {
            content_type,
            data: data.to_vec(),
        })
    }
}
