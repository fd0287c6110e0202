use crate::backend::DetectionBackend;
use crate::models::CameraStatus;
use anyhow::Result;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Fetches the status of one camera
pub type StatusFetcher =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<CameraStatus>> + Send + Sync>;

/// Outcome of a single status fetch, tagged with the camera it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollResult {
    Status {
        camera_id: String,
        status: CameraStatus,
    },
    Unavailable {
        camera_id: String,
        reason: String,
    },
}

impl PollResult {
    pub fn camera_id(&self) -> &str {
        match self {
            Self::Status { camera_id, .. } | Self::Unavailable { camera_id, .. } => camera_id,
        }
    }
}

/// Polls the selected camera's status on a fixed interval.
///
/// At most one polling loop runs per poller. Selecting a camera cancels the
/// previous loop and fetches immediately. Fetches run as detached tasks, so
/// a slow request is never aborted and results land in completion order.
pub struct StatusPoller {
    fetcher: StatusFetcher,
    period: Duration,
    shutdown: CancellationToken,
    current: Mutex<Option<(String, CancellationToken)>>,
    results: watch::Sender<Option<PollResult>>,
    active_loops: Arc<AtomicUsize>,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn DetectionBackend>, period: Duration) -> Self {
        let fetcher: StatusFetcher = Arc::new(move |camera_id: String| -> BoxFuture<'static, Result<CameraStatus>> {
            let backend = Arc::clone(&backend);
            Box::pin(async move { backend.camera_status(&camera_id).await })
        });
        Self::with_fetcher(fetcher, period)
    }

    pub fn with_fetcher(fetcher: StatusFetcher, period: Duration) -> Self {
        let (results, _) = watch::channel(None);
        Self {
            fetcher,
            period,
            shutdown: CancellationToken::new(),
            current: Mutex::new(None),
            results,
            active_loops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Receive every published result; `None` until the first fetch completes
    pub fn subscribe(&self) -> watch::Receiver<Option<PollResult>> {
        self.results.subscribe()
    }

    pub async fn selected(&self) -> Option<String> {
        self.current.lock().await.as_ref().map(|(id, _)| id.clone())
    }

    pub fn active_loops(&self) -> usize {
        self.active_loops.load(Ordering::SeqCst)
    }

    /// Start polling `camera_id`, replacing any running loop.
    pub async fn select_camera(&self, camera_id: &str) {
        let mut current = self.current.lock().await;
        if let Some((previous, token)) = current.take() {
            debug!("Stopping status polling for camera {}", previous);
            token.cancel();
        }

        let token = self.shutdown.child_token();
        *current = Some((camera_id.to_string(), token.clone()));
        info!(
            "Polling status for camera {} every {:?}",
            camera_id, self.period
        );

        self.spawn_loop(camera_id.to_string(), token);
    }

    /// Stop polling and forget the last result.
    pub async fn clear(&self) {
        if let Some((previous, token)) = self.current.lock().await.take() {
            debug!("Stopping status polling for camera {}", previous);
            token.cancel();
        }
        self.results.send_replace(None);
    }

    fn spawn_loop(&self, camera_id: String, token: CancellationToken) {
        let fetcher = Arc::clone(&self.fetcher);
        let results = self.results.clone();
        let active_loops = Arc::clone(&self.active_loops);
        let period = self.period;

        active_loops.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            // The first tick completes immediately.
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // Cancellation wins over a tick that is due at the same time.
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        spawn_fetch(Arc::clone(&fetcher), results.clone(), camera_id.clone());
                    }
                }
            }

            active_loops.fetch_sub(1, Ordering::SeqCst);
            debug!("Status polling loop for camera {} exited", camera_id);
        });
    }
}

fn spawn_fetch(
    fetcher: StatusFetcher,
    results: watch::Sender<Option<PollResult>>,
    camera_id: String,
) {
    tokio::spawn(async move {
        let result = match fetcher(camera_id.clone()).await {
            Ok(status) => PollResult::Status { camera_id, status },
            Err(e) => {
                warn!("Status fetch for camera {} failed: {}", camera_id, e);
                PollResult::Unavailable {
                    camera_id,
                    reason: e.to_string(),
                }
            }
        };
        results.send_replace(Some(result));
    });
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
