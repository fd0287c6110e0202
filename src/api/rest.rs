use crate::backend::DetectionBackend;
use crate::config::ApiConfig;
use crate::error::Error;
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub mod cameras_controller;
pub mod events_controller;
pub mod metrics_controller;
pub mod snapshot_controller;
pub mod status_controller;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn DetectionBackend>,
    /// Interval used by live status feeds
    pub poll_interval: Duration,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(rename = "error")]
    pub message: String,
    pub status: u16,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        ApiError {
            message: err.to_string(),
            status: status.as_u16(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<Error>() {
            return err.clone().into();
        }

        error!("Unhandled error: {:#}", err);
        ApiError {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError {
            message: rejection.body_text(),
            status: rejection.status().as_u16(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError {
            message: rejection.body_text(),
            status: rejection.status().as_u16(),
        }
    }
}

/// `Json` whose rejections use the `ApiError` body
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ApiJson<T>
where
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Query` whose rejections use the `ApiError` body
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

/// Build the `/api` router with CORS applied
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(cameras_controller::create_router())
        .merge(status_controller::create_router())
        .merge(metrics_controller::create_router())
        .merge(events_controller::create_router())
        .merge(snapshot_controller::create_router())
        .merge(super::websocket::create_router())
        .with_state(state)
        .layer(cors)
}

pub struct RestApi {
    config: ApiConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(config: &ApiConfig, backend: Arc<dyn DetectionBackend>, poll_interval: Duration) -> Self {
        Self {
            config: config.clone(),
            state: AppState {
                backend,
                poll_interval,
            },
        }
    }

    pub async fn run(&self) -> Result<()> {
        let mut app = create_router(self.state.clone());

        // Serve the built dashboard for everything outside /api
        if let Some(static_dir) = &self.config.static_dir {
            info!("Serving static files from {:?}", static_dir);
            app = app.fallback_service(ServeDir::new(static_dir));
        }

        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr.parse()?;

        info!("API server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::Server::from_tcp(listener.into_std()?)?
            .serve(app.into_make_service())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutting down API server");
            })
            .await?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::BackendConfig;
    use crate::backend::HttpBackend;
    use axum::http::Method;
    use serde_json::Value;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (Error::Validation("x".into()), 400),
            (Error::NotFound("x".into()), 404),
            (Error::AlreadyExists("x".into()), 409),
            (Error::Unavailable("x".into()), 503),
            (Error::Internal("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(anyhow::Error::from(err)).status, status);
        }

        let untyped = ApiError::from(anyhow::anyhow!("boom"));
        assert_eq!(untyped.status, 500);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let router = fixture_router();
        let (status, body) = call(&router, Method::GET, "/api/cameras/cam-404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
        assert!(body["error"].as_str().unwrap().contains("cam-404"));
    }

    #[tokio::test]
    async fn test_backend_down_is_503() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend = HttpBackend::new(&BackendConfig {
            url: format!("http://127.0.0.1:{}", port),
            timeout_ms: 1000,
            use_mock_data: false,
        })
        .unwrap();
        let router = router_for(Arc::new(backend));

        for uri in ["/api/cameras", "/api/status?camera_id=cam-001", "/api/metrics"] {
            let (status, body) = call(&router, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
            assert_eq!(body["status"], 503);
        }
    }

    async fn post_raw(router: &Router, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut request = axum::http::Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let response = tower::ServiceExt::oneshot(
            router.clone(),
            request.body(axum::body::Body::from(body.to_string())).unwrap(),
        )
        .await
        .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).expect("JSON error body"))
    }

    #[tokio::test]
    async fn test_body_rejections_use_error_shape() {
        let router = fixture_router();

        let (status, body) = post_raw(&router, "/api/cameras", Some("application/json"), "{\"name\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(!body["error"].as_str().unwrap().is_empty());

        let (status, body) = post_raw(&router, "/api/cameras/cam-001/roi", None, "{}").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["status"], 415);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_query_rejections_use_error_shape() {
        let router = fixture_router();
        let (status, body) = call(&router, Method::GET, "/api/metrics?timeRange=7d&timeRange=30d", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let router = fixture_router();
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/cameras")
            .header("origin", "http://dashboard.local")
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
