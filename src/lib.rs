pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Re-export main components for easier use
pub use api::rest::{create_router, AppState, RestApi};
pub use backend::{create_backend, DetectionBackend, FixtureBackend, HttpBackend};
pub use config::{load_config, Config};
pub use error::Error;
pub use services::{PollResult, StatusPoller};
