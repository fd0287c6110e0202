pub mod camera_service;
pub mod event_query;
pub mod status_poller;

pub use status_poller::{PollResult, StatusPoller};
