use crate::api::rest::AppState;
use crate::services::StatusPoller;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt, Sink};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Commands sent by the dashboard
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Select { camera_id: String },
    Clear,
}

// Protocol errors reported back to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerNotice {
    Error { message: String },
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/api/live/ws", get(handle_ws_upgrade))
}

// Handle WebSocket connection upgrade
pub async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// One poller per connection; dropping it stops the polling loop.
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("Live status client connected");

    let poller = StatusPoller::new(Arc::clone(&state.backend), state.poll_interval);
    let mut results = poller.subscribe();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("Live status socket error: {}", e);
                        break;
                    }
                };

                match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(ClientCommand::Select { camera_id }) => poller.select_camera(&camera_id).await,
                    Ok(ClientCommand::Clear) => poller.clear().await,
                    Err(e) => {
                        debug!("Ignoring malformed command {:?}: {}", text, e);
                        let notice = ServerNotice::Error {
                            message: format!("Invalid command: {}", e),
                        };
                        if !send_json(&mut sender, &notice).await {
                            break;
                        }
                    }
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let result = results.borrow_and_update().clone();
                let Some(result) = result else { continue };

                // Late results for a camera the client already left are dropped.
                if poller.selected().await.as_deref() != Some(result.camera_id()) {
                    continue;
                }
                if !send_json(&mut sender, &result).await {
                    break;
                }
            }
        }
    }

    poller.clear().await;
    info!("Live status client disconnected");
}

async fn send_json<S, T>(sender: &mut S, message: &T) -> bool
where
    S: Sink<Message> + Unpin,
    T: Serialize,
{
    match serde_json::to_string(message) {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode live status message: {}", e);
            true
        }
    }
}
