//! WebSocket streaming of view snapshots.
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
        .into_response()
}

async fn send_snapshot(socket: &mut WebSocket, state: &AppState) -> bool {
    let payload = match serde_json::to_string(&state.snapshot()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to encode snapshot: {}", e);
            return true;
        }
    };
    socket.send(Message::Text(payload)).await.is_ok()
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.subscribe();

    if !send_snapshot(&mut socket, &state).await {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            event = rx.recv() => {
                match event {
                    // Each snapshot is complete, so missed changes collapse into one.
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if !send_snapshot(&mut socket, &state).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}
