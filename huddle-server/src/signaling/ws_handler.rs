use crate::signaling::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ConnectionId, ErrorCode, ServerMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn = ConnectionId::new();
    info!("New WebSocket connection: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let queue = state.signaling.add_peer(conn);
    let heartbeat_interval = state.signaling.transport_config().heartbeat_interval;
    let liveness = state.signaling.transport_config().liveness_timeout();

    state
        .signaling
        .send_signal(conn, ServerMessage::Welcome { connection_id: conn });

    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(heartbeat_interval);
        heartbeat.tick().await;

        loop {
            let frame = tokio::select! {
                msg = queue.pop() => match msg {
                    Some(msg) => match serde_json::to_string(&msg) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            error!("Failed to encode frame for {}: {}", conn, e);
                            continue;
                        }
                    },
                    None => break,
                },
                _ = heartbeat.tick() => Message::Ping(Default::default()),
            };

            if sender.send(frame).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            loop {
                let msg = match tokio::time::timeout(liveness, receiver.next()).await {
                    Ok(Some(Ok(msg))) => msg,
                    Ok(Some(Err(e))) => {
                        debug!("WebSocket error on {}: {}", conn, e);
                        break;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        warn!("{} missed its heartbeats, closing", conn);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(request) => state.coordinator.dispatch(conn, request).await,
                            Err(e) => {
                                warn!("Invalid ClientMessage from {}: {}", conn, e);
                                reject_malformed(&state, conn, e.to_string());
                            }
                        }
                    }
                    Message::Binary(bytes) => {
                        warn!("{} sent a {} byte binary frame", conn, bytes.len());
                        reject_malformed(&state, conn, "binary frames are not accepted".into());
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.coordinator.disconnect(conn).await;
    state.signaling.remove_peer(&conn);
    info!("WebSocket disconnected: {}", conn);
}

fn reject_malformed(state: &AppState, conn: ConnectionId, reason: String) {
    state
        .signaling
        .send_signal(conn, ServerMessage::error(ErrorCode::Malformed, reason));
}
