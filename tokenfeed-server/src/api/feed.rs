use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// `GET /ws` — paced event stream.
///
/// Upgrades the HTTP connection to a WebSocket and forwards every frame
/// the pacer broadcasts. Clients only receive; anything they send other
/// than a close is ignored.
pub(crate) async fn feed_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_feed_ws(socket, state))
}

/// Background task that drives a single WebSocket connection until the
/// client disconnects or the broadcaster goes away.
async fn handle_feed_ws(mut socket: WebSocket, state: AppState) {
    let mut broadcast_rx = state.broadcaster.subscribe();
    tracing::info!(
        clients = state.broadcaster.client_count(),
        "WS: client connected"
    );

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload.to_string().into())).await.is_err() {
                            tracing::debug!("WS: send failed, dropping client");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WS: client lagged, frames skipped");
                    }
                    Err(RecvError::Closed) => {
                        let _ = socket.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    drop(broadcast_rx);
    tracing::info!(
        clients = state.broadcaster.client_count(),
        "WS: client disconnected"
    );
}
