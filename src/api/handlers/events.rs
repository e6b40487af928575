use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Upgrade an observer connection. Each observer gets its own receiver on
/// the hub; no per-connection state survives a disconnect.
pub async fn events_ws(State(state): State<crate::AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_observer(socket, state))
}

async fn handle_observer(socket: WebSocket, state: crate::AppState) {
    let mut rx = state.events.subscribe();
    info!(
        "👀 Observer connected ({} active)",
        state.events.observer_count()
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(err) => {
                            warn!("dropping unserializable event: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Slow consumer: skip ahead instead of stalling the hub.
                    warn!("observer lagged, {} events skipped", missed);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(rx);
    info!(
        "👋 Observer disconnected ({} remaining)",
        state.events.observer_count()
    );
}
