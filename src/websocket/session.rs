use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::api::AppState;
use crate::constants::WS_SNAPSHOT_INTERVAL_MS;

fn connected_payload(session_id: u64) -> String {
    serde_json::json!({
        "type": "connected",
        "session_id": session_id,
    })
    .to_string()
}

fn gone_payload(session_id: u64) -> String {
    serde_json::json!({
        "type": "session_gone",
        "session_id": session_id,
    })
    .to_string()
}

/// WebSocket handler streaming session snapshots until the terminal frame
pub async fn handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<u64>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: u64) {
    let (mut sender, mut receiver) = socket.split();

    let _ = sender
        .send(Message::Text(connected_payload(session_id).into()))
        .await;

    let registry = state.sessions.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_millis(WS_SNAPSHOT_INTERVAL_MS)).await;

            let Some(snapshot) = registry.snapshot(session_id).await else {
                let _ = sender
                    .send(Message::Text(gone_payload(session_id).into()))
                    .await;
                return;
            };

            let ended = !snapshot.active;
            let frame = serde_json::json!({
                "type": if ended { "session_ended" } else { "session_update" },
                "session_id": session_id,
                "session": snapshot,
            })
            .to_string();

            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
            if ended {
                // The terminal frame carries the outcome; nothing follows it.
                let _ = sender.send(Message::Close(None)).await;
                return;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                tracing::info!("Session stream client disconnected");
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }
}
