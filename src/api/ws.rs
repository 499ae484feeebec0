// Dashboard event socket - a 5 second heartbeat keepalive per client.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde_json::json;
use std::time::Duration;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

pub async fn events(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(heartbeat_loop)
}

async fn heartbeat_loop(mut socket: WebSocket) {
    let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
    interval.tick().await;
    loop {
        interval.tick().await;
        let payload = json!({ "type": "heartbeat" }).to_string();
        if socket.send(Message::Text(payload)).await.is_err() {
            // Client went away; nothing to clean up.
            break;
        }
    }
}
