//! In-process stand-in for the coaching server.
//!
//! On every connection it pushes the welcome display update (plus one
//! malformed frame), then answers by message content:
//!
//! - `confirm` -> a `confirmation_request` with id `abc`
//! - `plan`    -> `tool_call`, `display_update`, `tool_result`, `assistant_message`
//! - `bye`     -> closes the socket
//! - anything else -> `assistant_message` echoing the content

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct Relay {
    pub connections: AtomicUsize,
    pub received: Mutex<Vec<Value>>,
}

impl Relay {
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub struct TestServer {
    pub ws_url: String,
    pub relay: Arc<Relay>,
}

pub async fn spawn_relay() -> TestServer {
    let relay = Arc::new(Relay::default());
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health))
        .with_state(relay.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        ws_url: format!("ws://{}/ws", addr),
        relay,
    }
}

/// A `ws://` URL on a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/ws", addr)
}

pub const WAIT: Duration = Duration::from_secs(5);

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "train-r-api",
        "version": "0.2.0"
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(relay): State<Arc<Relay>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

async fn send_json(socket: &mut WebSocket, value: Value) -> bool {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .is_ok()
}

async fn handle_socket(mut socket: WebSocket, relay: Arc<Relay>) {
    relay.connections.fetch_add(1, Ordering::SeqCst);

    let welcome = json!({
        "type": "display_update",
        "display_type": "welcome",
        "data": {"message": "Welcome to Train-R!"}
    });
    if !send_json(&mut socket, welcome).await {
        return;
    }
    if socket.send(Message::Text("not json".into())).await.is_err() {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let Ok(incoming) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        relay.received.lock().await.push(incoming.clone());

        let replies = match incoming["type"].as_str() {
            Some("user_message") => match incoming["content"].as_str().unwrap_or_default() {
                "bye" => {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
                "confirm" => vec![json!({
                    "type": "confirmation_request",
                    "confirmation_id": "abc",
                    "question": "Upload 8 workouts to intervals.icu?"
                })],
                "plan" => vec![
                    json!({"type": "tool_call", "tool_name": "create_workout_plan", "tool_args": {"weeks": 4}}),
                    json!({"type": "display_update", "display_type": "training_plan", "data": {"weeks": 4}}),
                    json!({"type": "tool_result", "tool_name": "create_workout_plan", "result": {"workouts": 16}, "success": true}),
                    json!({"type": "assistant_message", "content": "Your 4-week plan is ready."}),
                ],
                other => vec![json!({"type": "assistant_message", "content": format!("echo: {}", other)})],
            },
            Some("confirmation_response") => vec![json!({
                "type": "assistant_message",
                "content": format!("confirmed: {}", incoming["confirmed"])
            })],
            _ => vec![],
        };

        for reply in replies {
            if !send_json(&mut socket, reply).await {
                return;
            }
        }
    }
}
