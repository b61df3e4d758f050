use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::*;
use crate::game::engine::SharedWorld;
use crate::game::snake::{random_color, Snake};
use crate::protocol::messages::{ClientMessage, ServerMessage};
use crate::server::conn::{Conn, ConnManager};

#[derive(Clone)]
pub struct WsState {
    pub world: SharedWorld,
    pub conns: Arc<ConnManager>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();

    if state.conns.count() >= MAX_PLAYERS {
        let full = ServerMessage::Error {
            message: "Server full. Please try again later.".into(),
        };
        if let Ok(json) = serde_json::to_string(&full) {
            let _ = sender.send(Message::Text(json.into())).await;
        }
        return;
    }

    let id = { state.world.write().await.next_id() };
    let color = random_color();
    let (conn, mut rx) = Conn::new(id, color.clone());
    state.conns.add(conn.clone());
    info!(conn = id, "player connected");

    // Welcome immediately so the client knows its id, the world radius and
    // its assigned color.
    let welcome = ServerMessage::Welcome {
        id,
        world_radius: WORLD_RADIUS,
        color,
    };
    match serde_json::to_string(&welcome) {
        Ok(json) => {
            if sender.send(Message::Text(json.into())).await.is_err() {
                cleanup(&state, id).await;
                return;
            }
        }
        Err(err) => {
            warn!(conn = id, %err, "failed to encode welcome");
            cleanup(&state, id).await;
            return;
        }
    }

    // Drain the outbox into the socket; the simulation only ever pushes into
    // the channel, so its tick never waits on this socket.
    let forward_task = tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop: buffer the latest input sample, handle join/respawn. A
    // malformed payload is dropped without touching the simulation.
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join { name }) | Ok(ClientMessage::Respawn { name }) => {
                    join(&state, &conn, &name).await;
                }
                Ok(ClientMessage::Input { angle, boost }) => {
                    conn.set_input(angle, boost != 0);
                }
                Err(err) => {
                    debug!(conn = id, %err, "dropping malformed message");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    forward_task.abort();
    cleanup(&state, id).await;
    info!(conn = id, "player disconnected");
}

/// Create or replace the snake for a connection. An existing live snake is
/// converted to food before the replacement spawns.
async fn join(state: &WsState, conn: &Conn, name: &str) {
    let trimmed = name.trim();
    let display_name: String = if trimmed.is_empty() {
        "Player".to_string()
    } else {
        trimmed.chars().take(MAX_NAME_LEN).collect()
    };

    let mut world = state.world.write().await;
    world.convert_to_food(conn.id);
    world.remove_snake(conn.id);
    world.add_snake(Snake::spawn(conn.id, display_name.clone(), conn.color.clone()));
    info!(conn = conn.id, name = %display_name, "snake joined");
}

async fn cleanup(state: &WsState, id: u64) {
    state.conns.remove(id);
    let mut world = state.world.write().await;
    world.convert_to_food(id);
    world.remove_snake(id);
}
