mod config;
mod game;
mod protocol;
mod server;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::{SERVER_PORT, TICK_RATE, WORLD_RADIUS};
use crate::game::engine::{self, GameLoop};
use crate::server::conn::ConnManager;
use crate::server::ws;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let world = engine::create_world();
    let conns = Arc::new(ConnManager::new());

    let game_loop = GameLoop::new(world.clone(), conns.clone());
    tokio::spawn(game_loop.run());

    let ws_state = ws::WsState { world, conns };
    let app = Router::new()
        .route("/ws", get(ws::ws_handler).with_state(ws_state))
        .fallback_service(ServeDir::new("static"));

    let addr = format!("0.0.0.0:{SERVER_PORT}");
    info!(%addr, world_radius = WORLD_RADIUS, tick_rate = TICK_RATE, "server listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind server port");
    axum::serve(listener, app).await.expect("server error");
}
