mod dispatcher;
mod registry;
mod server;
mod socket;

use crate::server::Server;
use crate::socket::websocket_handler;
use axum::Router;
use axum::routing::get;
use engine::pack::load_packs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
/// Activates tracing, loads the pack descriptors, then serves the
/// WebSocket endpoint on `0.0.0.0:$PORT`.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let port = std::env::var("PORT").expect("the PORT environment variable must be set");

    // The pack directories live next to the pack crates at the workspace
    // root; resolve them from the manifest so the working directory does
    // not matter.
    let packs_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../packs");
    let packs = match load_packs(
        &packs_dir,
        vec![
            ("standard", standard_pack::content()),
            ("checkers", checkers_pack::content()),
            ("party", party_pack::content()),
        ],
    ) {
        Ok(packs) => packs,
        Err(error) => {
            tracing::error!(%error, "Initial pack load error.");
            panic!("Initial pack load error: {error}");
        }
    };

    let server = Server::new(packs);

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(server);

    let address = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap();
    tracing::info!(address, "Serving.");

    axum::serve(listener, app).await.unwrap();
}
