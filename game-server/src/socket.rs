//! WebSocket plumbing: the upgrade endpoint, the handshake's display-name
//! resolution, and the paired reader/writer tasks per socket. When either
//! task completes the other is aborted and the connection record is marked
//! inactive for a later reconnect.

use crate::server::Server;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::Connection;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Upgrades the request to a WebSocket. The `display_name` query parameter
/// selects the identity; its absence is a protocol error.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<HashMap<String, String>>,
    State(server): State<Arc<Server>>,
) -> Response {
    let Some(display_name) = query
        .get("display_name")
        .filter(|name| !name.is_empty())
        .cloned()
    else {
        return (
            StatusCode::BAD_REQUEST,
            "The display_name query parameter is required.",
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| websocket(socket, server, display_name))
}

/// Does the whole handling from accept to close: resolve the connection
/// record, greet the client, pump frames in both directions, then detach.
async fn websocket(stream: WebSocket, server: Arc<Server>, display_name: String) {
    // By splitting, we can send and receive at the same time.
    let (sender, receiver) = stream.split();
    let (outbound, outbound_rx) = unbounded_channel();

    let connection = server.registry.attach(&display_name, outbound);
    tracing::info!(display_name = connection.display_name(), "Client connected.");
    server.on_connect(&connection).await;

    let mut send_task = tokio::spawn(write_outbound(sender, outbound_rx));
    let mut receive_task = tokio::spawn(read_inbound(
        receiver,
        server.clone(),
        connection.clone(),
    ));

    // If any one of the tasks runs to completion, we abort the other.
    tokio::select! {
        _ = &mut send_task => { receive_task.abort(); }
        _ = &mut receive_task => { send_task.abort(); }
    }

    server.on_disconnect(&connection).await;
    tracing::info!(
        display_name = connection.display_name(),
        "Client disconnected."
    );
}

/// Drains the connection's outbound queue onto the socket, preserving the
/// order the session kernel emitted the frames in.
async fn write_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: UnboundedReceiver<String>,
) {
    while let Some(frame) = outbound.recv().await {
        if sender.send(Message::Text(frame.into())).await.is_err() {
            // Connection lost; the reader side tears the session down.
            return;
        }
    }
}

/// Feeds inbound text frames to the dispatcher. Transport errors end the
/// session silently; the record survives for a reconnect.
async fn read_inbound(
    mut receiver: SplitStream<WebSocket>,
    server: Arc<Server>,
    connection: Arc<Connection>,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                tracing::debug!(frame = text.as_str(), "Received frame.");
                server.handle_frame(&connection, text.as_str()).await;
            }
            Ok(Message::Close(_)) => return,
            Ok(_) => {} // Ignore ping/pong and binary noise.
            Err(_) => return,
        }
    }
}
