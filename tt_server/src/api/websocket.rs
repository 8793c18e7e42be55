//! WebSocket handler seating players in the session.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server creates an outbox for the connection and asks the session for a
//!    seat; `initial_state` is the first frame the client receives
//! 3. Server spawns a send task draining the outbox onto the socket
//! 4. The receive loop forwards decoded frames to the session
//! 5. When either side stops, the session is told exactly once
//!
//! # Client Messages
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === 'game_started' || data.type === 'turn_update') {
//!     highlightTurn(data.turn);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: "move", move: "e4" }));
//! ```
//!
//! Frames that are not valid JSON, binary frames and unknown message types
//! are dropped without a reply.

use axum::{
    extract::{
        Extension, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use turn_table::{ClientMessage, Connection};

use super::{AppState, request_id::RequestId};
use crate::{logging, metrics};

/// Upgrade HTTP connection to WebSocket and join the session.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(request_id): Extension<RequestId>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, request_id, state))
}

/// Handle an established WebSocket connection.
///
/// The connection's outbox is created before it is seated, so nothing the
/// session sends can be missed. The send task ends when the socket write
/// fails or the session drops the outbox; either way the receive loop stops
/// too and the disconnect is reported once.
async fn handle_socket(socket: WebSocket, request_id: RequestId, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut outbox) = Connection::channel(state.outbox_capacity);
    let connection_id = connection.id();
    let conn_label = connection_id.to_string();

    let player = match state.session.connect(connection).await {
        Ok(player) => player,
        Err(e) => {
            error!(
                "Session unavailable for connection {} (request {}): {}",
                connection_id,
                request_id.as_str(),
                e
            );
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let player_label = player.to_string();
    logging::log_connection_event("connected", &conn_label, Some(&player_label));
    metrics::websocket_connected();

    // Drain the outbox onto the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let json = match message.to_json() {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize {}: {}", message.kind(), e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent(message.kind());
        }

        let _ = sender.close().await;
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        metrics::websocket_messages_received();

                        let message = match ClientMessage::from_json(text.as_str()) {
                            Ok(message) => message,
                            Err(e) => {
                                metrics::websocket_messages_rejected("malformed");
                                logging::log_rejected_message(
                                    &conn_label,
                                    "malformed",
                                    &e.to_string(),
                                );
                                continue;
                            }
                        };

                        if state.session.submit(connection_id, message).await.is_err() {
                            warn!("Session closed while {} was connected", player);
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        metrics::websocket_messages_rejected("binary");
                        logging::log_rejected_message(
                            &conn_label,
                            "binary",
                            "binary frames are not supported",
                        );
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket closed by {}", player);
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", player, e);
                        break;
                    }
                    // Ping/pong are answered by axum.
                    Some(Ok(_)) => {}
                }
            }
            _ = &mut send_task => {
                info!("Outgoing stream for {} ended", player);
                break;
            }
        }
    }

    send_task.abort();

    if state.session.disconnect(connection_id).await.is_err() {
        warn!("Session closed before {} could be removed", player);
    }

    metrics::websocket_disconnected();
    logging::log_connection_event("disconnected", &conn_label, Some(&player_label));
}
