//! WebSocket connection handlers.
//!
//! Each socket is split into a receive loop, which decodes `ClientEvent`s and
//! dispatches them by event name, and a pusher loop, which drains the
//! connection's outbound queue into the socket.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatId, ConnectionId, MessagePusher, OutboundEvent, RejectReason, UserId},
    infrastructure::dto::websocket::{ClientEvent, SendMessagePayload},
    ui::state::AppState,
};

/// Why an inbound event was refused
type Rejection = (RejectReason, String);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Outbound queue of this connection
/// * `sender` - WebSocket sink of this connection
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Handshake: the connection starts unauthenticated
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = state.connect_session_usecase.open(tx).await;

    let state_clone = state.clone();
    let connection_clone = connection.clone();

    // Inbound events are processed in arrival order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&state_clone, &connection_clone, text.as_str()).await
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_session_usecase
        .execute(&connection)
        .await;
}

/// Decode one text frame and dispatch it; refusals are answered with an `error` event.
async fn handle_text(state: &AppState, connection: &ConnectionId, text: &str) {
    let result = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => {
            tracing::debug!("Connection '{}' sent '{}'", connection, event.name());
            dispatch(state, connection, event).await
        }
        Err(e) => {
            tracing::warn!("Malformed event from '{}': {}", connection, e);
            Err((RejectReason::InvalidPayload, e.to_string()))
        }
    };

    if let Err((reason, detail)) = result {
        let event = OutboundEvent::Rejected { reason, detail };
        if let Err(e) = state.message_pusher.push_to(connection, &event).await {
            tracing::warn!("Failed to send error to '{}': {}", connection, e);
        }
    }
}

async fn dispatch(
    state: &AppState,
    connection: &ConnectionId,
    event: ClientEvent,
) -> Result<(), Rejection> {
    match event {
        ClientEvent::Authenticate(payload) => {
            let user = UserId::new(payload.user_id).map_err(invalid_payload)?;
            state
                .connect_session_usecase
                .authenticate(connection, user)
                .await
                .map_err(|e| (e.reason(), e.to_string()))?;
        }
        ClientEvent::JoinChat(payload) => {
            let chat_id = ChatId::new(payload.chat_id).map_err(invalid_payload)?;
            state
                .view_chat_usecase
                .join(connection, chat_id)
                .await
                .map_err(|e| (e.reason(), e.to_string()))?;
        }
        ClientEvent::LeaveChat(payload) => {
            let chat_id = ChatId::new(payload.chat_id).map_err(invalid_payload)?;
            state
                .view_chat_usecase
                .leave(connection, chat_id)
                .await
                .map_err(|e| (e.reason(), e.to_string()))?;
        }
        ClientEvent::SendMessage(SendMessagePayload {
            chat_id,
            recipient_id,
            content,
        }) => {
            let recipient = recipient_id
                .map(UserId::new)
                .transpose()
                .map_err(|e| (RejectReason::InvalidRecipient, e.to_string()))?;
            let chat_id = chat_id
                .map(ChatId::new)
                .transpose()
                .map_err(invalid_payload)?;
            // The sender's own connections receive the message through fan-out
            state
                .send_message_usecase
                .execute_on_connection(connection, recipient, chat_id, content)
                .await
                .map_err(|e| (e.reason(), e.to_string()))?;
        }
    }
    Ok(())
}

fn invalid_payload(e: impl std::fmt::Display) -> Rejection {
    (RejectReason::InvalidPayload, e.to_string())
}
