//! HTTP API endpoint handlers.
//!
//! The caller's identity is injected by the auth collaborator in front of this
//! server through the `x-user-id` header.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
};
use shelftalk_shared::time::Clock;

use crate::{
    domain::{ChatId, MessageId, Notification, NotificationKind, RejectReason, Timestamp, UserId},
    infrastructure::dto::http::{
        ChatSummaryDto, MarkReadResponse, MessageDto, MessagesQuery, NotificationAccepted,
        NotificationRequest, PresenceDto, SendMessageRequest,
    },
    ui::{error::ApiError, state::AppState},
};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity asserted by the auth collaborator.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::new(RejectReason::Unauthenticated, "missing x-user-id"))?;
        let value = header
            .to_str()
            .map_err(|_| ApiError::new(RejectReason::Unauthenticated, "malformed x-user-id"))?;
        UserId::new(value.to_string())
            .map(Self)
            .map_err(|e| ApiError::new(RejectReason::Unauthenticated, e.to_string()))
    }
}

fn invalid_payload(e: impl std::fmt::Display) -> ApiError {
    ApiError::new(RejectReason::InvalidPayload, e.to_string())
}

fn parse_chat_id(raw: String) -> Result<ChatId, ApiError> {
    ChatId::new(raw).map_err(invalid_payload)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Chats of the caller, most recently updated first
pub async fn get_chats(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<ChatSummaryDto>>, ApiError> {
    let chats = state.get_chats_usecase.execute(&user).await?;

    // Domain Model から DTO への変換
    let summaries = chats
        .iter()
        .map(|chat| ChatSummaryDto::for_viewer(chat, &user))
        .collect();
    Ok(Json(summaries))
}

/// One page of a chat's history in chronological order
pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(chat_id): Path<String>,
    query: Result<Query<MessagesQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let Query(query) = query.map_err(invalid_payload)?;
    let chat_id = parse_chat_id(chat_id)?;
    let before = query
        .before
        .map(MessageId::new)
        .transpose()
        .map_err(invalid_payload)?;

    let messages = state
        .get_chat_messages_usecase
        .execute(&chat_id, &user, before, query.limit)
        .await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

/// Send a message and return the persisted copy
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(sender): AuthenticatedUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let Json(request) = body.map_err(invalid_payload)?;
    let recipient = request
        .recipient_id
        .map(UserId::new)
        .transpose()
        .map_err(|e| ApiError::new(RejectReason::InvalidRecipient, e.to_string()))?;
    let chat_id = request.chat_id.map(parse_chat_id).transpose()?;

    let sent = state
        .send_message_usecase
        .execute(sender, recipient, chat_id, request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(sent.message.into())))
}

/// Mark every message addressed to the caller as read
pub async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(reader): AuthenticatedUser,
    Path(chat_id): Path<String>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let chat_id = parse_chat_id(chat_id)?;
    let updated = state.mark_as_read_usecase.execute(&chat_id, &reader).await?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

/// Push a social notification (like, follow, ...) to a user's live connections
///
/// `fromUser` defaults to the caller.
pub async fn post_notification(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(caller): AuthenticatedUser,
    body: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NotificationAccepted>), ApiError> {
    let Json(request) = body.map_err(invalid_payload)?;
    let recipient = UserId::new(request.user_id)
        .map_err(|e| ApiError::new(RejectReason::InvalidRecipient, e.to_string()))?;
    let kind = NotificationKind::new(request.kind).map_err(invalid_payload)?;
    let from_user = match request.from_user {
        Some(from) => UserId::new(from).map_err(invalid_payload)?,
        None => caller,
    };

    let notification = Notification {
        from_user: Some(from_user),
        book_id: request.book_id,
        message: request.message,
        ..Notification::new(kind, Timestamp::new(state.clock.now_millis()))
    };
    let id = notification.id.to_string();
    let delivered = state
        .dispatch_notification_usecase
        .execute(&recipient, notification)
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(NotificationAccepted { id, delivered }),
    ))
}

/// Whether a user currently has live connections
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_): AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<PresenceDto>, ApiError> {
    let user = UserId::new(user_id).map_err(invalid_payload)?;
    let presence = state.get_presence_usecase.execute(user).await;
    Ok(Json(PresenceDto {
        user_id: presence.user.into_string(),
        online: presence.online,
        connections: presence.connections,
    }))
}
