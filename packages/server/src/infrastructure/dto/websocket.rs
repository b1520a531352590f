//! WebSocket event DTOs.
//!
//! Every frame is a JSON text frame of the form
//! `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

use super::http::{ErrorBody, ErrorCode, MessageDto, NotificationDto};

/// client → server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Authenticate(AuthenticatePayload),
    JoinChat(ChatRefPayload),
    LeaveChat(ChatRefPayload),
    SendMessage(SendMessagePayload),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate(_) => "authenticate",
            Self::JoinChat(_) => "join_chat",
            Self::LeaveChat(_) => "leave_chat",
            Self::SendMessage(_) => "send_message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatePayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRefPayload {
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
    pub content: String,
}

/// server → client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Authenticated(AuthenticatedPayload),
    ChatJoined(ChatRefPayload),
    ChatLeft(ChatRefPayload),
    NewMessage(MessageDto),
    Notification(NotificationDto),
    ChatRead(ChatReadPayload),
    Error(ErrorBody),
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorBody {
            code,
            message: message.into(),
        })
    }

    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize server event: {}", e);
            String::from(r#"{"event":"error","data":{"code":"invalid_payload","message":"serialization failure"}}"#)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedPayload {
    pub connection_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReadPayload {
    pub chat_id: String,
    pub user_id: String,
    pub updated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_message_without_chat_id() {
        // テスト項目: chatId を省略した send_message をパースできる
        // given (前提条件):
        let raw = r#"{"event":"send_message","data":{"recipientId":"bob","content":"hi"}}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::SendMessage(SendMessagePayload {
                chat_id: None,
                recipient_id: Some("bob".to_string()),
                content: "hi".to_string(),
            })
        );
        assert_eq!(event.name(), "send_message");
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        // テスト項目: 未知のイベント名はパースエラーになる
        // given (前提条件):
        let raw = r#"{"event":"reading_status","data":{"bookId":"b1"}}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_server_error_event_shape() {
        // テスト項目: error イベントが envelope 形式でシリアライズされる
        // given (前提条件):
        let event = ServerEvent::error(ErrorCode::Unauthenticated, "authenticate first");

        // when (操作):
        let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "event": "error",
                "data": {"code": "unauthenticated", "message": "authenticate first"}
            })
        );
    }
}
