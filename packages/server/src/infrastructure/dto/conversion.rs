//! Conversion logic between domain entities and DTOs.

use shelftalk_shared::time::timestamp_to_rfc3339;

use crate::domain::{Chat, Message, Notification, OutboundEvent, RejectReason, UserId};
use crate::infrastructure::dto::{
    http::{ChatSummaryDto, ErrorBody, ErrorCode, MessageDto, NotificationDto},
    websocket::{AuthenticatedPayload, ChatReadPayload, ChatRefPayload, ServerEvent},
};

impl From<Message> for MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.into_string(),
            chat_id: model.chat_id.into_string(),
            sender: model.sender.into_string(),
            recipient: model.recipient.into_string(),
            content: model.content.into_string(),
            read: model.read,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<Notification> for NotificationDto {
    fn from(model: Notification) -> Self {
        Self {
            id: model.id.into_string(),
            kind: model.kind.as_str().to_string(),
            from_user: model.from_user.map(UserId::into_string),
            book_id: model.book_id,
            chat_id: model.chat_id.map(|id| id.into_string()),
            message: model.message,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<RejectReason> for ErrorCode {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::Unauthenticated => Self::Unauthenticated,
            RejectReason::EmptyMessage => Self::EmptyMessage,
            RejectReason::MessageTooLong => Self::MessageTooLong,
            RejectReason::ChatNotFound => Self::ChatNotFound,
            RejectReason::NotParticipant => Self::NotParticipant,
            RejectReason::InvalidRecipient => Self::InvalidRecipient,
            RejectReason::InvalidPayload => Self::InvalidPayload,
            RejectReason::PersistenceFailure => Self::PersistenceFailure,
        }
    }
}

impl From<&OutboundEvent> for ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::Authenticated { connection, user } => {
                Self::Authenticated(AuthenticatedPayload {
                    connection_id: connection.to_string(),
                    user_id: user.to_string(),
                })
            }
            OutboundEvent::ChatJoined(chat) => Self::ChatJoined(ChatRefPayload {
                chat_id: chat.to_string(),
            }),
            OutboundEvent::ChatLeft(chat) => Self::ChatLeft(ChatRefPayload {
                chat_id: chat.to_string(),
            }),
            OutboundEvent::NewMessage(message) => Self::NewMessage(message.clone().into()),
            OutboundEvent::Notification(notification) => {
                Self::Notification(notification.clone().into())
            }
            OutboundEvent::ChatRead {
                chat,
                reader,
                updated,
            } => Self::ChatRead(ChatReadPayload {
                chat_id: chat.to_string(),
                user_id: reader.to_string(),
                updated: *updated,
            }),
            OutboundEvent::Rejected { reason, detail } => Self::Error(ErrorBody {
                code: (*reason).into(),
                message: detail.clone(),
            }),
        }
    }
}

impl ChatSummaryDto {
    /// Summarise `chat` from the point of view of `viewer`.
    pub fn for_viewer(chat: &Chat, viewer: &UserId) -> Self {
        Self {
            id: chat.id.to_string(),
            participants: chat
                .participants
                .users()
                .iter()
                .map(|user| user.to_string())
                .collect(),
            last_message_id: chat.last_message.as_ref().map(|id| id.to_string()),
            unread_count: chat.unread_for(viewer),
            created_at: timestamp_to_rfc3339(chat.created_at.value()),
            updated_at: timestamp_to_rfc3339(chat.updated_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageContent, NotificationKind, ParticipantPair, Timestamp};

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_domain_message_to_dto() {
        // テスト項目: ドメインの Message が DTO に変換される
        // given (前提条件):
        let chat_id = ChatId::new("chat-1".to_string()).unwrap();
        let message = Message::new(
            chat_id,
            user("alice"),
            user("bob"),
            MessageContent::new("hello".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        );
        let id = message.id.to_string();

        // when (操作):
        let dto: MessageDto = message.into();

        // then (期待する結果):
        assert_eq!(dto.id, id);
        assert_eq!(dto.chat_id, "chat-1");
        assert_eq!(dto.sender, "alice");
        assert_eq!(dto.recipient, "bob");
        assert_eq!(dto.content, "hello");
        assert!(!dto.read);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_chat_summary_uses_viewer_unread_count() {
        // テスト項目: チャット概要の未読数は閲覧者のものになる
        // given (前提条件):
        let mut chat = Chat::new(
            ChatId::new("chat-1".to_string()).unwrap(),
            ParticipantPair::new(user("bob"), user("alice")).unwrap(),
            Timestamp::new(0),
        );
        let message = Message::new(
            chat.id.clone(),
            user("alice"),
            user("bob"),
            MessageContent::new("hello".to_string()).unwrap(),
            Timestamp::new(10),
        );
        chat.record_message(&message);

        // when (操作):
        let for_bob = ChatSummaryDto::for_viewer(&chat, &user("bob"));
        let for_alice = ChatSummaryDto::for_viewer(&chat, &user("alice"));

        // then (期待する結果):
        assert_eq!(for_bob.unread_count, 1);
        assert_eq!(for_alice.unread_count, 0);
        assert_eq!(for_bob.participants, vec!["alice", "bob"]);
        assert_eq!(for_bob.last_message_id, Some(message.id.to_string()));
    }

    #[test]
    fn test_rejected_event_to_server_error() {
        // テスト項目: 拒否イベントが error イベントに変換される
        // given (前提条件):
        let event = OutboundEvent::Rejected {
            reason: RejectReason::NotParticipant,
            detail: "not a participant of chat-1".to_string(),
        };

        // when (操作):
        let server_event = ServerEvent::from(&event);

        // then (期待する結果):
        assert_eq!(
            server_event,
            ServerEvent::error(ErrorCode::NotParticipant, "not a participant of chat-1")
        );
    }

    #[test]
    fn test_notification_to_dto_omits_empty_fields() {
        // テスト項目: 未設定の項目はシリアライズされない
        // given (前提条件):
        let notification = Notification::new(
            NotificationKind::new("follow".to_string()).unwrap(),
            Timestamp::new(0),
        );

        // when (操作):
        let dto: NotificationDto = notification.into();
        let json = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "follow");
        assert!(json.get("fromUser").is_none());
        assert!(json.get("chatId").is_none());
    }
}
