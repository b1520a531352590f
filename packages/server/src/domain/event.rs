//! 接続へ送信されるイベント
//!
//! ワイヤ形式への変換は Infrastructure 層（`MessagePusher` 実装）が行います。

use super::{
    entity::{Message, Notification},
    value_object::{ChatId, ConnectionId, UserId},
};

/// イベントを拒否した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Unauthenticated,
    EmptyMessage,
    MessageTooLong,
    ChatNotFound,
    NotParticipant,
    InvalidRecipient,
    InvalidPayload,
    PersistenceFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    Authenticated {
        connection: ConnectionId,
        user: UserId,
    },
    ChatJoined(ChatId),
    ChatLeft(ChatId),
    NewMessage(Message),
    Notification(Notification),
    ChatRead {
        chat: ChatId,
        reader: UserId,
        updated: usize,
    },
    Rejected {
        reason: RejectReason,
        detail: String,
    },
}
