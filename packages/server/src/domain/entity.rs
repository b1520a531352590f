//! エンティティ定義
//!
//! - `Chat`: 2 者間の会話と参加者ごとの未読数
//! - `Message`: 永続化後は不変のメッセージ（既読フラグのみ変更可能）
//! - `Notification`: チャット以外のリアルタイム通知

use std::collections::HashMap;

use super::{
    error::ValueObjectError,
    value_object::{
        ChatId, MessageContent, MessageId, NotificationId, ParticipantPair, Timestamp, UserId,
    },
};

/// 2 者間チャット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub participants: ParticipantPair,
    pub last_message: Option<MessageId>,
    /// 参加者ごとの未読数（エントリがない参加者は 0）
    unread: HashMap<UserId, u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Chat {
    pub fn new(id: ChatId, participants: ParticipantPair, created_at: Timestamp) -> Self {
        Self {
            id,
            participants,
            last_message: None,
            unread: HashMap::new(),
            created_at,
            updated_at: created_at,
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    pub fn other_participant(&self, user: &UserId) -> Option<&UserId> {
        self.participants.other(user)
    }

    pub fn unread_for(&self, user: &UserId) -> u32 {
        self.unread.get(user).copied().unwrap_or(0)
    }

    /// メッセージの追記を反映する
    ///
    /// 受信者の未読数のみを 1 増やし、送信者の未読数は変更しません。
    pub fn record_message(&mut self, message: &Message) {
        *self.unread.entry(message.recipient.clone()).or_insert(0) += 1;
        self.last_message = Some(message.id.clone());
        self.updated_at = message.created_at;
    }

    /// `user` の未読数を 0 にする
    pub fn reset_unread(&mut self, user: &UserId) {
        self.unread.insert(user.clone(), 0);
    }
}

/// 永続化されたチャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: UserId,
    pub recipient: UserId,
    pub content: MessageContent,
    pub read: bool,
    pub created_at: Timestamp,
}

impl Message {
    /// 未読状態の新しいメッセージを作成
    pub fn new(
        chat_id: ChatId,
        sender: UserId,
        recipient: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            chat_id,
            sender,
            recipient,
            content,
            read: false,
            created_at,
        }
    }

    /// `reader` 宛ての未読メッセージなら既読にする（変更した場合 `true`）
    pub fn mark_read_by(&mut self, reader: &UserId) -> bool {
        if self.read || &self.recipient != reader {
            return false;
        }
        self.read = true;
        true
    }
}

/// 通知の種類（"like", "follow", "new_chat" など）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationKind(String);

impl NotificationKind {
    pub const NEW_CHAT: &'static str = "new_chat";

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyNotificationKind);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn new_chat() -> Self {
        Self(Self::NEW_CHAT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 単一ユーザーに配信される通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub from_user: Option<UserId>,
    pub book_id: Option<String>,
    pub chat_id: Option<ChatId>,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn new(kind: NotificationKind, created_at: Timestamp) -> Self {
        Self {
            id: NotificationId::generate(),
            kind,
            from_user: None,
            book_id: None,
            chat_id: None,
            message: None,
            created_at,
        }
    }

    /// 新しいチャットが作成されたことを受信者に知らせる通知
    pub fn new_chat(chat_id: ChatId, from_user: UserId, created_at: Timestamp) -> Self {
        Self {
            from_user: Some(from_user),
            chat_id: Some(chat_id),
            ..Self::new(NotificationKind::new_chat(), created_at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn chat_between(a: &str, b: &str) -> Chat {
        Chat::new(
            ChatId::generate(),
            ParticipantPair::new(user(a), user(b)).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn message_in(chat: &Chat, from: &str, to: &str, at: i64) -> Message {
        Message::new(
            chat.id.clone(),
            user(from),
            user(to),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(at),
        )
    }

    #[test]
    fn test_record_message_increments_recipient_only() {
        // テスト項目: メッセージ追記で受信者の未読数のみが 1 増える
        // given (前提条件):
        let mut chat = chat_between("alice", "bob");
        let message = message_in(&chat, "alice", "bob", 2000);

        // when (操作):
        chat.record_message(&message);

        // then (期待する結果):
        assert_eq!(chat.unread_for(&user("bob")), 1);
        assert_eq!(chat.unread_for(&user("alice")), 0);
        assert_eq!(chat.last_message, Some(message.id.clone()));
        assert_eq!(chat.updated_at, Timestamp::new(2000));
    }

    #[test]
    fn test_reset_unread() {
        // テスト項目: 未読数のリセットは指定ユーザーのみに作用する
        // given (前提条件):
        let mut chat = chat_between("alice", "bob");
        let to_bob = message_in(&chat, "alice", "bob", 2000);
        let to_alice = message_in(&chat, "bob", "alice", 3000);
        chat.record_message(&to_bob);
        chat.record_message(&to_alice);

        // when (操作):
        chat.reset_unread(&user("bob"));

        // then (期待する結果):
        assert_eq!(chat.unread_for(&user("bob")), 0);
        assert_eq!(chat.unread_for(&user("alice")), 1);
    }

    #[test]
    fn test_mark_read_by_only_affects_recipient() {
        // テスト項目: 既読化は受信者による場合のみ、かつ一度だけ行われる
        // given (前提条件):
        let chat = chat_between("alice", "bob");
        let mut message = message_in(&chat, "alice", "bob", 2000);

        // when (操作):
        let by_sender = message.mark_read_by(&user("alice"));
        let by_recipient = message.mark_read_by(&user("bob"));
        let again = message.mark_read_by(&user("bob"));

        // then (期待する結果):
        assert!(!by_sender);
        assert!(by_recipient);
        assert!(!again);
        assert!(message.read);
    }

    #[test]
    fn test_new_chat_notification() {
        // テスト項目: new_chat 通知に送信者とチャット ID が設定される
        // given (前提条件):
        let chat_id = ChatId::generate();

        // when (操作):
        let notification = Notification::new_chat(chat_id.clone(), user("alice"), Timestamp::new(5));

        // then (期待する結果):
        assert_eq!(notification.kind.as_str(), NotificationKind::NEW_CHAT);
        assert_eq!(notification.chat_id, Some(chat_id));
        assert_eq!(notification.from_user, Some(user("alice")));
    }
}
