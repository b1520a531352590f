//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object 生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id must be at most {0} characters")]
    UserIdTooLong(usize),

    #[error("user id '{0}' must not contain whitespace")]
    InvalidUserId(String),

    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("chat id must not be empty")]
    EmptyChatId,

    #[error("message id must not be empty")]
    EmptyMessageId,

    #[error("notification id must not be empty")]
    EmptyNotificationId,

    #[error("notification type must not be empty")]
    EmptyNotificationKind,

    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("message content must be at most {0} characters")]
    MessageTooLong(usize),

    #[error("user '{0}' cannot chat with themselves")]
    SelfChat(String),
}

/// チャットストア（永続化コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 同じ参加者ペアのチャットが既に存在する（find-or-create の競合）
    #[error("a chat between these participants already exists")]
    DuplicateChat,

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    /// ページングのカーソルに指定されたメッセージがチャット内に存在しない
    #[error("message '{0}' not found in chat")]
    MessageNotFound(String),

    /// ストレージが利用できない（リトライ可能）
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// 接続のライフサイクルに関するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// 未認証の接続からのイベント
    #[error("connection is not authenticated")]
    Unauthenticated,

    #[error("connection '{0}' is not live")]
    UnknownConnection(String),
}

/// メッセージ送信（プッシュ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}
