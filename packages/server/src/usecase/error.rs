//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{PresenceError, RejectReason, StoreError, ValueObjectError};

/// 接続のライフサイクル操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("connection is not authenticated")]
    Unauthenticated,

    #[error("connection '{0}' is not live")]
    UnknownConnection(String),
}

impl From<PresenceError> for SessionError {
    fn from(e: PresenceError) -> Self {
        match e {
            PresenceError::Unauthenticated => Self::Unauthenticated,
            PresenceError::UnknownConnection(id) => Self::UnknownConnection(id),
        }
    }
}

/// チャットへの参加・退出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinChatError {
    #[error("connection is not authenticated")]
    Unauthenticated,

    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("user is not a participant of chat '{0}'")]
    NotParticipant(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<PresenceError> for JoinChatError {
    fn from(_: PresenceError) -> Self {
        // 切断済みの接続も未認証として扱う
        Self::Unauthenticated
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("connection is not authenticated")]
    Unauthenticated,

    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("message content must be at most {0} characters")]
    MessageTooLong(usize),

    #[error("chat '{0}' not found and no recipient given")]
    ChatNotFound(String),

    #[error("user is not a participant of chat '{0}'")]
    NotParticipant(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// ストアのエラー（リトライ可能）。この場合メッセージは配信されていない。
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<ValueObjectError> for SendMessageError {
    fn from(e: ValueObjectError) -> Self {
        match e {
            ValueObjectError::EmptyMessage => Self::EmptyMessage,
            ValueObjectError::MessageTooLong(max) => Self::MessageTooLong(max),
            other => Self::InvalidRecipient(other.to_string()),
        }
    }
}

impl From<StoreError> for SendMessageError {
    fn from(e: StoreError) -> Self {
        Self::PersistenceFailure(e.to_string())
    }
}

/// 既読化のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkAsReadError {
    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("user is not a participant of chat '{0}'")]
    NotParticipant(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for MarkAsReadError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ChatNotFound(id) => Self::ChatNotFound(id),
            other => Self::PersistenceFailure(other.to_string()),
        }
    }
}

/// 参照系（チャット一覧・履歴）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("chat '{0}' not found")]
    ChatNotFound(String),

    #[error("user is not a participant of chat '{0}'")]
    NotParticipant(String),

    #[error("unknown history cursor '{0}'")]
    UnknownCursor(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ChatNotFound(id) => Self::ChatNotFound(id),
            StoreError::MessageNotFound(id) => Self::UnknownCursor(id),
            other => Self::PersistenceFailure(other.to_string()),
        }
    }
}

impl SessionError {
    pub fn reason(&self) -> RejectReason {
        RejectReason::Unauthenticated
    }
}

impl JoinChatError {
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::Unauthenticated => RejectReason::Unauthenticated,
            Self::ChatNotFound(_) => RejectReason::ChatNotFound,
            Self::NotParticipant(_) => RejectReason::NotParticipant,
            Self::PersistenceFailure(_) => RejectReason::PersistenceFailure,
        }
    }
}

impl SendMessageError {
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::Unauthenticated => RejectReason::Unauthenticated,
            Self::EmptyMessage => RejectReason::EmptyMessage,
            Self::MessageTooLong(_) => RejectReason::MessageTooLong,
            Self::ChatNotFound(_) => RejectReason::ChatNotFound,
            Self::NotParticipant(_) => RejectReason::NotParticipant,
            Self::InvalidRecipient(_) => RejectReason::InvalidRecipient,
            Self::PersistenceFailure(_) => RejectReason::PersistenceFailure,
        }
    }
}

impl MarkAsReadError {
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::ChatNotFound(_) => RejectReason::ChatNotFound,
            Self::NotParticipant(_) => RejectReason::NotParticipant,
            Self::PersistenceFailure(_) => RejectReason::PersistenceFailure,
        }
    }
}

impl QueryError {
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::ChatNotFound(_) => RejectReason::ChatNotFound,
            Self::NotParticipant(_) => RejectReason::NotParticipant,
            Self::UnknownCursor(_) => RejectReason::InvalidPayload,
            Self::PersistenceFailure(_) => RejectReason::PersistenceFailure,
        }
    }
}
