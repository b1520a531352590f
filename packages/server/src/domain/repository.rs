//! Repository trait 定義
//!
//! ドメイン層が必要とする永続化コラボレーターのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 同一チャットに対する「メッセージ追記 + 未読数の加算 + 最終メッセージ更新」は
//! ストア側の 1 回のアトミックな操作として提供されます。プロセス内のロックではなく
//! ストアが整合性の根拠です（複数プロセスから参照される可能性があるため）。

use async_trait::async_trait;

use super::{Chat, ChatId, Message, MessageId, ParticipantPair, StoreError, UserId};

/// Chat Store trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// ID でチャットを取得
    async fn find_chat(&self, chat_id: &ChatId) -> Result<Option<Chat>, StoreError>;

    /// 参加者ペアでチャットを取得
    async fn find_chat_between(
        &self,
        participants: &ParticipantPair,
    ) -> Result<Option<Chat>, StoreError>;

    /// チャットを作成
    ///
    /// 同じ参加者ペアのチャットが既に存在する場合は `StoreError::DuplicateChat`。
    async fn insert_chat(&self, chat: Chat) -> Result<Chat, StoreError>;

    /// メッセージを追記し、更新後のチャットを返す（アトミック）
    ///
    /// 受信者の未読数の加算と最終メッセージの更新を同時に行う。
    async fn append_message(&self, message: Message) -> Result<Chat, StoreError>;

    /// `reader` 宛ての未読メッセージを既読にし、未読数を 0 にする（アトミック）
    ///
    /// 既読にしたメッセージ数を返す。
    async fn mark_read(&self, chat_id: &ChatId, reader: &UserId) -> Result<usize, StoreError>;

    /// `user` が参加しているチャット（更新日時の新しい順）
    async fn chats_for(&self, user: &UserId) -> Result<Vec<Chat>, StoreError>;

    /// チャットのメッセージを新しい順に最大 `limit` 件取得
    ///
    /// `before` が指定された場合、そのメッセージより前に追記されたメッセージのみ
    /// （同一時刻のメッセージも取りこぼさないよう、時刻ではなく追記順で区切る）。
    /// チャット内に存在しない場合は `StoreError::MessageNotFound`。
    async fn recent_messages(
        &self,
        chat_id: &ChatId,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;
}
