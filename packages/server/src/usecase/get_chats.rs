//! UseCase: チャット一覧・メッセージ履歴の取得
//!
//! オフライン中に届いたメッセージは、ここでの履歴取得によって受け取られます。

use std::sync::Arc;

use crate::domain::{Chat, ChatId, ChatStore, Message, MessageId, UserId};

use super::error::QueryError;

/// 履歴取得の件数の既定値（上限）
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// ユーザーが参加しているチャット一覧
pub struct GetChatsUseCase {
    store: Arc<dyn ChatStore>,
}

impl GetChatsUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// 更新日時の新しい順
    pub async fn execute(&self, user: &UserId) -> Result<Vec<Chat>, QueryError> {
        let chats = self.store.chats_for(user).await?;
        tracing::debug!("User '{}' has {} chat(s)", user, chats.len());
        Ok(chats)
    }
}

/// チャットのメッセージ履歴
pub struct GetChatMessagesUseCase {
    store: Arc<dyn ChatStore>,
    history_limit: usize,
}

impl GetChatMessagesUseCase {
    pub fn new(store: Arc<dyn ChatStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit: history_limit.max(1),
        }
    }

    /// 最新 `limit` 件（`before` 指定時はそのメッセージより前）を古い順で返す
    ///
    /// `limit` は 1 以上 `history_limit` 以下に丸められる。
    pub async fn execute(
        &self,
        chat_id: &ChatId,
        viewer: &UserId,
        before: Option<MessageId>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, QueryError> {
        let chat = self
            .store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| QueryError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_participant(viewer) {
            return Err(QueryError::NotParticipant(chat_id.to_string()));
        }

        let limit = limit
            .unwrap_or(self.history_limit)
            .clamp(1, self.history_limit);
        let mut messages = self.store.recent_messages(chat_id, before, limit).await?;
        // ストアは新しい順で返すので、表示用に古い順へ
        messages.reverse();
        Ok(messages)
    }
}
