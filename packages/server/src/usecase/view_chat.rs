//! UseCase: チャットの表示（join_chat / leave_chat）
//!
//! 閲覧者集合は参加者の接続のみで構成されます。join の前にストアでチャットの存在と
//! 参加者であることを確認します。

use std::sync::Arc;

use crate::domain::{ChatId, ChatStore, ConnectionId, MessagePusher, OutboundEvent, SharedPresence};

use super::error::JoinChatError;

pub struct ViewChatUseCase {
    presence: SharedPresence,
    store: Arc<dyn ChatStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ViewChatUseCase {
    pub fn new(
        presence: SharedPresence,
        store: Arc<dyn ChatStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            presence,
            store,
            message_pusher,
        }
    }

    /// チャットの閲覧者に加わり、`chat_joined` を返信する
    ///
    /// 再 join は冪等（`Ok(false)`）。
    pub async fn join(
        &self,
        connection: &ConnectionId,
        chat_id: ChatId,
    ) -> Result<bool, JoinChatError> {
        let user = self.presence.lock().await.require_user(connection)?;

        let chat = self
            .store
            .find_chat(&chat_id)
            .await
            .map_err(|e| JoinChatError::PersistenceFailure(e.to_string()))?
            .ok_or_else(|| JoinChatError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_participant(&user) {
            return Err(JoinChatError::NotParticipant(chat_id.to_string()));
        }

        // ストア参照中に切断された場合は、ここで Unauthenticated になる
        let joined = self
            .presence
            .lock()
            .await
            .join_chat(connection, chat_id.clone())?;
        tracing::info!("Connection '{}' ({}) joined chat '{}'", connection, user, chat_id);

        self.acknowledge(connection, OutboundEvent::ChatJoined(chat_id))
            .await;
        Ok(joined)
    }

    /// チャットの閲覧者から外れ、`chat_left` を返信する（参加していなければ何もしない）
    pub async fn leave(
        &self,
        connection: &ConnectionId,
        chat_id: ChatId,
    ) -> Result<bool, JoinChatError> {
        let left = self
            .presence
            .lock()
            .await
            .leave_chat(connection, &chat_id)?;
        if left {
            tracing::info!("Connection '{}' left chat '{}'", connection, chat_id);
        }

        self.acknowledge(connection, OutboundEvent::ChatLeft(chat_id))
            .await;
        Ok(left)
    }

    async fn acknowledge(&self, connection: &ConnectionId, event: OutboundEvent) {
        if let Err(e) = self.message_pusher.push_to(connection, &event).await {
            tracing::warn!("Failed to acknowledge to '{}': {}", connection, e);
        }
    }
}
