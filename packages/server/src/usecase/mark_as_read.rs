//! UseCase: 既読化
//!
//! 冪等です。既に全て既読の場合は何も変更せず、0 件として扱います。

use std::sync::Arc;

use crate::domain::{ChatId, ChatStore, MessagePusher, OutboundEvent, SharedPresence, UserId};

use super::error::MarkAsReadError;

pub struct MarkAsReadUseCase {
    store: Arc<dyn ChatStore>,
    presence: SharedPresence,
    message_pusher: Arc<dyn MessagePusher>,
}

impl MarkAsReadUseCase {
    pub fn new(
        store: Arc<dyn ChatStore>,
        presence: SharedPresence,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            store,
            presence,
            message_pusher,
        }
    }

    /// `reader` 宛ての未読メッセージを既読にし、既読にした件数を返す
    ///
    /// `reader` の他の端末には `chat_read` を送信する。
    pub async fn execute(&self, chat_id: &ChatId, reader: &UserId) -> Result<usize, MarkAsReadError> {
        let chat = self
            .store
            .find_chat(chat_id)
            .await?
            .ok_or_else(|| MarkAsReadError::ChatNotFound(chat_id.to_string()))?;
        if !chat.is_participant(reader) {
            return Err(MarkAsReadError::NotParticipant(chat_id.to_string()));
        }

        let updated = self.store.mark_read(chat_id, reader).await?;
        tracing::info!(
            "User '{}' marked {} message(s) as read in chat '{}'",
            reader,
            updated,
            chat_id
        );

        let event = OutboundEvent::ChatRead {
            chat: chat_id.clone(),
            reader: reader.clone(),
            updated,
        };
        let presence = self.presence.lock().await;
        let targets = presence.delivery_targets(&[reader], None);
        self.message_pusher.broadcast(&targets, &event).await;
        drop(presence);

        Ok(updated)
    }
}
