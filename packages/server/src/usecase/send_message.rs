//! UseCase: メッセージ送信（Message Router）
//!
//! 1. 本文の検証
//! 2. チャットの解決（存在しなければ参加者ペアで find-or-create）
//! 3. メッセージの永続化（追記・受信者の未読数加算・最終メッセージ更新をストアが一括で行う）
//! 4. 送信者・受信者の全ライブ接続とチャットの閲覧者へのファンアウト
//! 5. チャットの最初のメッセージなら受信者に `new_chat` を通知
//!
//! 永続化に失敗した場合はファンアウトしません。オフラインの受信者へのファンアウトは
//! エラーではありません（未読数が未配信メッセージの永続的なシグナルです）。

use std::sync::Arc;

use shelftalk_shared::time::Clock;

use crate::domain::{
    Chat, ChatId, ChatStore, ConnectionId, Message, MessageContent, MessagePusher, Notification,
    OutboundEvent, ParticipantPair, SharedPresence, StoreError, Timestamp, UserId,
};

use super::{dispatch_notification::DispatchNotificationUseCase, error::SendMessageError};

/// 送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// 永続化されたメッセージ
    pub message: Message,
    /// 追記後のチャット
    pub chat: Chat,
    /// `new_message` を送信できた接続
    pub delivered_to: Vec<ConnectionId>,
    /// 受信者がチャットを表示中だったか
    pub recipient_viewing: bool,
    /// この送信でチャットが作成されたか
    pub chat_created: bool,
    /// チャットの最初のメッセージか（受信者に `new_chat` が通知される）
    pub first_message: bool,
}

pub struct SendMessageUseCase {
    store: Arc<dyn ChatStore>,
    presence: SharedPresence,
    message_pusher: Arc<dyn MessagePusher>,
    dispatcher: Arc<DispatchNotificationUseCase>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        store: Arc<dyn ChatStore>,
        presence: SharedPresence,
        message_pusher: Arc<dyn MessagePusher>,
        dispatcher: Arc<DispatchNotificationUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            presence,
            message_pusher,
            dispatcher,
            clock,
        }
    }

    /// 接続からの `send_message` イベント
    ///
    /// 未認証の接続は状態を変更せずに拒否する。
    pub async fn execute_on_connection(
        &self,
        connection: &ConnectionId,
        recipient: Option<UserId>,
        chat_id: Option<ChatId>,
        content: String,
    ) -> Result<SentMessage, SendMessageError> {
        let sender = self
            .presence
            .lock()
            .await
            .require_user(connection)
            .map_err(|_| SendMessageError::Unauthenticated)?;
        self.execute(sender, recipient, chat_id, content).await
    }

    /// メッセージを送信する
    ///
    /// # Arguments
    ///
    /// * `sender` - 認証済みの送信者
    /// * `recipient` - 受信者（`chat_id` が既存のチャットを指す場合は無視される）
    /// * `chat_id` - 送信先のチャット（省略時や未知の場合は `recipient` とのペアで解決）
    /// * `content` - 本文
    pub async fn execute(
        &self,
        sender: UserId,
        recipient: Option<UserId>,
        chat_id: Option<ChatId>,
        content: String,
    ) -> Result<SentMessage, SendMessageError> {
        let content = MessageContent::new(content)?;
        let now = Timestamp::new(self.clock.now_millis());

        let (chat, chat_created) = self.resolve_chat(&sender, recipient, chat_id, now).await?;
        // 作成直後に追記が失敗したチャットへの再送も最初のメッセージとして扱う
        let first_message = chat.last_message.is_none();
        let recipient = chat
            .other_participant(&sender)
            .cloned()
            .ok_or_else(|| SendMessageError::NotParticipant(chat.id.to_string()))?;

        let message = Message::new(chat.id.clone(), sender.clone(), recipient.clone(), content, now);
        let chat = self.store.append_message(message.clone()).await.map_err(|e| {
            tracing::error!("Failed to persist message in chat '{}': {}", message.chat_id, e);
            SendMessageError::from(e)
        })?;

        // 配信先の決定と送信を同じロック区間で行い、切断済みの接続へは送らない
        let (delivered_to, recipient_viewing) = {
            let presence = self.presence.lock().await;
            let recipient_viewing = presence.is_user_viewing(&recipient, &chat.id);
            let targets = presence.delivery_targets(&[&sender, &recipient], Some(&chat.id));
            let delivered = self
                .message_pusher
                .broadcast(&targets, &OutboundEvent::NewMessage(message.clone()))
                .await;
            (delivered, recipient_viewing)
        };

        tracing::info!(
            "Message '{}' from '{}' to '{}' in chat '{}' delivered to {} connection(s) (recipient viewing: {})",
            message.id,
            sender,
            recipient,
            chat.id,
            delivered_to.len(),
            recipient_viewing
        );

        if first_message {
            self.dispatcher
                .execute(
                    &recipient,
                    Notification::new_chat(chat.id.clone(), sender.clone(), now),
                )
                .await;
        }

        Ok(SentMessage {
            message,
            chat,
            delivered_to,
            recipient_viewing,
            chat_created,
            first_message,
        })
    }

    /// 送信先のチャットを解決し、作成した場合は `true` を併せて返す
    async fn resolve_chat(
        &self,
        sender: &UserId,
        recipient: Option<UserId>,
        chat_id: Option<ChatId>,
        now: Timestamp,
    ) -> Result<(Chat, bool), SendMessageError> {
        if let Some(chat_id) = &chat_id {
            if let Some(chat) = self.store.find_chat(chat_id).await? {
                if !chat.is_participant(sender) {
                    return Err(SendMessageError::NotParticipant(chat_id.to_string()));
                }
                if let Some(recipient) = &recipient
                    && !chat.is_participant(recipient)
                {
                    tracing::debug!(
                        "Ignoring recipient '{}' outside chat '{}'",
                        recipient,
                        chat_id
                    );
                }
                return Ok((chat, false));
            }
        }

        let Some(recipient) = recipient else {
            let missing = chat_id.map(ChatId::into_string).unwrap_or_default();
            return Err(SendMessageError::ChatNotFound(missing));
        };
        let pair = ParticipantPair::new(sender.clone(), recipient)?;

        if let Some(chat) = self.store.find_chat_between(&pair).await? {
            return Ok((chat, false));
        }

        match self
            .store
            .insert_chat(Chat::new(ChatId::generate(), pair.clone(), now))
            .await
        {
            Ok(chat) => {
                tracing::info!("Created chat '{}' for {:?}", chat.id, pair.users());
                Ok((chat, true))
            }
            Err(StoreError::DuplicateChat) => {
                // 並行する送信が先に作成した
                tracing::debug!("Chat for {:?} was created concurrently; re-reading", pair.users());
                let chat = self.store.find_chat_between(&pair).await?.ok_or_else(|| {
                    SendMessageError::PersistenceFailure(
                        "chat missing after duplicate insert".to_string(),
                    )
                })?;
                Ok((chat, false))
            }
            Err(e) => Err(e.into()),
        }
    }
}
