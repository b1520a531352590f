//! InMemory Chat Store 実装
//!
//! ドメイン層が定義する ChatStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、単一の Mutex で各操作をアトミックにします。
//!
//! 参加者ペアに対する一意制約を持ち、同じペアのチャットを 2 つ作成しようとすると
//! `StoreError::DuplicateChat` を返します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Chat, ChatId, ChatStore, Message, MessageId, ParticipantPair, StoreError, UserId};

#[derive(Debug, Default)]
struct ChatLog {
    chats: HashMap<ChatId, Chat>,
    /// 参加者ペアの一意インデックス
    pairs: HashMap<ParticipantPair, ChatId>,
    /// chat -> 追記順のメッセージ
    messages: HashMap<ChatId, Vec<Message>>,
}

/// インメモリ Chat Store 実装
#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    log: Mutex<ChatLog>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn find_chat(&self, chat_id: &ChatId) -> Result<Option<Chat>, StoreError> {
        let log = self.log.lock().await;
        Ok(log.chats.get(chat_id).cloned())
    }

    async fn find_chat_between(
        &self,
        participants: &ParticipantPair,
    ) -> Result<Option<Chat>, StoreError> {
        let log = self.log.lock().await;
        Ok(log
            .pairs
            .get(participants)
            .and_then(|id| log.chats.get(id))
            .cloned())
    }

    async fn insert_chat(&self, chat: Chat) -> Result<Chat, StoreError> {
        let mut log = self.log.lock().await;
        if log.pairs.contains_key(&chat.participants) {
            return Err(StoreError::DuplicateChat);
        }
        log.pairs.insert(chat.participants.clone(), chat.id.clone());
        log.chats.insert(chat.id.clone(), chat.clone());
        Ok(chat)
    }

    async fn append_message(&self, message: Message) -> Result<Chat, StoreError> {
        let mut log = self.log.lock().await;
        let ChatLog {
            chats, messages, ..
        } = &mut *log;

        let chat = chats
            .get_mut(&message.chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(message.chat_id.to_string()))?;
        chat.record_message(&message);
        let updated = chat.clone();

        messages
            .entry(message.chat_id.clone())
            .or_default()
            .push(message);

        Ok(updated)
    }

    async fn mark_read(&self, chat_id: &ChatId, reader: &UserId) -> Result<usize, StoreError> {
        let mut log = self.log.lock().await;
        let ChatLog {
            chats, messages, ..
        } = &mut *log;

        let chat = chats
            .get_mut(chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))?;

        let updated = messages
            .get_mut(chat_id)
            .map(|chat_messages| {
                chat_messages
                    .iter_mut()
                    .map(|message| message.mark_read_by(reader))
                    .filter(|changed| *changed)
                    .count()
            })
            .unwrap_or(0);
        chat.reset_unread(reader);

        Ok(updated)
    }

    async fn chats_for(&self, user: &UserId) -> Result<Vec<Chat>, StoreError> {
        let log = self.log.lock().await;
        let mut chats: Vec<Chat> = log
            .chats
            .values()
            .filter(|chat| chat.is_participant(user))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn recent_messages(
        &self,
        chat_id: &ChatId,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let log = self.log.lock().await;
        if !log.chats.contains_key(chat_id) {
            return Err(StoreError::ChatNotFound(chat_id.to_string()));
        }
        let messages = log.messages.get(chat_id).map(Vec::as_slice).unwrap_or_default();

        // カーソルは追記順の位置に解決する
        let end = match &before {
            Some(cursor) => messages
                .iter()
                .position(|m| &m.id == cursor)
                .ok_or_else(|| StoreError::MessageNotFound(cursor.to_string()))?,
            None => messages.len(),
        };
        Ok(messages[..end].iter().rev().take(limit).cloned().collect())
    }
}
