//! Room Membership Tracker
//!
//! チャットを「表示中」の接続の集合を管理します。オンライン状態とは独立しており、
//! 1 つの接続が複数のチャットに同時に参加することも許容します。

use std::collections::{HashMap, HashSet};

use super::value_object::{ChatId, ConnectionId};

#[derive(Debug, Default)]
pub struct RoomMembership {
    /// chat -> 表示中の接続
    rooms: HashMap<ChatId, HashSet<ConnectionId>>,
    /// 接続 -> 参加中の chat（切断時の一括削除用の逆引き）
    joined: HashMap<ConnectionId, HashSet<ChatId>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をチャットの閲覧者に追加する（新規追加なら `true`）
    pub fn join(&mut self, chat: ChatId, connection: ConnectionId) -> bool {
        let added = self
            .rooms
            .entry(chat.clone())
            .or_default()
            .insert(connection.clone());
        self.joined.entry(connection).or_default().insert(chat);
        added
    }

    /// 接続をチャットの閲覧者から外す（存在しなければ何もしない）
    pub fn leave(&mut self, chat: &ChatId, connection: &ConnectionId) -> bool {
        let removed = Self::remove_from(&mut self.rooms, chat, connection);
        Self::remove_from(&mut self.joined, connection, chat);
        removed
    }

    pub fn viewers_of(&self, chat: &ChatId) -> HashSet<ConnectionId> {
        self.rooms.get(chat).cloned().unwrap_or_default()
    }

    pub fn rooms_of(&self, connection: &ConnectionId) -> HashSet<ChatId> {
        self.joined.get(connection).cloned().unwrap_or_default()
    }

    pub fn is_viewing(&self, chat: &ChatId, connection: &ConnectionId) -> bool {
        self.rooms
            .get(chat)
            .is_some_and(|viewers| viewers.contains(connection))
    }

    /// 接続を全てのチャットから外し、外したチャットを返す
    pub fn purge(&mut self, connection: &ConnectionId) -> Vec<ChatId> {
        let Some(chats) = self.joined.remove(connection) else {
            return Vec::new();
        };
        let mut purged: Vec<ChatId> = chats.into_iter().collect();
        for chat in &purged {
            Self::remove_from(&mut self.rooms, chat, connection);
        }
        purged.sort();
        purged
    }

    /// 閲覧者が 1 人以上いるチャットの数
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
        self.joined.clear();
    }

    fn remove_from<K, V>(map: &mut HashMap<K, HashSet<V>>, key: &K, value: &V) -> bool
    where
        K: std::hash::Hash + Eq,
        V: std::hash::Hash + Eq,
    {
        let Some(set) = map.get_mut(key) else {
            return false;
        };
        let removed = set.remove(value);
        if set.is_empty() {
            map.remove(key);
        }
        removed
    }
}
