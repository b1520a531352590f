//! Presence & Lifecycle Manager
//!
//! 接続ごとの状態遷移 `Connected → Authenticated → Disconnected` を管理し、
//! Connection Registry と Room Membership の整合性を保ちます。
//!
//! プロセス全体で 1 つのインスタンスを `Arc<Mutex<Presence>>` として共有し、
//! 全ての変更と参照はこのロックで直列化されます。

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use tokio::sync::Mutex;

use super::{
    error::PresenceError,
    membership::RoomMembership,
    registry::{ConnectionRegistry, ConnectionState, Registration},
    value_object::{ChatId, ConnectionId, Timestamp, UserId},
};

/// プロセス全体で共有される Presence
pub type SharedPresence = Arc<Mutex<Presence>>;

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnection {
    pub connection: ConnectionId,
    /// 認証済みだった場合のユーザー
    pub user: Option<UserId>,
    /// 切断によって閲覧者から外れたチャット
    pub left_chats: Vec<ChatId>,
    /// このユーザーの最後の接続だった場合 `true`
    pub went_offline: bool,
}

#[derive(Debug, Default)]
pub struct Presence {
    registry: ConnectionRegistry,
    membership: RoomMembership,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPresence {
        Arc::new(Mutex::new(Self::new()))
    }

    /// トランスポートのハンドシェイク（未認証状態で登録）
    pub fn connect(&mut self, connection: ConnectionId, at: Timestamp) -> bool {
        self.registry.open(connection, at)
    }

    /// 接続を認証済みにする
    ///
    /// 別ユーザーへの上書き時は、旧ユーザーとして参加していたチャットから外す。
    pub fn authenticate(
        &mut self,
        connection: &ConnectionId,
        user: UserId,
    ) -> Result<Registration, PresenceError> {
        let registration = self.registry.register(connection, user)?;
        if let Registration::Reassigned { previous } = &registration {
            let purged = self.membership.purge(connection);
            tracing::warn!(
                "Connection '{}' re-authenticated as a different user (was '{}'); left {} chat(s)",
                connection,
                previous,
                purged.len()
            );
        }
        Ok(registration)
    }

    /// 認証済みの接続のユーザーを返す
    pub fn require_user(&self, connection: &ConnectionId) -> Result<UserId, PresenceError> {
        match self.registry.state(connection) {
            ConnectionState::Authenticated(user) => Ok(user),
            ConnectionState::Connected => Err(PresenceError::Unauthenticated),
            ConnectionState::Disconnected => {
                Err(PresenceError::UnknownConnection(connection.to_string()))
            }
        }
    }

    pub fn state(&self, connection: &ConnectionId) -> ConnectionState {
        self.registry.state(connection)
    }

    /// チャットに参加（認証済みの接続のみ）
    pub fn join_chat(
        &mut self,
        connection: &ConnectionId,
        chat: ChatId,
    ) -> Result<bool, PresenceError> {
        self.require_user(connection)?;
        Ok(self.membership.join(chat, connection.clone()))
    }

    /// チャットから退出（認証済みの接続のみ）
    pub fn leave_chat(
        &mut self,
        connection: &ConnectionId,
        chat: &ChatId,
    ) -> Result<bool, PresenceError> {
        self.require_user(connection)?;
        Ok(self.membership.leave(chat, connection))
    }

    /// 切断（終端状態）
    ///
    /// Registry からの削除を先に行い、その後 Room Membership から一括削除する。
    /// 未知の接続に対しては `None`。
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<Disconnection> {
        let removed = self.registry.unregister(connection)?;
        let left_chats = self.membership.purge(connection);
        let went_offline = removed
            .user
            .as_ref()
            .is_some_and(|user| !self.registry.is_online(user));
        Some(Disconnection {
            connection: removed.id,
            user: removed.user,
            left_chats,
            went_offline,
        })
    }

    pub fn live_connections_for(&self, user: &UserId) -> HashSet<ConnectionId> {
        self.registry.live_connections_for(user)
    }

    pub fn is_online(&self, user: &UserId) -> bool {
        self.registry.is_online(user)
    }

    pub fn viewers_of(&self, chat: &ChatId) -> HashSet<ConnectionId> {
        self.membership.viewers_of(chat)
    }

    pub fn rooms_of(&self, connection: &ConnectionId) -> HashSet<ChatId> {
        self.membership.rooms_of(connection)
    }

    /// `user` の接続のうち 1 つでも `chat` を表示中か
    pub fn is_user_viewing(&self, user: &UserId, chat: &ChatId) -> bool {
        self.registry
            .live_connections_for(user)
            .iter()
            .any(|connection| self.membership.is_viewing(chat, connection))
    }

    /// 配信先の接続を決定する
    ///
    /// `users` の全ライブ接続と `chat` の閲覧者の和集合（ソート済み・重複なし）。
    /// 呼び出し時点で Registry に存在する接続のみを返す。
    pub fn delivery_targets(&self, users: &[&UserId], chat: Option<&ChatId>) -> Vec<ConnectionId> {
        let mut targets: BTreeSet<ConnectionId> = users
            .iter()
            .flat_map(|user| self.registry.live_connections_for(user))
            .collect();
        if let Some(chat) = chat {
            targets.extend(
                self.membership
                    .viewers_of(chat)
                    .into_iter()
                    .filter(|connection| self.registry.is_live(connection)),
            );
        }
        targets.into_iter().collect()
    }

    /// ライブ接続数（未認証を含む）
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// プロセス終了時に全エントリを破棄し、破棄した接続数を返す
    pub fn shutdown(&mut self) -> usize {
        self.membership.clear();
        self.registry.clear()
    }
}
