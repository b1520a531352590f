//! Connection Registry
//!
//! ユーザーとライブ接続の対応を管理します。1 ユーザーは 0 個以上の接続を持ち
//! （複数タブ・複数デバイス）、1 つの接続は同時に 1 ユーザーにのみ属します。

use std::collections::{HashMap, HashSet};

use super::{
    error::PresenceError,
    value_object::{ConnectionId, Timestamp, UserId},
};

/// 接続ごとの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// ハンドシェイク済み・未認証
    Connected,
    /// 認証済み
    Authenticated(UserId),
    /// 切断済み（終端状態）
    Disconnected,
}

/// ライブ接続
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub user: Option<UserId>,
    pub connected_at: Timestamp,
}

/// `register` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// 新たに認証された
    Registered,
    /// 同じユーザーで既に認証済み（冪等）
    AlreadyRegistered,
    /// 別のユーザーとして上書きされた
    Reassigned { previous: UserId },
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ハンドシェイク直後の未認証接続を追加する
    ///
    /// 既に存在する接続 ID の場合は何もせず `false` を返す。
    pub fn open(&mut self, id: ConnectionId, connected_at: Timestamp) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(
            id.clone(),
            Connection {
                id,
                user: None,
                connected_at,
            },
        );
        true
    }

    /// 接続をユーザーに関連付ける
    pub fn register(
        &mut self,
        id: &ConnectionId,
        user: UserId,
    ) -> Result<Registration, PresenceError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or_else(|| PresenceError::UnknownConnection(id.to_string()))?;

        let outcome = match connection.user.replace(user.clone()) {
            None => Registration::Registered,
            Some(previous) if previous == user => return Ok(Registration::AlreadyRegistered),
            Some(previous) => Registration::Reassigned { previous },
        };

        if let Registration::Reassigned { previous } = &outcome {
            Self::detach(&mut self.users, previous, id);
        }
        self.users.entry(user).or_default().insert(id.clone());

        Ok(outcome)
    }

    /// 接続を削除し、削除した接続を返す
    ///
    /// ユーザーのライブ接続が空になった場合、そのユーザーはオフラインになる。
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(id)?;
        if let Some(user) = &connection.user {
            Self::detach(&mut self.users, user, id);
        }
        Some(connection)
    }

    fn detach(users: &mut HashMap<UserId, HashSet<ConnectionId>>, user: &UserId, id: &ConnectionId) {
        if let Some(ids) = users.get_mut(user) {
            ids.remove(id);
            if ids.is_empty() {
                users.remove(user);
            }
        }
    }

    /// `user` の現在のライブ接続（空の場合あり）
    pub fn live_connections_for(&self, user: &UserId) -> HashSet<ConnectionId> {
        self.users.get(user).cloned().unwrap_or_default()
    }

    pub fn is_online(&self, user: &UserId) -> bool {
        self.users.contains_key(user)
    }

    pub fn is_live(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn user_of(&self, id: &ConnectionId) -> Option<&UserId> {
        self.connections.get(id).and_then(|c| c.user.as_ref())
    }

    pub fn state(&self, id: &ConnectionId) -> ConnectionState {
        match self.connections.get(id) {
            None => ConnectionState::Disconnected,
            Some(Connection { user: None, .. }) => ConnectionState::Connected,
            Some(Connection {
                user: Some(user), ..
            }) => ConnectionState::Authenticated(user.clone()),
        }
    }

    /// ライブ接続数（未認証を含む）
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// 全エントリを破棄し、破棄した接続数を返す
    pub fn clear(&mut self) -> usize {
        let count = self.connections.len();
        self.connections.clear();
        self.users.clear();
        count
    }
}
