//! UseCase: 切断処理
//!
//! 切断は終端状態です。Registry からの削除 → Room Membership からの一括削除の順で
//! カスケードし、最後に送信キューを登録解除します。

use std::sync::Arc;

use crate::domain::{ConnectionId, Disconnection, MessagePusher, SharedPresence};

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    presence: SharedPresence,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(presence: SharedPresence, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Disconnection)` - 切断した接続の情報
    /// * `None` - 既に切断済み（未知の接続）
    pub async fn execute(&self, connection: &ConnectionId) -> Option<Disconnection> {
        let disconnection = self.presence.lock().await.disconnect(connection);
        self.message_pusher.unregister_connection(connection).await;

        match &disconnection {
            Some(d) => {
                tracing::info!(
                    "Connection '{}' disconnected (user: {}, left {} chat(s))",
                    connection,
                    d.user.as_ref().map_or("<unauthenticated>", |u| u.as_str()),
                    d.left_chats.len()
                );
                if let (Some(user), true) = (&d.user, d.went_offline) {
                    tracing::info!("User '{}' is now offline", user);
                }
            }
            None => tracing::debug!("Connection '{}' was already disconnected", connection),
        }

        disconnection
    }

    /// プロセス終了時に全ての接続状態を破棄する
    pub async fn shutdown(&self) -> usize {
        let dropped = self.presence.lock().await.shutdown();
        tracing::info!("Dropped {} live connection(s) on shutdown", dropped);
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatId, ConnectionState, OutboundEvent},
        usecase::test_support::{Harness, conn, user},
    };

    fn usecase(harness: &Harness) -> DisconnectSessionUseCase {
        DisconnectSessionUseCase::new(harness.presence.clone(), harness.pusher.clone())
    }

    #[tokio::test]
    async fn test_disconnect_removes_from_registry_and_rooms() {
        // テスト項目: 切断で Registry と全てのチャットの閲覧者から外れる
        // given (前提条件):
        let harness = Harness::new();
        let _rx1 = harness.connect("c1", "alice").await;
        let _rx2 = harness.connect("c2", "bob").await;
        let chat = ChatId::new("x".to_string()).unwrap();
        {
            let mut presence = harness.presence.lock().await;
            presence.join_chat(&conn("c1"), chat.clone()).unwrap();
            presence.join_chat(&conn("c2"), chat.clone()).unwrap();
        }
        let usecase = usecase(&harness);

        // when (操作):
        let result = usecase.execute(&conn("c1")).await;

        // then (期待する結果):
        let disconnection = result.unwrap();
        assert_eq!(disconnection.user, Some(user("alice")));
        assert_eq!(disconnection.left_chats, vec![chat.clone()]);
        assert!(disconnection.went_offline);

        let presence = harness.presence.lock().await;
        assert_eq!(presence.state(&conn("c1")), ConnectionState::Disconnected);
        assert!(!presence.viewers_of(&chat).contains(&conn("c1")));
        assert!(presence.viewers_of(&chat).contains(&conn("c2")));
    }

    #[tokio::test]
    async fn test_disconnected_connection_receives_nothing() {
        // テスト項目: 切断後の接続は配信先に含まれない
        // given (前提条件):
        let harness = Harness::new();
        let _rx = harness.connect("c1", "alice").await;
        let usecase = usecase(&harness);

        // when (操作):
        usecase.execute(&conn("c1")).await;
        let delivered = harness
            .pusher
            .broadcast(&[conn("c1")], &OutboundEvent::ChatLeft(ChatId::generate()))
            .await;

        // then (期待する結果):
        assert!(delivered.is_empty());
        let presence = harness.presence.lock().await;
        assert!(
            presence
                .delivery_targets(&[&user("alice")], None)
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_disconnect_twice() {
        // テスト項目: 2 回目の切断は None（冪等）
        // given (前提条件):
        let harness = Harness::new();
        let _rx = harness.connect("c1", "alice").await;
        let usecase = usecase(&harness);
        usecase.execute(&conn("c1")).await;

        // when (操作):
        let result = usecase.execute(&conn("c1")).await;

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_drops_all_connections() {
        // テスト項目: shutdown で全接続が破棄される
        // given (前提条件):
        let harness = Harness::new();
        let _rx1 = harness.connect("c1", "alice").await;
        let _rx2 = harness.connect("c2", "bob").await;
        let usecase = usecase(&harness);

        // when (操作):
        let dropped = usecase.shutdown().await;

        // then (期待する結果):
        assert_eq!(dropped, 2);
        assert!(!harness.presence.lock().await.is_online(&user("alice")));
    }
}
