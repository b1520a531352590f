//! UseCase: 接続の確立と認証
//!
//! トランスポートのハンドシェイクで未認証の接続を作成し、`authenticate`
//! イベントで外部の認証コラボレーターが保証したユーザーに関連付けます。

use std::sync::Arc;

use shelftalk_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, OutboundEvent, PusherChannel, Registration, SharedPresence,
    Timestamp, UserId,
};

use super::error::SessionError;

/// 接続確立・認証のユースケース
pub struct ConnectSessionUseCase {
    presence: SharedPresence,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        presence: SharedPresence,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            message_pusher,
            clock,
        }
    }

    /// ハンドシェイク: 新しい接続 ID を発行し、未認証状態で登録する
    ///
    /// # Arguments
    ///
    /// * `sender` - この接続への送信キュー
    pub async fn open(&self, sender: PusherChannel) -> ConnectionId {
        let connection = ConnectionId::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 送信キューを先に登録し、認証直後の ack を取りこぼさないようにする
        self.message_pusher
            .register_connection(connection.clone(), sender)
            .await;
        self.presence
            .lock()
            .await
            .connect(connection.clone(), connected_at);

        tracing::info!("Connection '{}' opened (unauthenticated)", connection);
        connection
    }

    /// 接続を認証済みにし、`authenticated` を返信する
    pub async fn authenticate(
        &self,
        connection: &ConnectionId,
        user: UserId,
    ) -> Result<Registration, SessionError> {
        let registration = self
            .presence
            .lock()
            .await
            .authenticate(connection, user.clone())?;

        match &registration {
            Registration::Registered => {
                tracing::info!("Connection '{}' authenticated as '{}'", connection, user)
            }
            Registration::AlreadyRegistered => {
                tracing::debug!("Connection '{}' already authenticated as '{}'", connection, user)
            }
            Registration::Reassigned { previous } => tracing::warn!(
                "Connection '{}' switched identity from '{}' to '{}'",
                connection,
                previous,
                user
            ),
        }

        let ack = OutboundEvent::Authenticated {
            connection: connection.clone(),
            user,
        };
        if let Err(e) = self.message_pusher.push_to(connection, &ack).await {
            tracing::warn!("Failed to acknowledge authentication of '{}': {}", connection, e);
        }

        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ConnectionState,
        infrastructure::dto::websocket::{AuthenticatedPayload, ServerEvent},
        usecase::test_support::{Harness, clock, drain, user},
    };
    use tokio::sync::mpsc;

    fn usecase(harness: &Harness) -> ConnectSessionUseCase {
        ConnectSessionUseCase::new(harness.presence.clone(), harness.pusher.clone(), clock())
    }

    #[tokio::test]
    async fn test_open_registers_unauthenticated_connection() {
        // テスト項目: ハンドシェイク直後の接続は未認証でレジストリ検索に現れない
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let connection = usecase.open(tx).await;

        // then (期待する結果):
        let presence = harness.presence.lock().await;
        assert_eq!(presence.state(&connection), ConnectionState::Connected);
        assert_eq!(presence.connection_count(), 1);
        assert_eq!(harness.pusher.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_authenticate_registers_and_acknowledges() {
        // テスト項目: 認証すると Registry に登録され authenticated が返信される
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = usecase.open(tx).await;

        // when (操作):
        let result = usecase.authenticate(&connection, user("alice")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Registration::Registered));
        assert!(
            harness
                .presence
                .lock()
                .await
                .live_connections_for(&user("alice"))
                .contains(&connection)
        );
        assert_eq!(
            drain(&mut rx),
            vec![ServerEvent::Authenticated(AuthenticatedPayload {
                connection_id: connection.to_string(),
                user_id: "alice".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn test_authenticate_twice_is_idempotent() {
        // テスト項目: 同じユーザーでの再認証は冪等
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = usecase.open(tx).await;
        usecase.authenticate(&connection, user("alice")).await.unwrap();

        // when (操作):
        let result = usecase.authenticate(&connection, user("alice")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Registration::AlreadyRegistered));
        assert_eq!(
            harness
                .presence
                .lock()
                .await
                .live_connections_for(&user("alice"))
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_authenticate_unknown_connection() {
        // テスト項目: 切断済み（未知）の接続の認証はエラー
        // given (前提条件):
        let harness = Harness::new();
        let usecase = usecase(&harness);
        let ghost = ConnectionId::generate();

        // when (操作):
        let result = usecase.authenticate(&ghost, user("alice")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SessionError::UnknownConnection(ghost.to_string()))
        );
    }
}
