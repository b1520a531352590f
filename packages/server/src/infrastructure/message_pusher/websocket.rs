//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続 ID ごとに WebSocket の送信キュー（`UnboundedSender`）を管理
//! - ドメインのイベントを JSON フレームにエンコード
//! - 接続へのイベント送信（push_to, broadcast）
//!
//! WebSocket の受付は UI 層（`ui/handler/websocket.rs`）で行われ、
//! 生成された送信キューがここに登録されます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundEvent, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

fn encode(event: &OutboundEvent) -> String {
    ServerEvent::from(event).to_json()
}

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中の WebSocket の送信キュー
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの送信キューの数
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection);
        connections.insert(connection, sender);
    }

    async fn unregister_connection(&self, connection: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection);
        tracing::debug!("Connection '{}' unregistered from MessagePusher", connection);
    }

    async fn push_to(
        &self,
        connection: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let connections = self.connections.lock().await;

        let sender = connections
            .get(connection)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection.to_string()))?;
        sender
            .send(encode(event))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed event to connection '{}'", connection);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Vec<ConnectionId> {
        if targets.is_empty() {
            return Vec::new();
        }
        let frame = encode(event);
        let connections = self.connections.lock().await;
        let mut delivered = Vec::with_capacity(targets.len());

        for target in targets {
            match connections.get(target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(frame.clone()) {
                        tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                    } else {
                        delivered.push(target.clone());
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatId;
    use tokio::sync::mpsc;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn joined(chat: &str) -> OutboundEvent {
        OutboundEvent::ChatJoined(ChatId::new(chat.to_string()).unwrap())
    }

    const JOINED_X: &str = r#"{"event":"chat_joined","data":{"chatId":"x"}}"#;

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にイベントを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx).await;

        // when (操作):
        let result = pusher.push_to(&conn("c1"), &joined("x")).await;

        // then (期待する結果): JSON フレームにエンコードされて届く
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(JOINED_X.to_string()));
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("nonexistent"), &joined("x")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound("nonexistent".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_closed_channel() {
        // テスト項目: 受信側が閉じた接続への送信は PushFailed
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&conn("c1"), &joined("x")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部の接続が存在しなくても、送信できた接続を返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx1).await;
        pusher.register_connection(conn("c2"), tx2).await;

        // when (操作):
        let targets = vec![conn("c1"), conn("ghost"), conn("c2")];
        let delivered = pusher.broadcast(&targets, &joined("x")).await;

        // then (期待する結果):
        assert_eq!(delivered, vec![conn("c1"), conn("c2")]);
        assert_eq!(rx1.recv().await, Some(JOINED_X.to_string()));
        assert_eq!(rx2.recv().await, Some(JOINED_X.to_string()));
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        // テスト項目: 登録解除した接続には送信されない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("c1"), tx).await;

        // when (操作):
        pusher.unregister_connection(&conn("c1")).await;
        let delivered = pusher.broadcast(&[conn("c1")], &joined("x")).await;

        // then (期待する結果):
        assert!(delivered.is_empty());
        assert_eq!(pusher.connection_count().await, 0);
    }
}
