//! UseCase テスト用の共通ヘルパー

use std::sync::Arc;

use shelftalk_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessagePusher, Presence, SharedPresence, Timestamp, UserId},
    infrastructure::{
        dto::websocket::ServerEvent, message_pusher::WebSocketMessagePusher,
        repository::InMemoryChatStore,
    },
};

pub const NOW: i64 = 1_700_000_000_000;

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NOW))
}

/// 共有状態一式（Presence・Pusher・Store）
pub struct Harness {
    pub presence: SharedPresence,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub store: Arc<InMemoryChatStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            presence: Presence::shared(),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            store: Arc::new(InMemoryChatStore::new()),
        }
    }

    /// 認証済みの接続を用意し、その受信キューを返す
    pub async fn connect(&self, connection: &str, user_id: &str) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut presence = self.presence.lock().await;
            presence.connect(conn(connection), Timestamp::new(NOW));
            presence.authenticate(&conn(connection), user(user_id)).unwrap();
        }
        self.pusher.register_connection(conn(connection), tx).await;
        rx
    }
}

/// 受信キューに溜まっているイベントを全て取り出す
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}
