//! MessagePusher trait 定義
//!
//! 接続ごとの送信キュー（チャンネル）へのイベント送信を抽象化します。
//! トランスポートの種類（WebSocket など）やワイヤ形式には依存しません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundEvent};

/// 接続ごとの送信キュー（エンコード済みのフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_connection(&self, connection: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを登録解除
    async fn unregister_connection(&self, connection: &ConnectionId);

    /// 単一の接続に送信
    async fn push_to(
        &self,
        connection: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続に送信し、実際に送信できた接続を返す
    ///
    /// 一部の接続への送信失敗は許容する。
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &OutboundEvent,
    ) -> Vec<ConnectionId>;
}
