//! UseCase: 通知の配信（Notification Dispatcher）
//!
//! 通知は受信者のライブ接続すべてに配信されます。オフラインの場合は破棄され、
//! エラーにはなりません（通知の永続化は呼び出し側の責務です）。

use std::sync::Arc;

use crate::domain::{MessagePusher, Notification, OutboundEvent, SharedPresence, UserId};

pub struct DispatchNotificationUseCase {
    presence: SharedPresence,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DispatchNotificationUseCase {
    pub fn new(presence: SharedPresence, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// `recipient` のライブ接続に通知を配信し、配信できた接続数を返す
    pub async fn execute(&self, recipient: &UserId, notification: Notification) -> usize {
        let kind = notification.kind.as_str().to_string();
        let event = OutboundEvent::Notification(notification);

        // 配信先の決定と送信を同じロック区間で行う
        let presence = self.presence.lock().await;
        let targets = presence.delivery_targets(&[recipient], None);
        if targets.is_empty() {
            tracing::debug!("User '{}' is offline; dropping '{}' notification", recipient, kind);
            return 0;
        }
        let delivered = self.message_pusher.broadcast(&targets, &event).await;
        drop(presence);

        tracing::info!(
            "Delivered '{}' notification to '{}' on {}/{} connection(s)",
            kind,
            recipient,
            delivered.len(),
            targets.len()
        );
        delivered.len()
    }
}
