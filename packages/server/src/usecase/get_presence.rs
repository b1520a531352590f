//! UseCase: プレゼンスの参照

use crate::domain::{SharedPresence, UserId};

/// ユーザーのプレゼンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPresence {
    pub user: UserId,
    pub online: bool,
    /// ライブ接続数
    pub connections: usize,
}

pub struct GetPresenceUseCase {
    presence: SharedPresence,
}

impl GetPresenceUseCase {
    pub fn new(presence: SharedPresence) -> Self {
        Self { presence }
    }

    pub async fn execute(&self, user: UserId) -> UserPresence {
        let connections = self.presence.lock().await.live_connections_for(&user).len();
        UserPresence {
            user,
            online: connections > 0,
            connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, conn, user};

    #[tokio::test]
    async fn test_presence_follows_connections() {
        // テスト項目: 接続があればオンライン、全て切断するとオフライン
        // given (前提条件):
        let harness = Harness::new();
        let _tab1 = harness.connect("c1", "alice").await;
        let _tab2 = harness.connect("c2", "alice").await;
        let usecase = GetPresenceUseCase::new(harness.presence.clone());

        // when (操作):
        let online = usecase.execute(user("alice")).await;
        {
            let mut presence = harness.presence.lock().await;
            presence.disconnect(&conn("c1"));
            presence.disconnect(&conn("c2"));
        }
        let offline = usecase.execute(user("alice")).await;

        // then (期待する結果):
        assert_eq!(
            online,
            UserPresence {
                user: user("alice"),
                online: true,
                connections: 2,
            }
        );
        assert!(!offline.online);
        assert_eq!(offline.connections, 0);
    }
}
