//! Server state and dependency wiring.

use std::sync::Arc;

use shelftalk_shared::time::Clock;

use crate::{
    domain::{ChatStore, MessagePusher, SharedPresence},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, DispatchNotificationUseCase,
        GetChatMessagesUseCase, GetChatsUseCase, GetPresenceUseCase, MarkAsReadUseCase,
        SendMessageUseCase, ViewChatUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// MessagePusher（イベント送信の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub clock: Arc<dyn Clock>,
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    pub view_chat_usecase: Arc<ViewChatUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_as_read_usecase: Arc<MarkAsReadUseCase>,
    pub dispatch_notification_usecase: Arc<DispatchNotificationUseCase>,
    pub get_chats_usecase: Arc<GetChatsUseCase>,
    pub get_chat_messages_usecase: Arc<GetChatMessagesUseCase>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
}

impl AppState {
    /// Build every use case on top of the shared collaborators.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable chat log
    /// * `message_pusher` - Per-connection outbound queues
    /// * `presence` - Process-wide connection and room state
    /// * `clock` - Time source for message and connection timestamps
    /// * `history_limit` - Upper bound for a history page
    pub fn new(
        store: Arc<dyn ChatStore>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: SharedPresence,
        clock: Arc<dyn Clock>,
        history_limit: usize,
    ) -> Self {
        let dispatch_notification_usecase = Arc::new(DispatchNotificationUseCase::new(
            presence.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                presence.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(
                presence.clone(),
                message_pusher.clone(),
            )),
            view_chat_usecase: Arc::new(ViewChatUseCase::new(
                presence.clone(),
                store.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
                dispatch_notification_usecase.clone(),
                clock.clone(),
            )),
            mark_as_read_usecase: Arc::new(MarkAsReadUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
            )),
            get_chats_usecase: Arc::new(GetChatsUseCase::new(store.clone())),
            get_chat_messages_usecase: Arc::new(GetChatMessagesUseCase::new(store, history_limit)),
            get_presence_usecase: Arc::new(GetPresenceUseCase::new(presence)),
            dispatch_notification_usecase,
            message_pusher,
            clock,
        }
    }
}
