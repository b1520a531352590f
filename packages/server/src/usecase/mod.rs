pub mod connect_session;
pub mod disconnect_session;
pub mod dispatch_notification;
pub mod error;
pub mod get_chats;
pub mod get_presence;
pub mod mark_as_read;
pub mod send_message;
pub mod view_chat;

#[cfg(test)]
mod test_support;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use dispatch_notification::DispatchNotificationUseCase;
pub use error::{JoinChatError, MarkAsReadError, QueryError, SendMessageError, SessionError};
pub use get_chats::{DEFAULT_HISTORY_LIMIT, GetChatMessagesUseCase, GetChatsUseCase};
pub use get_presence::{GetPresenceUseCase, UserPresence};
pub use mark_as_read::MarkAsReadUseCase;
pub use send_message::{SendMessageUseCase, SentMessage};
pub use view_chat::ViewChatUseCase;
