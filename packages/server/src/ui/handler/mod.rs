mod http;
mod websocket;

pub use http::{
    get_chat_messages, get_chats, get_presence, health_check, mark_as_read, post_notification,
    send_message,
};
pub use websocket::websocket_handler;
