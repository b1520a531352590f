//! Real-time chat and notification core of the Shelftalk book-tracking app.
//!
//! Tracks live connections and chat-room viewers, routes pairwise chat
//! messages through the chat store and fans them out over WebSocket, and
//! dispatches social notifications to online users.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
