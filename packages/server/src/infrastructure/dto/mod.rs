//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event envelopes
//! - `http`: HTTP API request/response bodies (also embedded in events)

pub mod conversion;
pub mod http;
pub mod websocket;
