//! Utilities shared across Shelftalk crates.

pub mod logger;
pub mod time;
