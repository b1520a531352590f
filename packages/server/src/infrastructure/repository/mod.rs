//! Chat store implementations.

pub mod inmemory;

pub use inmemory::InMemoryChatStore;
