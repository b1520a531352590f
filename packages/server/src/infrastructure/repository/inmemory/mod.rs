mod chat;

pub use chat::InMemoryChatStore;
