//! Shelftalk real-time chat and notification server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin shelftalk-server
//! cargo run --bin shelftalk-server -- --host 0.0.0.0 --port 3000
//! SHELFTALK_CORS_ORIGIN=https://shelftalk.example cargo run --bin shelftalk-server
//! ```

use std::sync::Arc;

use clap::Parser;
use shelftalk_server::{
    config::ServerConfig,
    domain::Presence,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryChatStore},
    ui::{Server, state::AppState},
};
use shelftalk_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "shelftalk-server")]
#[command(about = "Real-time chat and notification server for Shelftalk", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "SHELFTALK_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "SHELFTALK_PORT", default_value = "8080")]
    port: u16,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, env = "SHELFTALK_LOG", default_value = "info")]
    log_level: String,

    /// Maximum number of messages returned per history page
    #[arg(long, env = "SHELFTALK_HISTORY_LIMIT", default_value = "50")]
    history_limit: usize,

    /// Allowed CORS origin; no CORS layer when omitted
    #[arg(long, env = "SHELFTALK_CORS_ORIGIN")]
    cors_origin: Option<String>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            history_limit: args.history_limit,
            cors_origin: args.cors_origin,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);

    // Initialize dependencies in order:
    // 1. Chat store
    // 2. Presence and MessagePusher
    // 3. UseCases (AppState)
    // 4. Server

    // 1. Create the chat store (in-memory database)
    let store = Arc::new(InMemoryChatStore::new());

    // 2. Process-wide connection state, empty at start
    let presence = Presence::shared();
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let state = AppState::new(
        store,
        message_pusher,
        presence,
        Arc::new(SystemClock),
        config.history_limit,
    );

    // 4. Create and run the server
    let server = Server::new(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
