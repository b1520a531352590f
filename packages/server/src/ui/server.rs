//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

use super::{
    handler::{
        get_chat_messages, get_chats, get_presence, health_check, mark_as_read, post_notification,
        send_message, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Chat and notification server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(store, message_pusher, presence, clock, config.history_limit);
/// Server::new(config, state).run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Routes with tracing and, when configured, CORS.
    pub fn router(&self) -> Router {
        let router = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chats", get(get_chats))
            .route("/api/chats/{chat_id}/messages", get(get_chat_messages))
            .route("/api/chats/{chat_id}/read", put(mark_as_read))
            .route("/api/messages", post(send_message))
            .route("/api/notifications", post(post_notification))
            .route("/api/presence/{user_id}", get(get_presence))
            .with_state(self.state.clone());

        let router = match self.cors_layer() {
            Some(cors) => router.layer(cors),
            None => router,
        };
        router.layer(TraceLayer::new_for_http())
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        let origin = self.config.cors_origin.as_deref()?;
        match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::PUT])
                    .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-user-id")]),
            ),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        }
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Shelftalk server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves, then drop
    /// every live connection entry.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.state.disconnect_session_usecase.shutdown().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
