//! HTTP router and listener module.

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health, notify_bulk, notify_ready, notify_tuition, notify_user, webhook, AppState,
};
use crate::error::BotError;
use crate::supervisor::Module;
use crate::Result;

/// Create the router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let notify_routes = Router::new()
        .route("/bulk", post(notify_bulk))
        .route("/{user_id}", post(notify_user))
        .route("/ready/{user_id}", post(notify_ready))
        .route("/payment/tuition/{user_id}", post(notify_tuition));

    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .nest("/notify", notify_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// The HTTP side of the bot, run as a supervised module.
pub struct HttpListener {
    config: ListenerConfig,
    state: AppState,
}

impl HttpListener {
    pub fn new(config: ListenerConfig, state: AppState) -> Self {
        Self { config, state }
    }
}

#[async_trait::async_trait]
impl Module for HttpListener {
    async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.config.bind_address();
        let router = create_router(self.state.clone());

        tracing::info!("HTTP listener on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await
            .map_err(|e| BotError::Io(std::io::Error::other(e.to_string())))?;

        if shutdown.is_cancelled() {
            return Err(BotError::Cancelled);
        }
        Ok(())
    }
}
