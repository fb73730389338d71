//! HTTP API server for the chat widget

pub mod chat;
mod error;
pub mod health;
pub mod rate_limit;
pub mod speak;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, response::Html, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::intent::IntentMatcher;
use crate::speech::SharedSpeech;

pub use error::ApiError;

/// Widget page served when no static directory is configured
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state for API handlers
pub struct ApiState {
    pub matcher: IntentMatcher,
    /// Present only when the provider's credentials are configured
    pub speech: Option<SharedSpeech>,
    /// Name of the configured provider, reported even when unconfigured
    pub speech_provider: &'static str,
    pub rate_limiter: Option<rate_limit::SharedLimiter>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    matcher: IntentMatcher,
    port: u16,
    speech: Option<SharedSpeech>,
    speech_provider: &'static str,
    static_dir: Option<PathBuf>,
    rate_limit_per_minute: Option<u32>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub const fn new(matcher: IntentMatcher, port: u16, speech_provider: &'static str) -> Self {
        Self {
            matcher,
            port,
            speech: None,
            speech_provider,
            static_dir: None,
            rate_limit_per_minute: None,
        }
    }

    /// Set the speech provider
    #[must_use]
    pub fn speech(mut self, provider: Option<SharedSpeech>) -> Self {
        self.speech = provider;
        self
    }

    /// Set the static files directory for serving the widget
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Enable global rate limiting
    #[must_use]
    pub const fn rate_limit(mut self, requests_per_minute: Option<u32>) -> Self {
        self.rate_limit_per_minute = requests_per_minute;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let rate_limiter = self.rate_limit_per_minute.map(rate_limit::create_limiter);

        let state = Arc::new(ApiState {
            matcher: self.matcher,
            speech: self.speech,
            speech_provider: self.speech_provider,
            rate_limiter,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(chat::router(self.state.clone()))
            .merge(speak::router(self.state.clone()))
            .merge(health::router(self.state.clone()));

        // Serve the widget from disk if configured, else the embedded page
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        } else {
            router = router.route("/", get(|| async { Html(INDEX_HTML) }));
        }

        let router = router.layer(axum::middleware::from_fn_with_state(
            self.state.clone(),
            rate_limit::rate_limit_middleware,
        ));

        // The widget is embedded into third-party pages
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            profile = %self.state.matcher.profile().id,
            speech = self.state.speech.is_some(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
