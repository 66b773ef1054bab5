//! Axum server setup
//!
//! Server skeleton with:
//! - CORS restricted to one client origin, credentials allowed
//! - Identity resolved once per request
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::{self, Authenticator, JwtCookieAuth, TokenKeys, TOKEN_COOKIE};
use crate::db::{ChatRepo, ChatStore, MemoryStore, PostRepo, PostStore, UserRepo, UserStore};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8800)
    pub bind_addr: SocketAddr,

    /// The single origin allowed to make credentialed requests
    pub client_origin: String,

    /// Secret used to verify identity tokens
    pub jwt_secret: String,

    /// Cookie carrying the identity token
    pub cookie_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8800)),
            client_origin: "http://localhost:5173".to_string(),
            jwt_secret: String::new(),
            cookie_name: TOKEN_COOKIE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Authenticator verifying tokens signed with `jwt_secret`.
    pub fn authenticator(&self) -> Result<JwtCookieAuth, ServerError> {
        if self.jwt_secret.is_empty() {
            return Err(ServerError::MissingSecret);
        }
        let keys = TokenKeys::from_secret(self.jwt_secret.as_bytes());
        Ok(JwtCookieAuth::with_cookie(keys, self.cookie_name.clone()))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub chats: Arc<dyn ChatStore>,
    pub users: Arc<dyn UserStore>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    /// State backed by Postgres repositories.
    pub fn postgres(pool: PgPool, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            posts: Arc::new(PostRepo::new(pool.clone())),
            chats: Arc::new(ChatRepo::new(pool.clone())),
            users: Arc::new(UserRepo::new(pool)),
            auth,
        }
    }

    /// State backed by one in-memory store.
    pub fn in_memory(store: MemoryStore, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            posts: Arc::new(store.clone()),
            chats: Arc::new(store.clone()),
            users: Arc::new(store),
            auth,
        }
    }
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| ServerError::InvalidOrigin(origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the application router with all routes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = cors_layer(&config.client_origin)?;
    let identity = middleware::from_fn_with_state(state.auth.clone(), auth::resolve_identity);

    Ok(Router::new()
        .merge(routes::health::router())
        .merge(routes::posts::router())
        .merge(routes::chats::router())
        .merge(routes::messages::router())
        .merge(routes::users::router())
        .layer(identity)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let config = ServerConfig { jwt_secret: secret, ..Default::default() };
/// run_server(pool, config).await?;
/// ```
pub async fn run_server(pool: PgPool, config: ServerConfig) -> Result<(), ServerError> {
    let auth = Arc::new(config.authenticator()?);
    let state = AppState::postgres(pool, auth);
    let app = build_router(state, &config)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(origin = %config.client_origin, "Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid client origin: '{0}'")]
    InvalidOrigin(String),

    #[error("JWT secret must not be empty")]
    MissingSecret,
}
