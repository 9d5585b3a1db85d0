//! rollables-server: HTTP read API over a table root
//!
//! Two routes, both read-only:
//! - `GET /` lists entry ids (`?filter=` narrows, repeatable)
//! - `GET /{*path}` returns one table's raw text
//!
//! Any origin may call the API.

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use rollables_core::{Resolver, RollablesConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &RollablesConfig) -> Result<Self, ServerError> {
        let addr = format!("{}:{}", config.server.bind, config.server.port);
        let bind_addr = addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr))?;
        Ok(Self { bind_addr })
    }
}

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server; runs until the process is stopped
pub async fn serve(resolver: Resolver, config: ServerConfig) -> Result<(), ServerError> {
    let root = resolver.root().display().to_string();
    let app = build_router(AppState::new(resolver));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(root = %root, "Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}
