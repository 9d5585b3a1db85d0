//! Route handlers for rollables-server
//!
//! - tables: directory listing (`GET /`) and raw retrieval (`GET /{*path}`)

pub mod tables;

use axum::{routing::get, Router};

use crate::state::AppState;

pub use tables::*;

/// Table routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tables::list_tables))
        .route("/{*path}", get(tables::get_table))
}
