//! Table routes - directory listing and raw table retrieval

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use rollables_core::{filter_entries, EntryId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET / response
#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryResponse {
    pub directory: Vec<EntryId>,
}

/// GET / - list entries, optionally narrowed by repeated `filter` params
#[instrument(skip(state))]
pub async fn list_tables(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<DirectoryResponse>> {
    let filters = parse_filters(query.as_deref());
    let entries = tokio::task::spawn_blocking(move || state.resolver().index()).await??;
    let directory = filter_entries(entries, &filters);

    tracing::debug!(count = directory.len(), filters = ?filters, "listed tables");
    Ok(Json(DirectoryResponse { directory }))
}

/// GET /{*path} - raw text of one table
#[instrument(skip(state))]
pub async fn get_table(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<String> {
    let content = tokio::task::spawn_blocking(move || state.resolver().retrieve(&path)).await??;
    Ok(content)
}

/// Collect every `filter` value from a raw query string.
///
/// `filter` may appear zero, one or many times; the result is always a flat
/// list. `+` decodes to a space, percent escapes are decoded, other keys are
/// ignored.
pub fn parse_filters(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key)? == "filter")
                .then(|| decode_component(value))
                .flatten()
        })
        .collect()
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            tracing::debug!(raw, error = %e, "dropping undecodable query component");
            None
        }
    }
}
