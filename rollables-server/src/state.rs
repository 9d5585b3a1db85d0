//! Application state shared across handlers

use rollables_core::Resolver;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    resolver: Resolver,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            inner: Arc::new(AppStateInner { resolver }),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.inner.resolver
    }
}
