//! HTTP API for Ember Chat

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::gateway::CompletionGateway;
use crate::store::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub gateway: Arc<dyn CompletionGateway>,
}

impl AppState {
    pub fn new(store: SessionStore, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { store, gateway }
    }
}
