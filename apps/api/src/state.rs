use std::sync::Arc;

use crate::llm_client::ModelGateway;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model gateway. Production wires `LlmClient`; tests wire doubles.
    pub llm: Arc<dyn ModelGateway>,
    pub sessions: SessionStore,
}
