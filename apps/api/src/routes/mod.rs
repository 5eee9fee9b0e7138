pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::refinement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        // Refinement workflow
        .route(
            "/api/v1/sessions/:id/extract",
            post(handlers::handle_extract),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_answer),
        )
        .route("/api/v1/sessions/:id/refine", post(handlers::handle_refine))
        .with_state(state)
}
