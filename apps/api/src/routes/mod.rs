pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(session::handle_reset_session),
        )
        // Documents and retrieval
        .route(
            "/api/v1/sessions/:id/documents",
            post(session::handle_upload_documents)
                .get(session::handle_list_documents)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/sessions/:id/search", post(session::handle_search))
        // Conversation
        .route("/api/v1/sessions/:id/chat", post(assistant::handle_chat))
        .route(
            "/api/v1/sessions/:id/history",
            get(session::handle_get_history).delete(session::handle_clear_history),
        )
        .route("/api/v1/sessions/:id/rank", post(assistant::handle_rank))
        .with_state(state)
}
