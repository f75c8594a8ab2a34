use crate::handlers::{chat::*, community, index::*, knowledge_base};
use app_state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_index))
        .nest(
            "/api/ai-agent",
            Router::new()
                .route("/chat", post(post_chat))
                .route("/rate-limit", get(get_rate_limit)),
        )
        .nest(
            "/api/knowledge-base",
            Router::new()
                .route("/search", get(knowledge_base::get_search))
                .route("/category/{category}", get(knowledge_base::get_category))
                .route("/article/{id}", get(knowledge_base::get_article)),
        )
        .nest(
            "/api/community-qa",
            Router::new()
                .route("/search", get(community::get_search))
                .route("/tags", get(community::get_by_tags))
                .route("/stats", get(community::get_stats)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
