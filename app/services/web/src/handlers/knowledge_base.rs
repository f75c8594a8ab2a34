use app_dto::search::{LimitInput, SearchQueryInput, clamp_limit};
use app_error::AppError;
use app_schema::knowledge::KnowledgeArticle;
use app_search::knowledge::{SearchResult, search_knowledge_base};
use app_state::AppState;
use axum::extract::{Json, Path, Query, State};
use std::sync::Arc;
use tracing::*;
use uuid::Uuid;

pub async fn get_search(
    State(state): State<Arc<AppState>>,
    Query(args): Query<SearchQueryInput>,
) -> Json<Vec<SearchResult>> {
    let outcome =
        search_knowledge_base(state.store.as_ref(), &args.q, clamp_limit(args.limit)).await;
    for failure in outcome.failures() {
        warn!("Knowledge search degraded ({}): {}", failure.source, failure.message);
    }
    Json(outcome.into_hits())
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(args): Query<LimitInput>,
) -> Result<Json<Vec<KnowledgeArticle>>, AppError> {
    let res = state
        .store
        .knowledge_by_category(&category, clamp_limit(args.limit))
        .await?;
    debug!("{} articles in {}", res.len(), &category);
    Ok(Json(res))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<KnowledgeArticle>, AppError> {
    match state.store.knowledge_by_id(id).await? {
        Some(article) => Ok(Json(article)),
        None => Err(AppError::not_found(format!("Article {} not found", id))),
    }
}
