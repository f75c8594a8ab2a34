use app_dto::search::{SearchQueryInput, TagQueryInput, clamp_limit};
use app_error::AppError;
use app_schema::community::{CommunityMatch, CommunityStats};
use app_search::community::search_community_qa;
use app_state::AppState;
use axum::extract::{Json, Query, State};
use std::sync::Arc;
use tracing::*;

pub async fn get_search(
    State(state): State<Arc<AppState>>,
    Query(args): Query<SearchQueryInput>,
) -> Json<Vec<CommunityMatch>> {
    let outcome =
        search_community_qa(state.store.as_ref(), &args.q, clamp_limit(args.limit)).await;
    for failure in outcome.failures() {
        warn!("Community search degraded ({}): {}", failure.source, failure.message);
    }
    Json(outcome.into_hits())
}

pub async fn get_by_tags(
    State(state): State<Arc<AppState>>,
    Query(args): Query<TagQueryInput>,
) -> Result<Json<Vec<CommunityMatch>>, AppError> {
    let tags = args.tag_list();
    if tags.is_empty() {
        return Err(AppError::bad_request("At least one tag is required"));
    }
    let res = state
        .store
        .community_by_tags(&tags, clamp_limit(args.limit))
        .await?;
    Ok(Json(res))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommunityStats>, AppError> {
    let res = state.store.community_stats().await?;
    Ok(Json(res))
}
