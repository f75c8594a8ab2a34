use app_dto::{
    chat::{ChatPostInput, ChatPostOutput},
    search::RateLimitQueryInput,
};
use app_error::AppError;
use app_prompt::build_prompt;
use app_rate_limit::{RateLimitStatus, user_key};
use app_state::AppState;
use axum::extract::{Json, Query, State};
use std::sync::Arc;
use tracing::*;

pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(args): Json<ChatPostInput>,
) -> Result<Json<ChatPostOutput>, AppError> {
    if args.message.trim().is_empty() {
        return Err(AppError::bad_request("Message is required"));
    }
    let user = user_key(args.user_id.as_deref());
    let quota = state.rate_limiter.acquire(user).await;
    if !quota.allowed {
        info!("Rate limit reached for {}", user);
        return Err(AppError::rate_limited(format!(
            "Limit of {} messages per {} reached. Please try again later.",
            quota.limit,
            window_label(state.config.rate_limit_window_secs)
        )));
    }

    let prompt = build_prompt(
        state.store.as_ref(),
        &args.message,
        &args.history,
        args.include_knowledge_base,
        args.include_community_qa,
    )
    .await;
    let response = match state.llm.chat(None, &prompt).await {
        Ok(response) => response,
        Err(e) => {
            // An unanswered message does not count against the quota.
            state.rate_limiter.release(user).await;
            return Err(e);
        }
    };
    debug!("Answered {} with {} chars", user, response.len());
    Ok(Json(ChatPostOutput {
        response,
        remaining: quota.remaining,
    }))
}

fn window_label(secs: u64) -> String {
    match secs {
        86_400 => "day".to_string(),
        3_600 => "hour".to_string(),
        s if s % 3_600 == 0 => format!("{} hours", s / 3_600),
        s => format!("{} seconds", s),
    }
}

pub async fn get_rate_limit(
    State(state): State<Arc<AppState>>,
    Query(args): Query<RateLimitQueryInput>,
) -> Json<RateLimitStatus> {
    let user = user_key(args.user_id.as_deref());
    Json(state.rate_limiter.status(user).await)
}
