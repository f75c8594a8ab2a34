use app_config::AppConfig;
use app_llm::ChatModel;
use app_rate_limit::RateLimiter;
use app_store::ArticleStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ArticleStore>,
    pub llm: Arc<dyn ChatModel>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}
