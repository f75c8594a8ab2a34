mod handlers;
pub mod routings;

use crate::routings::router;
use app_config::AppConfig;
use app_llm::OpenAiCompatibleClient;
use app_log::init_tracing;
use app_state::AppState;
use app_store::open_store;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::*;

pub async fn web_service() {
    dotenv().ok();
    let config = AppConfig::new();
    let bind = config.backend_bind.clone();
    init_tracing(config.log_level.clone());
    // Article store
    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(err) => panic!("Cannot open article store\n{}", err),
    };
    // Chat model
    let llm = match OpenAiCompatibleClient::new(&config) {
        Ok(client) => client,
        Err(err) => panic!("Cannot build chat client\n{}", err),
    };
    // Rate limiter
    let rate_limiter = match app_rate_limit::from_config(&config) {
        Ok(limiter) => limiter,
        Err(err) => panic!("Cannot build rate limiter\n{}", err),
    };
    // Generating AppState
    let app_state = Arc::new(AppState {
        config: config.clone(),
        store,
        llm: Arc::new(llm),
        rate_limiter,
    });
    // Loading Routes
    let routes = router(app_state);
    // Setup TCP Port
    let tcp_listener = match tokio::net::TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(err) => panic!("Cannot bind {}\n{}", &bind, err),
    };
    // Running Server ...
    info!("Serving web server on {}", &bind);
    if let Err(err) = axum::serve(tcp_listener, routes).await {
        error!("Web server stopped: {}", err);
    }
}
