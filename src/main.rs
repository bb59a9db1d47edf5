use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use quiz_generate::api::{self, AppState};
use quiz_generate::infrastructure::{
    Dispatcher, HttpDispatchTransport, HttpRequestStore, HttpTextExtractor, InMemoryNotifyHub,
    MemoryRequestStore, RequestStore,
};
use quiz_generate::orchestrator::{QuizOrchestrator, QuizPromptBuilder};
use quiz_generate::services::RateLimiter;
use quiz_generate::utils::logging;
use quiz_generate::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init()?;

    // 加载配置
    let config = Config::from_env();
    logging::log_startup(&config);

    // 组装服务
    let state = build_state(&config);

    // 启动 HTTP 服务
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("✓ 监听地址: {}", config.bind_addr);
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}

/// 显式构造所有客户端并注入编排器，不依赖任何全局单例
fn build_state(config: &Config) -> AppState {
    let client = reqwest::Client::new();

    let store: Arc<dyn RequestStore> = if config.store_url.is_empty() {
        info!("⚠️ 未配置 STORE_URL, 使用进程内存储（仅限本地调试）");
        Arc::new(MemoryRequestStore::new())
    } else {
        Arc::new(HttpRequestStore::new(
            client.clone(),
            config.store_url.clone(),
        ))
    };

    let limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config.rate_limit_window_seconds),
        config.rate_limit_max_requests,
    ));
    let notify = Arc::new(InMemoryNotifyHub::new());
    let transport = Arc::new(HttpDispatchTransport::new(
        client.clone(),
        config.backend_url.clone(),
        config.queue_url.clone(),
    ));

    let orchestrator = QuizOrchestrator::new(
        config,
        limiter,
        store,
        Dispatcher::new(transport),
        notify.clone(),
        Arc::new(QuizPromptBuilder::default()),
    );

    AppState {
        orchestrator: Arc::new(orchestrator),
        extractor: Arc::new(HttpTextExtractor::new(client)),
        notify,
    }
}
