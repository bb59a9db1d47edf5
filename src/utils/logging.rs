use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化与格式化的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志（env-filter 控制级别，默认 info）
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
    Ok(())
}

/// 记录服务启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 服务启动 - 测验生成协调器");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "📊 限流: {} 次 / {} 秒",
        config.rate_limit_max_requests, config.rate_limit_window_seconds
    );
    info!(
        "📦 最大单元数: {}, 配额上限: {}",
        config.max_units, config.quota_cap
    );
    info!("🚚 调度模式: {}", config.dispatch_mode);
    info!(
        "⏱️ 收集截止: {} 秒, 载荷 TTL: {} 秒",
        config.collect_timeout_seconds, config.store_ttl_seconds
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
