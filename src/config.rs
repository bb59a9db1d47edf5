/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 服务监听地址
    pub bind_addr: String,
    /// 限流滑动窗口长度（秒）
    pub rate_limit_window_seconds: u64,
    /// 滑动窗口内允许的最大请求数
    pub rate_limit_max_requests: usize,
    /// 一个批次压缩后的最大工作单元数
    pub max_units: usize,
    /// 单个工作单元的题目配额上限
    pub quota_cap: usize,
    /// 请求载荷在存储中的存活时间（秒）
    pub store_ttl_seconds: u64,
    /// 结果收集的截止时间（秒）
    pub collect_timeout_seconds: u64,
    /// 调度模式: "direct" 或 "queued"
    pub dispatch_mode: String,
    /// 直连模式的后端地址
    pub backend_url: String,
    /// 队列模式的入队地址
    pub queue_url: String,
    /// 存储端地址（为空时使用进程内存储，仅限本地调试）
    pub store_url: String,
    /// 收集超时后是否返回已收到的部分结果
    pub return_partial_on_timeout: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            rate_limit_window_seconds: 60,
            rate_limit_max_requests: 75,
            max_units: 10,
            quota_cap: 2,
            store_ttl_seconds: 600,
            collect_timeout_seconds: 40,
            dispatch_mode: "direct".to_string(),
            backend_url: "http://localhost:9000/invoke".to_string(),
            queue_url: String::new(),
            store_url: String::new(),
            return_partial_on_timeout: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(default.bind_addr),
            rate_limit_window_seconds: std::env::var("RATE_LIMIT_WINDOW_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.rate_limit_window_seconds),
            rate_limit_max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.rate_limit_max_requests),
            max_units: std::env::var("MAX_UNITS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_units),
            quota_cap: std::env::var("QUOTA_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(default.quota_cap),
            store_ttl_seconds: std::env::var("STORE_TTL_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.store_ttl_seconds),
            collect_timeout_seconds: std::env::var("TIME_OUT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.collect_timeout_seconds),
            dispatch_mode: std::env::var("DISPATCH_MODE").unwrap_or(default.dispatch_mode),
            backend_url: std::env::var("BACKEND_URL").unwrap_or(default.backend_url),
            queue_url: std::env::var("QUEUE_URL").unwrap_or(default.queue_url),
            store_url: std::env::var("STORE_URL").unwrap_or(default.store_url),
            return_partial_on_timeout: std::env::var("RETURN_PARTIAL_ON_TIMEOUT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.return_partial_on_timeout),
        }
    }
}
