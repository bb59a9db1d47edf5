use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 输入参数非法（页数 / 题目数 / 页码越界等）
    InvalidInput(String),
    /// 超过滑动窗口内的请求上限
    RateExceeded {
        requested: usize,
        current: usize,
        limit: usize,
    },
    /// 请求载荷存储失败（整批中止）
    Store(StoreError),
    /// 触发后端处理失败（整批中止）
    Dispatch(DispatchError),
    /// 截止时间内未收齐结果
    CollectionTimeout { accepted: usize, expected: usize },
    /// 文档提取错误
    Extract(ExtractError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "输入参数非法: {}", msg),
            AppError::RateExceeded {
                requested,
                current,
                limit,
            } => {
                write!(
                    f,
                    "请求过多: 本次申请 {}, 窗口内已有 {}, 上限 {}",
                    requested, current, limit
                )
            }
            AppError::Store(e) => write!(f, "存储错误: {}", e),
            AppError::Dispatch(e) => write!(f, "调度错误: {}", e),
            AppError::CollectionTimeout { accepted, expected } => {
                write!(f, "结果收集超时: 已收到 {}/{} 条", accepted, expected)
            }
            AppError::Extract(e) => write!(f, "文档提取错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Dispatch(e) => Some(e),
            AppError::Extract(e) => Some(e),
            _ => None,
        }
    }
}

/// 存储相关错误
#[derive(Debug)]
pub enum StoreError {
    /// 写入请求失败
    PutFailed {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 存储端返回错误状态
    BadStatus { key: String, status: u16 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::PutFailed { key, source } => {
                write!(f, "写入失败 (key: {}): {}", key, source)
            }
            StoreError::BadStatus { key, status } => {
                write!(f, "存储端返回错误状态 (key: {}): {}", key, status)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::PutFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 调度相关错误
#[derive(Debug)]
pub enum DispatchError {
    /// 直连调用失败
    DirectCallFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 队列入队失败（任一批入队失败即整体失败）
    EnqueueFailed {
        batch_index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 对端返回错误状态
    BadStatus { endpoint: String, status: u16 },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::DirectCallFailed { endpoint, source } => {
                write!(f, "直连调用失败 ({}): {}", endpoint, source)
            }
            DispatchError::EnqueueFailed {
                batch_index,
                source,
            } => {
                write!(f, "第 {} 批消息入队失败: {}", batch_index + 1, source)
            }
            DispatchError::BadStatus { endpoint, status } => {
                write!(f, "对端返回错误状态 ({}): {}", endpoint, status)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::DirectCallFailed { source, .. }
            | DispatchError::EnqueueFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文档提取相关错误
#[derive(Debug)]
pub enum ExtractError {
    /// 下载源文档失败
    FetchFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档内容为空或文本不足
    EmptyContent { url: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::FetchFailed { url, source } => {
                write!(f, "下载源文档失败 ({}): {}", url, source)
            }
            ExtractError::EmptyContent { url } => {
                write!(f, "文档中没有可用文本: {}", url)
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::FetchFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储写入失败错误
    pub fn store_put_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Store(StoreError::PutFailed {
            key: key.into(),
            source: Box::new(source),
        })
    }

    /// 创建直连调用失败错误
    pub fn dispatch_direct_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Dispatch(DispatchError::DirectCallFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文档下载失败错误
    pub fn extract_fetch_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Extract(ExtractError::FetchFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 对应的 HTTP 状态码
    ///
    /// 映射关系：非法输入 400，限流与收集超时 429，存储/调度失败 502。
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::RateExceeded { .. } => 429,
            AppError::CollectionTimeout { .. } => 429,
            AppError::Store(_) | AppError::Dispatch(_) => 502,
            AppError::Extract(_) => 400,
            AppError::Other(_) => 500,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Dispatch(err)
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Extract(err)
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
