//! 调度器 - 基础设施层
//!
//! 触发后端消费已存储的载荷，两种可互换的策略：
//! - **direct**: 一次调用把完整键列表直接发给后端端点
//! - **queued**: 把键按固定大小（≤10，传输层硬约束）分批入队，
//!   每批携带等于 batch_id 的分组标记，保证分组感知队列内的批次有序
//!
//! 任何载荷内容都不会经由调度器回流，结果只从通知频道到达。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::models::BatchId;

/// 队列模式单次网络调用的最大消息数（传输层硬约束，不可调）
pub const QUEUE_BATCH_SIZE: usize = 10;

/// 调度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Direct,
    Queued,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Direct => "direct",
            DispatchMode::Queued => "queued",
        }
    }

    /// 从配置字符串解析，无法识别时回退到 direct
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => DispatchMode::Queued,
            "direct" => DispatchMode::Direct,
            other => {
                tracing::warn!("未知的调度模式 '{}', 回退到 direct", other);
                DispatchMode::Direct
            }
        }
    }
}

/// 队列消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub id: String,
    pub body: String,
    pub group_id: String,
}

/// 调度传输层
///
/// 隔离具体网络实现，测试时可注入记录型假实现。
#[async_trait]
pub trait DispatchTransport: Send + Sync {
    /// 直连：一次调用携带完整键列表
    async fn call_direct(&self, keys: &[String], mode: DispatchMode) -> Result<(), DispatchError>;

    /// 入队：发送一批（≤10 条）队列消息
    async fn enqueue_batch(
        &self,
        batch_index: usize,
        entries: &[QueueEntry],
    ) -> Result<(), DispatchError>;
}

/// 调度器
pub struct Dispatcher {
    transport: Arc<dyn DispatchTransport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn DispatchTransport>) -> Self {
        Self { transport }
    }

    /// 触发一个批次的后端处理
    ///
    /// 队列模式下任一批入队失败即整体失败；此时部分消息可能已经入队，
    /// 由收集器的截止时间兜底。
    pub async fn trigger(
        &self,
        batch_id: &BatchId,
        keys: &[String],
        mode: DispatchMode,
    ) -> Result<(), DispatchError> {
        match mode {
            DispatchMode::Direct => {
                debug!("直连触发: {} 个键", keys.len());
                self.transport.call_direct(keys, mode).await?;
            }
            DispatchMode::Queued => {
                let group_id = batch_id.to_string();
                for (batch_index, chunk) in keys.chunks(QUEUE_BATCH_SIZE).enumerate() {
                    let entries: Vec<QueueEntry> = chunk
                        .iter()
                        .enumerate()
                        .map(|(j, key)| QueueEntry {
                            id: j.to_string(),
                            body: key.clone(),
                            group_id: group_id.clone(),
                        })
                        .collect();

                    self.transport.enqueue_batch(batch_index, &entries).await?;
                    info!("✓ 第 {} 批入队完成: {} 条消息", batch_index + 1, entries.len());
                }
            }
        }
        Ok(())
    }
}

/// HTTP 调度传输
///
/// 直连模式 POST `{keys, mode}` 到后端端点；
/// 队列模式 POST `{entries}` 到入队端点。
pub struct HttpDispatchTransport {
    client: reqwest::Client,
    backend_url: String,
    queue_url: String,
}

impl HttpDispatchTransport {
    pub fn new(client: reqwest::Client, backend_url: String, queue_url: String) -> Self {
        Self {
            client,
            backend_url,
            queue_url,
        }
    }
}

#[async_trait]
impl DispatchTransport for HttpDispatchTransport {
    async fn call_direct(&self, keys: &[String], mode: DispatchMode) -> Result<(), DispatchError> {
        let body = serde_json::json!({
            "keys": keys,
            "mode": mode.as_str(),
        });

        let response = self
            .client
            .post(&self.backend_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::DirectCallFailed {
                endpoint: self.backend_url.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BadStatus {
                endpoint: self.backend_url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn enqueue_batch(
        &self,
        batch_index: usize,
        entries: &[QueueEntry],
    ) -> Result<(), DispatchError> {
        let body = serde_json::json!({ "entries": entries });

        let response = self
            .client
            .post(&self.queue_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::EnqueueFailed {
                batch_index,
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BadStatus {
                endpoint: self.queue_url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
