//! 请求载荷存储 - 基础设施层
//!
//! 把每个工作单元的生成载荷以唯一键持久化，供后端在 TTL 内取用。
//! 键形如 `{batch_id}:{sequence}`，batch_id 每次调用全新生成，键绝不复用。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StoreError;
use crate::models::RequestKey;

/// 请求载荷存储
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 写入一个单元的载荷，`ttl` 过后后端不再能取到
    async fn put(&self, key: &RequestKey, payload: &Value, ttl: Duration)
        -> Result<(), StoreError>;
}

/// HTTP KV 存储
///
/// 对接 REST 风格的键值服务：`POST {base_url}/set`，
/// 请求体 `{key, value, ttl_seconds}`。
pub struct HttpRequestStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRequestStore {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl RequestStore for HttpRequestStore {
    async fn put(
        &self,
        key: &RequestKey,
        payload: &Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let key_str = key.to_string();
        let body = serde_json::json!({
            "key": key_str,
            "value": payload,
            "ttl_seconds": ttl.as_secs(),
        });

        let response = self
            .client
            .post(format!("{}/set", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::PutFailed {
                key: key_str.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::BadStatus {
                key: key_str,
                status: status.as_u16(),
            });
        }

        debug!("载荷已写入: {}", key_str);
        Ok(())
    }
}

/// 进程内存储
///
/// 仅用于本地调试和测试，带过期时间语义。
#[derive(Default)]
pub struct MemoryRequestStore {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取未过期的载荷（后端侧的消费接口）
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().expect("存储锁中毒");
        entries.get(key).and_then(|(value, expires_at)| {
            if Instant::now() < *expires_at {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("存储锁中毒").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn put(
        &self,
        key: &RequestKey,
        payload: &Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("存储锁中毒");
        entries.insert(key.to_string(), (payload.clone(), Instant::now() + ttl));
        Ok(())
    }
}
