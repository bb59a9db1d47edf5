//! 通知频道 - 基础设施层
//!
//! ## 设计
//!
//! 把"挂起直到消息到达"的发布/订阅循环抽象为一个显式的有界等待原语，
//! 不耦合任何具体消息中间件的阻塞迭代 API。收集器只依赖
//! `Subscription::recv`，换用外部 broker 时仅需替换 `NotifyChannel` 实现。
//!
//! 退订保证：`Subscription` 在显式调用或被丢弃时退订，且恰好一次。
//! 收集任务被取消时由 Drop 兜底，订阅不会泄漏。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// 结果通知频道
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// 订阅一个频道，返回该频道的消息流
    async fn subscribe(&self, channel: &str) -> Subscription;

    /// 向频道发布一条消息，返回收到消息的订阅者数量
    async fn publish(&self, channel: &str, payload: String) -> usize;
}

/// 一次订阅
///
/// 持有频道的接收端与退订回调。退订恰好执行一次：
/// 显式调用 `unsubscribe` 或在 Drop 时触发，后执行的一方为空操作。
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<String>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<String>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// 等待下一条消息；频道被销毁时返回 `None`
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// 退订（幂等）
    pub fn unsubscribe(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

type Registry = Mutex<HashMap<String, HashMap<u64, mpsc::UnboundedSender<String>>>>;

/// 进程内通知枢纽
///
/// 默认实现：订阅者按频道注册，发布即广播。
/// 后端通过 HTTP 桥接端点把结果发布进来（见 api 模块）。
#[derive(Default)]
pub struct InMemoryNotifyHub {
    registry: Arc<Registry>,
    next_id: AtomicU64,
}

impl InMemoryNotifyHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前频道的订阅者数量
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry
            .lock()
            .expect("通知注册表锁中毒")
            .get(channel)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl NotifyChannel for InMemoryNotifyHub {
    async fn subscribe(&self, channel: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut registry = self.registry.lock().expect("通知注册表锁中毒");
            registry
                .entry(channel.to_string())
                .or_default()
                .insert(id, tx);
        }
        debug!("订阅频道: {} (id: {})", channel, id);

        let registry = Arc::clone(&self.registry);
        let channel_name = channel.to_string();
        Subscription::new(rx, move || {
            let mut registry = registry.lock().expect("通知注册表锁中毒");
            if let Some(subs) = registry.get_mut(&channel_name) {
                subs.remove(&id);
                if subs.is_empty() {
                    registry.remove(&channel_name);
                }
            }
            debug!("退订频道: {} (id: {})", channel_name, id);
        })
    }

    async fn publish(&self, channel: &str, payload: String) -> usize {
        let registry = self.registry.lock().expect("通知注册表锁中毒");
        let Some(subs) = registry.get(channel) else {
            return 0;
        };

        let mut delivered = 0;
        for tx in subs.values() {
            if tx.send(payload.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}
