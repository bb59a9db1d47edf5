//! 结果收集器 - 业务能力层
//!
//! ## 职责
//!
//! 订阅批次的通知频道，接收后端异步回传的生成结果，
//! 按序号去重，收齐期望数量或到达截止时间后停止。
//!
//! ## 状态机
//!
//! ```text
//! INIT → SUBSCRIBED → RECEIVING → {DONE | TIMED_OUT} → UNSUBSCRIBED(终态)
//! ```
//!
//! 退订在所有退出路径上执行（成功、超时、任务被取消），
//! 取消路径由 `Subscription` 的 Drop 兜底。
//!
//! ## 超时策略
//!
//! 默认 fail-fast：截止时间到达即整体失败，不返回已收到的部分结果。
//! `TimeoutPolicy::ReturnPartial` 可切换为返回部分结果。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::NotifyChannel;
use crate::models::{BatchId, GeneratedResult};
use crate::utils::truncate_text;

/// 截止时间到达时的处置策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// 丢弃已收到的部分结果，整体失败（默认）
    FailFast,
    /// 返回已收到的部分结果
    ReturnPartial,
}

/// 结果收集器
pub struct ResultCollector {
    notify: Arc<dyn NotifyChannel>,
    policy: TimeoutPolicy,
}

impl ResultCollector {
    pub fn new(notify: Arc<dyn NotifyChannel>, policy: TimeoutPolicy) -> Self {
        Self { notify, policy }
    }

    /// 收集一个批次的结果
    ///
    /// # 参数
    /// - `batch_id`: 批次标识，决定订阅的频道
    /// - `expected_count`: 期望收到的结果条数
    /// - `deadline`: 从现在起的截止时长
    ///
    /// # 返回
    /// 按序号升序排列的去重结果；超时时按策略处置。
    pub async fn collect(
        &self,
        batch_id: &BatchId,
        expected_count: usize,
        deadline: Duration,
    ) -> AppResult<Vec<GeneratedResult>> {
        let channel = batch_id.notify_channel();
        let mut subscription = self.notify.subscribe(&channel).await;
        let deadline_at = Instant::now() + deadline;

        let mut seen_sequences = HashSet::new();
        let mut results: Vec<GeneratedResult> = Vec::new();

        let completed = loop {
            // 成功条件先于截止时间判断：两者同一时刻满足时算成功
            if results.len() >= expected_count {
                break true;
            }

            match tokio::time::timeout_at(deadline_at, subscription.recv()).await {
                Ok(Some(raw)) => {
                    debug!("收到消息: {}", truncate_text(&raw, 120));
                    let result: GeneratedResult = match serde_json::from_str(&raw) {
                        Ok(r) => r,
                        Err(e) => {
                            // 控制消息或坏消息体：丢弃，不致命
                            warn!("消息体无法解析，丢弃: {}", e);
                            continue;
                        }
                    };

                    if !seen_sequences.insert(result.sequence) {
                        warn!("检测到重复序号，丢弃: {}", result.sequence);
                        continue;
                    }
                    results.push(result);
                }
                // 频道被销毁，不可能再有结果到达
                Ok(None) => {
                    warn!("通知频道已关闭: {}", channel);
                    break false;
                }
                Err(_) => break false,
            }
        };

        // 终态前的强制清理（取消路径由 Drop 兜底）
        subscription.unsubscribe();

        results.sort_by_key(|r| r.sequence);

        if completed {
            debug!("收集完成: {}/{} 条", results.len(), expected_count);
            return Ok(results);
        }

        match self.policy {
            TimeoutPolicy::ReturnPartial => {
                warn!(
                    "⚠️ 收集超时，按策略返回部分结果: {}/{} 条",
                    results.len(),
                    expected_count
                );
                Ok(results)
            }
            TimeoutPolicy::FailFast => Err(AppError::CollectionTimeout {
                accepted: results.len(),
                expected: expected_count,
            }),
        }
    }
}
