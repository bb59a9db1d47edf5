//! 测验生成编排器 - 编排层
//!
//! ## 职责
//!
//! 把各能力组合为一次完整调用：
//!
//! ```text
//! 规划 → 准入 → 并发持久化 → 触发后端 → 限时收集 → 校验重组 → 重新编号
//! ```
//!
//! ## 设计特点
//!
//! - **显式注入**：存储、调度、通知等客户端全部由构造方传入，
//!   没有任何模块级全局状态，测试时可整体替换为假实现
//! - **无局部吞错**：每个单元的持久化结果先显式收集，再统一决定
//!   中止还是继续；批次级错误原样向上传播
//! - **顺序无关**：结果关联只依赖序号，与到达顺序无关

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, StoreError};
use crate::infrastructure::{DispatchMode, Dispatcher, NotifyChannel, RequestStore};
use crate::models::{
    BatchId, GenerateResponse, GeneratedResult, PageText, Problem, RequestKey, WorkUnit,
};
use crate::orchestrator::payload::PayloadBuilder;
use crate::services::{RateLimiter, ResultCollector, TimeoutPolicy, UnitPlanner};
use crate::utils::parse_generated_problem_set;

/// 测验生成编排器
pub struct QuizOrchestrator {
    planner: UnitPlanner,
    limiter: Arc<RateLimiter>,
    store: Arc<dyn RequestStore>,
    dispatcher: Dispatcher,
    collector: ResultCollector,
    payload_builder: Arc<dyn PayloadBuilder>,
    dispatch_mode: DispatchMode,
    store_ttl: Duration,
    collect_timeout: Duration,
}

impl QuizOrchestrator {
    /// 组装编排器
    ///
    /// 所有外部客户端显式传入；配置只读取一次。
    pub fn new(
        config: &Config,
        limiter: Arc<RateLimiter>,
        store: Arc<dyn RequestStore>,
        dispatcher: Dispatcher,
        notify: Arc<dyn NotifyChannel>,
        payload_builder: Arc<dyn PayloadBuilder>,
    ) -> Self {
        let policy = if config.return_partial_on_timeout {
            TimeoutPolicy::ReturnPartial
        } else {
            TimeoutPolicy::FailFast
        };

        Self {
            planner: UnitPlanner::new(config.max_units, config.quota_cap),
            limiter,
            store,
            dispatcher,
            collector: ResultCollector::new(notify, policy),
            payload_builder,
            dispatch_mode: DispatchMode::parse(&config.dispatch_mode),
            store_ttl: Duration::from_secs(config.store_ttl_seconds),
            collect_timeout: Duration::from_secs(config.collect_timeout_seconds),
        }
    }

    /// 生成一批测验题
    ///
    /// # 参数
    /// - `pages`: 提取好的页面文本
    /// - `item_count`: 目标题目数
    ///
    /// # 返回
    /// 按序号重组、重新编号后的题目列表
    pub async fn generate(&self, pages: &PageText, item_count: usize) -> AppResult<GenerateResponse> {
        // 1. 规划工作单元
        let units = self.planner.plan(pages.page_count(), item_count)?;
        info!(
            "📋 规划完成: {} 页 / {} 题 → {} 个工作单元",
            pages.page_count(),
            item_count,
            units.len()
        );

        // 2. 准入控制，超限立即失败
        self.limiter.admit(units.len()).await?;

        // 3. 并发持久化所有载荷，任一失败整批中止
        let batch_id = BatchId::new();
        let keys: Vec<RequestKey> = (1..=units.len())
            .map(|i| RequestKey::new(batch_id.clone(), i))
            .collect();
        self.store_payloads(&units, &keys, pages).await?;

        // 4. 触发后端处理
        let key_strings: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.dispatcher
            .trigger(&batch_id, &key_strings, self.dispatch_mode)
            .await?;
        info!("🚚 批次已触发: {} ({} 个单元)", batch_id, units.len());

        // 5. 限时收集结果
        let results = self
            .collector
            .collect(&batch_id, units.len(), self.collect_timeout)
            .await?;
        info!("✓ 收集完成: {} 条结果", results.len());

        // 6-7. 校验、重组、重新编号
        Ok(assemble_response(&units, results))
    }

    /// 并发写入全部载荷
    ///
    /// 显式收集每个单元的写入结果后再决定中止：一个没有载荷的
    /// 单元永远不可能产生结果，所以不重试、快速失败。
    async fn store_payloads(
        &self,
        units: &[WorkUnit],
        keys: &[RequestKey],
        pages: &PageText,
    ) -> AppResult<()> {
        let puts = units.iter().zip(keys).map(|(unit, key)| {
            let payload = self.payload_builder.build(unit, key.sequence_index, pages);
            async move { self.store.put(key, &payload, self.store_ttl).await }
        });
        let outcomes: Vec<Result<(), StoreError>> = futures::future::join_all(puts).await;

        let mut first_err: Option<StoreError> = None;
        for (key, outcome) in keys.iter().zip(outcomes) {
            if let Err(e) = outcome {
                error!("❌ 载荷写入失败 (key: {}): {}", key, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e.into());
        }
        Ok(())
    }
}

/// 把收集到的结果重组为最终响应
///
/// - 序号映射回单元的引用页，回填题目来源
/// - 结构校验失败的结果整条丢弃（不致命）
/// - 幸存题目按序号顺序展平后重新编号 1..N
fn assemble_response(units: &[WorkUnit], results: Vec<GeneratedResult>) -> GenerateResponse {
    let mut problems: Vec<Problem> = Vec::new();

    for result in results {
        let unit = match result.sequence.checked_sub(1).and_then(|i| units.get(i)) {
            Some(u) => u,
            None => {
                warn!("结果序号越界，丢弃: {}", result.sequence);
                continue;
            }
        };

        let Some(set) = parse_generated_problem_set(&result.generated_text) else {
            warn!("第 {} 个单元的结果未通过结构校验，丢弃", result.sequence);
            continue;
        };

        for mut problem in set.quiz {
            problem.source_pages = unit.referenced_pages.clone();
            problems.push(problem);
        }
    }

    for (i, problem) in problems.iter_mut().enumerate() {
        problem.number = i + 1;
    }

    GenerateResponse {
        title: "自动生成测验".to_string(),
        problems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(pages: Vec<usize>) -> WorkUnit {
        WorkUnit::new(pages, 1)
    }

    fn valid_quiz(title: &str) -> String {
        serde_json::json!({
            "quiz": [{
                "number": 99,
                "title": title,
                "selections": [
                    {"content": "对", "correct": true},
                    {"content": "错", "correct": false},
                ],
                "explanation": "解析",
            }]
        })
        .to_string()
    }

    #[test]
    fn test_assemble_orders_and_renumbers() {
        let units = vec![unit(vec![1, 2]), unit(vec![3])];
        // 结果乱序到达
        let results = vec![
            GeneratedResult {
                sequence: 2,
                generated_text: valid_quiz("乙题"),
            },
            GeneratedResult {
                sequence: 1,
                generated_text: valid_quiz("甲题"),
            },
        ];
        // 收集器已排序，这里模拟排序后的输入
        let mut sorted = results;
        sorted.sort_by_key(|r| r.sequence);

        let response = assemble_response(&units, sorted);

        assert_eq!(response.problems.len(), 2);
        assert_eq!(response.problems[0].title, "甲题");
        assert_eq!(response.problems[0].number, 1);
        assert_eq!(response.problems[0].source_pages, vec![1, 2]);
        assert_eq!(response.problems[1].title, "乙题");
        assert_eq!(response.problems[1].number, 2);
        assert_eq!(response.problems[1].source_pages, vec![3]);
    }

    #[test]
    fn test_assemble_drops_invalid_entries() {
        let units = vec![unit(vec![1]), unit(vec![2]), unit(vec![3])];
        let results = vec![
            GeneratedResult {
                sequence: 1,
                generated_text: "不是 JSON 的输出".to_string(),
            },
            GeneratedResult {
                sequence: 2,
                generated_text: valid_quiz("幸存题"),
            },
            // 序号越界
            GeneratedResult {
                sequence: 9,
                generated_text: valid_quiz("越界题"),
            },
        ];

        let response = assemble_response(&units, results);

        assert_eq!(response.problems.len(), 1);
        assert_eq!(response.problems[0].title, "幸存题");
        assert_eq!(response.problems[0].number, 1);
    }

    #[test]
    fn test_assemble_zero_sequence_is_dropped() {
        let units = vec![unit(vec![1])];
        let results = vec![GeneratedResult {
            sequence: 0,
            generated_text: valid_quiz("非法序号"),
        }];

        let response = assemble_response(&units, results);
        assert!(response.problems.is_empty());
    }
}
