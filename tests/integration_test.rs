//! 端到端集成测试
//!
//! 用进程内假实现替换外部系统：存储用 MemoryRequestStore，
//! 通知用 InMemoryNotifyHub，调度传输换成"回环后端"——
//! 收到触发后读取已存储的载荷，把结果发布回通知频道，
//! 模拟真实的进程外生成后端。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use quiz_generate::error::{AppError, DispatchError, StoreError};
use quiz_generate::infrastructure::{
    DispatchMode, DispatchTransport, Dispatcher, InMemoryNotifyHub, MemoryRequestStore,
    NotifyChannel, QueueEntry, RequestStore,
};
use quiz_generate::models::RequestKey;
use quiz_generate::orchestrator::{QuizOrchestrator, QuizPromptBuilder};
use quiz_generate::services::RateLimiter;
use quiz_generate::{Config, PageText};

/// 回环后端：触发后读取载荷并把结果发布回通知频道
struct LoopbackBackend {
    store: Arc<MemoryRequestStore>,
    hub: Arc<InMemoryNotifyHub>,
    /// 模拟某个单元的后端失败（不发布任何消息）
    skip_sequence: Option<usize>,
    /// 模拟通知重复投递
    duplicate_delivery: bool,
}

impl LoopbackBackend {
    fn process_keys(&self, keys: &[String]) {
        let store = self.store.clone();
        let hub = self.hub.clone();
        let skip = self.skip_sequence;
        let duplicate = self.duplicate_delivery;
        let keys = keys.to_vec();

        tokio::spawn(async move {
            for key in keys {
                let Some((batch_id, seq)) = key.rsplit_once(':') else {
                    continue;
                };
                let sequence: usize = seq.parse().unwrap();
                if skip == Some(sequence) {
                    continue;
                }

                // 载荷必须已经持久化，否则后端无事可做
                assert!(store.get(&key).is_some(), "载荷缺失: {}", key);

                let channel = format!("notify:{}", batch_id);
                // 等待收集器完成订阅
                while hub.subscriber_count(&channel) == 0 {
                    tokio::task::yield_now().await;
                }

                let message = serde_json::json!({
                    "sequence": sequence,
                    "generated_text": quiz_text(sequence),
                })
                .to_string();

                hub.publish(&channel, message.clone()).await;
                if duplicate {
                    hub.publish(&channel, message).await;
                }
            }
        });
    }
}

#[async_trait]
impl DispatchTransport for LoopbackBackend {
    async fn call_direct(
        &self,
        keys: &[String],
        _mode: DispatchMode,
    ) -> Result<(), DispatchError> {
        self.process_keys(keys);
        Ok(())
    }

    async fn enqueue_batch(
        &self,
        _batch_index: usize,
        entries: &[QueueEntry],
    ) -> Result<(), DispatchError> {
        let keys: Vec<String> = entries.iter().map(|e| e.body.clone()).collect();
        self.process_keys(&keys);
        Ok(())
    }
}

/// 只记录调用、从不触发后端的传输
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<usize>,
}

#[async_trait]
impl DispatchTransport for RecordingTransport {
    async fn call_direct(
        &self,
        _keys: &[String],
        _mode: DispatchMode,
    ) -> Result<(), DispatchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn enqueue_batch(
        &self,
        _batch_index: usize,
        _entries: &[QueueEntry],
    ) -> Result<(), DispatchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }
}

/// 指定序号写入失败的存储
struct FlakyStore {
    inner: MemoryRequestStore,
    fail_sequence: usize,
}

#[async_trait]
impl RequestStore for FlakyStore {
    async fn put(
        &self,
        key: &RequestKey,
        payload: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        if key.sequence_index == self.fail_sequence {
            return Err(StoreError::BadStatus {
                key: key.to_string(),
                status: 500,
            });
        }
        self.inner.put(key, payload, ttl).await
    }
}

fn quiz_text(sequence: usize) -> String {
    serde_json::json!({
        "quiz": [{
            "number": 0,
            "title": format!("第 {} 单元的题目", sequence),
            "selections": [
                {"content": "对", "correct": true},
                {"content": "错", "correct": false},
            ],
            "explanation": "解析内容",
        }]
    })
    .to_string()
}

fn test_config() -> Config {
    Config {
        max_units: 4,
        quota_cap: 2,
        collect_timeout_seconds: 2,
        ..Config::default()
    }
}

fn ten_pages() -> PageText {
    PageText::new((1..=10).map(|i| format!("第 {} 页的讲义内容", i)).collect())
}

fn build_orchestrator(
    config: &Config,
    store: Arc<dyn RequestStore>,
    hub: Arc<InMemoryNotifyHub>,
    transport: Arc<dyn DispatchTransport>,
    limit: usize,
) -> QuizOrchestrator {
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), limit));
    QuizOrchestrator::new(
        config,
        limiter,
        store,
        Dispatcher::new(transport),
        hub,
        Arc::new(QuizPromptBuilder::default()),
    )
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_direct_mode() {
    let store = Arc::new(MemoryRequestStore::new());
    let hub = Arc::new(InMemoryNotifyHub::new());
    let backend = Arc::new(LoopbackBackend {
        store: store.clone(),
        hub: hub.clone(),
        skip_sequence: None,
        duplicate_delivery: false,
    });

    let orchestrator = build_orchestrator(&test_config(), store.clone(), hub, backend, 75);
    let response = orchestrator.generate(&ten_pages(), 4).await.unwrap();

    // 4 个单元各产出一题，按序号排列并重新编号
    assert_eq!(response.problems.len(), 4);
    for (i, problem) in response.problems.iter().enumerate() {
        assert_eq!(problem.number, i + 1);
        assert_eq!(problem.title, format!("第 {} 单元的题目", i + 1));
    }

    // 来源页回填自规划出的单元区间
    assert_eq!(response.problems[0].source_pages, vec![1, 2, 3]);
    assert_eq!(response.problems[1].source_pages, vec![4, 5]);
    assert_eq!(response.problems[2].source_pages, vec![6, 7, 8]);
    assert_eq!(response.problems[3].source_pages, vec![9, 10]);

    // 每个单元的载荷都写入过存储
    assert_eq!(store.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_queued_mode() {
    let store = Arc::new(MemoryRequestStore::new());
    let hub = Arc::new(InMemoryNotifyHub::new());
    let backend = Arc::new(LoopbackBackend {
        store: store.clone(),
        hub: hub.clone(),
        skip_sequence: None,
        duplicate_delivery: false,
    });

    let config = Config {
        dispatch_mode: "queued".to_string(),
        max_units: 12,
        quota_cap: 0,
        ..test_config()
    };
    let orchestrator = build_orchestrator(&config, store, hub, backend, 75);

    // 12 页 12 题 → 12 个单元，队列模式分两批入队
    let pages = PageText::new((1..=12).map(|i| format!("第 {} 页", i)).collect());
    let response = orchestrator.generate(&pages, 12).await.unwrap();
    assert_eq!(response.problems.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_delivery_deduplicated() {
    let store = Arc::new(MemoryRequestStore::new());
    let hub = Arc::new(InMemoryNotifyHub::new());
    let backend = Arc::new(LoopbackBackend {
        store: store.clone(),
        hub: hub.clone(),
        skip_sequence: None,
        duplicate_delivery: true,
    });

    let orchestrator = build_orchestrator(&test_config(), store, hub, backend, 75);
    let response = orchestrator.generate(&ten_pages(), 4).await.unwrap();

    // 每条结果被投递两次，去重后仍是 4 题
    assert_eq!(response.problems.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_missing_result_times_out_without_partial() {
    let store = Arc::new(MemoryRequestStore::new());
    let hub = Arc::new(InMemoryNotifyHub::new());
    let backend = Arc::new(LoopbackBackend {
        store: store.clone(),
        hub: hub.clone(),
        skip_sequence: Some(2),
        duplicate_delivery: false,
    });

    let orchestrator = build_orchestrator(&test_config(), store, hub, backend, 75);
    let err = orchestrator.generate(&ten_pages(), 4).await.unwrap_err();

    // 快速失败：不返回已收到的 3 条部分结果
    match err {
        AppError::CollectionTimeout { accepted, expected } => {
            assert_eq!(accepted, 3);
            assert_eq!(expected, 4);
        }
        other => panic!("预期 CollectionTimeout, 实际: {}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_aborts_before_dispatch() {
    let hub = Arc::new(InMemoryNotifyHub::new());
    let store = Arc::new(FlakyStore {
        inner: MemoryRequestStore::new(),
        fail_sequence: 2,
    });
    let transport = Arc::new(RecordingTransport::default());

    let orchestrator =
        build_orchestrator(&test_config(), store, hub, transport.clone(), 75);
    let err = orchestrator.generate(&ten_pages(), 4).await.unwrap_err();

    assert!(matches!(err, AppError::Store(_)));
    // 载荷未全部落盘时绝不触发后端
    assert_eq!(*transport.calls.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_rejects_whole_batch() {
    let hub = Arc::new(InMemoryNotifyHub::new());
    let store = Arc::new(MemoryRequestStore::new());
    let transport = Arc::new(RecordingTransport::default());

    // 上限 2，批次需要 4 个名额
    let orchestrator =
        build_orchestrator(&test_config(), store.clone(), hub, transport.clone(), 2);
    let err = orchestrator.generate(&ten_pages(), 4).await.unwrap_err();

    assert!(matches!(err, AppError::RateExceeded { .. }));
    // 限流发生在持久化与触发之前
    assert!(store.is_empty());
    assert_eq!(*transport.calls.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_input_rejected_immediately() {
    let hub = Arc::new(InMemoryNotifyHub::new());
    let store = Arc::new(MemoryRequestStore::new());
    let transport = Arc::new(RecordingTransport::default());

    let orchestrator = build_orchestrator(&test_config(), store, hub, transport, 75);

    let empty = PageText::new(vec![]);
    let err = orchestrator.generate(&empty, 4).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = orchestrator.generate(&ten_pages(), 0).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}
