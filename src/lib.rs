//! # Quiz Generate
//!
//! 一个从源文档生成测验题的 Rust 服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有对外部系统的访问能力
//! - `RequestStore` - 请求载荷的时限性持久化
//! - `Dispatcher` - 触发后端处理（直连 / 分批入队）
//! - `NotifyChannel` - 结果通知频道的有界等待抽象
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `UnitPlanner` - 把页面与题目数切分为有界工作单元
//! - `RateLimiter` - 滑动窗口准入控制
//! - `ResultCollector` - 异步结果的去重与限时收集
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 一次生成调用的完整流程
//! - 规划 → 准入 → 持久化 → 触发 → 收集 → 重组
//!
//! ### ④ 接口层（API）
//! - `api/` - HTTP 端点与错误状态码映射
//!
//! ## 协调模型
//!
//! ```text
//! UnitPlanner ──单元──▶ RequestStore（并发写入载荷）
//!                 │
//!                 └────▶ Dispatcher（直连 / 入队触发后端）
//!
//! 后端（进程外）──结果──▶ NotifyChannel ──▶ ResultCollector ──▶ 重组响应
//! ```
//!
//! 结果的关联完全依赖载荷中嵌入、结果中回传的序号，
//! 与派发顺序和到达顺序都无关。

pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{
    DispatchMode, Dispatcher, InMemoryNotifyHub, MemoryRequestStore, NotifyChannel, RequestStore,
};
pub use models::{BatchId, GenerateRequest, GenerateResponse, PageText, WorkUnit};
pub use orchestrator::{PayloadBuilder, QuizOrchestrator, QuizPromptBuilder};
pub use services::{RateLimiter, ResultCollector, TimeoutPolicy, UnitPlanner};
