//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是系统的"指挥中心"，把底层能力组合为一次完整的生成调用。
//!
//! ## 层次关系
//!
//! ```text
//! quiz_orchestrator (一次生成调用)
//!     ↓
//! services (能力层：unit_planner / rate_limiter / result_collector)
//!     ↓
//! infrastructure (基础设施：request_store / dispatcher / notify)
//! ```
//!
//! ## 设计原则
//!
//! 1. **显式注入**：所有外部客户端由调用方构造并传入
//! 2. **向下依赖**：编排层 → services → infrastructure
//! 3. **无业务校验**：只做调度、组合与统计，具体规则在能力层

pub mod payload;
pub mod quiz_orchestrator;

pub use payload::{PayloadBuilder, QuizPromptBuilder};
pub use quiz_orchestrator::QuizOrchestrator;
