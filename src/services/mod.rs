//! 业务能力层（Services Layer）
//!
//! 描述"系统能做什么"，每个模块只提供一种能力：
//! - `unit_planner` - 把页面与题目数切分为有界工作单元
//! - `rate_limiter` - 滑动窗口准入控制
//! - `result_collector` - 异步结果的关联、去重与限时收集

pub mod rate_limiter;
pub mod result_collector;
pub mod unit_planner;

pub use rate_limiter::RateLimiter;
pub use result_collector::{ResultCollector, TimeoutPolicy};
pub use unit_planner::UnitPlanner;
