//! 滑动窗口限流器 - 业务能力层
//!
//! 准入控制：限制滑动时间窗口内在途的生成请求总数。
//! 不排队、不等待，超限立即失败并携带 `(requested, current, limit)`。

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 滑动窗口限流器
///
/// 整个进程共享一个实例，是跨调用唯一的共享可变状态。
/// "清理 → 检查 → 记录"三步在同一把锁内完成，
/// 并发调用不可能同时通过只剩一个名额的检查。
pub struct RateLimiter {
    window: Duration,
    limit: usize,
    /// 窗口内的准入时间戳队列，队首最老
    requests: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: usize) -> Self {
        Self {
            window,
            limit,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    /// 申请 n 个名额
    ///
    /// 成功时在窗口内记录 n 个时间戳；失败时不产生任何副作用。
    pub async fn admit(&self, n: usize) -> AppResult<()> {
        let now = Instant::now();
        let window_start = now - self.window;

        let mut requests = self.requests.lock().await;

        // 清理窗口外的旧时间戳
        while let Some(&front) = requests.front() {
            if front < window_start {
                requests.pop_front();
            } else {
                break;
            }
        }

        let current = requests.len();
        if current + n > self.limit {
            return Err(AppError::RateExceeded {
                requested: n,
                current,
                limit: self.limit,
            });
        }

        for _ in 0..n {
            requests.push_back(now);
        }
        debug!("准入 {} 个请求, 窗口内共 {}/{}", n, requests.len(), self.limit);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_limit_then_reject_then_recover() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 5);

        // 上限内的顺序申请全部成功
        for _ in 0..5 {
            limiter.admit(1).await.unwrap();
        }

        // 窗口内的第 6 次申请失败
        let err = limiter.admit(1).await.unwrap_err();
        match err {
            AppError::RateExceeded {
                requested,
                current,
                limit,
            } => {
                assert_eq!(requested, 1);
                assert_eq!(current, 5);
                assert_eq!(limit, 5);
            }
            other => panic!("预期 RateExceeded, 实际: {}", other),
        }

        // 窗口滑过之后恢复准入
        tokio::time::advance(Duration::from_secs(61)).await;
        limiter.admit(1).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_admit_counts_as_n() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 10);

        limiter.admit(7).await.unwrap();
        // 剩余名额不足 4 个
        assert!(limiter.admit(4).await.is_err());
        // 失败不占用名额
        limiter.admit(3).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_admit_only_one_wins() {
        // 只剩一个名额时，两个并发申请最多成功一个
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), 1));

        let a = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.admit(1).await.is_ok() })
        };
        let b = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.admit(1).await.is_ok() })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a ^ b, "两个并发申请只能成功一个");
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_entries_pruned() {
        let limiter = RateLimiter::new(Duration::from_secs(30), 2);

        limiter.admit(2).await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        // 旧时间戳已滑出窗口，满额申请应当成功
        limiter.admit(2).await.unwrap();
    }
}
