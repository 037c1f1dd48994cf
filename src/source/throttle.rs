//! 全局请求节流
//!
//! 所有并发查询共享同一个节流器，保证总请求速率不超过配置值。
//! 等待许可是可取消的挂起点：调用者丢弃 `acquire` 的 future 即放弃等待。

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// 固定间隔的单许可节流器
#[derive(Debug)]
pub struct Throttle {
    /// 第一次请求许可时才创建计时器，构造时不要求处于运行时内
    interval: Mutex<Option<Interval>>,
    period: Duration,
}

impl Throttle {
    /// 创建节流器，`requests_per_second` 为 0 时不限速
    pub fn new(requests_per_second: u32) -> Self {
        if requests_per_second == 0 {
            return Self::unlimited();
        }

        Self {
            interval: Mutex::new(None),
            period: Duration::from_secs(1) / requests_per_second,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            interval: Mutex::new(None),
            period: Duration::ZERO,
        }
    }

    /// 两次许可之间的最小间隔
    pub fn period(&self) -> Duration {
        self.period
    }

    /// 等待下一个许可
    pub async fn acquire(&self) {
        if self.period.is_zero() {
            return;
        }

        let mut guard = self.interval.lock().await;
        let interval = guard.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now(), self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_throttle_spaces_permits() {
        let throttle = Throttle::new(10);
        assert_eq!(throttle.period(), Duration::from_millis(100));

        let start = Instant::now();
        for _ in 0..5 {
            throttle.acquire().await;
        }
        // 第一个许可立即发放，其余每个间隔 100ms
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_shared_between_tasks() {
        let throttle = Arc::new(Throttle::new(20));
        let start = Instant::now();

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move {
                    throttle.acquire().await;
                    throttle.acquire().await;
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task should not panic");
        }

        // 8 个许可，间隔 50ms
        assert_eq!(start.elapsed(), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_unlimited_throttle() {
        let throttle = Throttle::new(0);
        assert_eq!(throttle.period(), Duration::ZERO);
        for _ in 0..100 {
            throttle.acquire().await;
        }
    }
}
