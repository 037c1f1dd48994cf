//! 搜索统计
//!
//! 每次搜索结束时记录两侧扩展的节点数、合并的边数和耗时，
//! 写入日志并随 HTTP 响应返回。

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// 单次搜索的统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// 正向扩展的节点数
    pub forward_expanded: usize,
    /// 反向扩展的节点数
    pub backward_expanded: usize,
    /// 合并阶段处理的边数
    pub hops_merged: usize,
    pub elapsed_ms: u64,
}

impl SearchStats {
    pub fn expanded(&self) -> usize {
        self.forward_expanded + self.backward_expanded
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "正向扩展 {} 个节点, 反向扩展 {} 个节点, 合并 {} 条边, 耗时 {}ms",
            self.forward_expanded, self.backward_expanded, self.hops_merged, self.elapsed_ms
        )
    }
}

/// 搜索计时器
#[derive(Debug, Clone, Copy)]
pub struct StatsTimer {
    started: Instant,
}

impl StatsTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// 结束计时，把耗时写入统计
    pub fn finish(self, stats: &mut SearchStats) {
        stats.elapsed_ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
    }
}
