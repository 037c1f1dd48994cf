//! 前沿扩展器
//!
//! 驱动一个方向上的前沿扩展：消费边数据源，经并发节点集合去重，
//! 把新发现的边推送到输出通道，并为新节点调度扩展任务。
//! 输出通道在可达图耗尽或收到取消信号后关闭。
//!
//! 远程查询失败不会被吞掉，错误作为 `Err` 写入输出通道交给协调者处理。

pub mod scheduler;

use std::sync::Arc;

use futures::StreamExt;
use log::{debug, error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::{CancelSignal, Direction, Hop, Node, SearchResult, SyncNodeSet};
use crate::source::EdgeSource;

pub use scheduler::{ExpansionPolicy, Spawner, TaskScheduler, DEFAULT_WORKERS};

/// 扩展器输出：按到达顺序产生的边，或导致搜索中止的错误
pub type ExplorerOutput = mpsc::Receiver<SearchResult<Hop>>;

/// 单方向前沿扩展器
pub struct FrontierExplorer {
    direction: Direction,
    source: Arc<dyn EdgeSource>,
    visited: Arc<SyncNodeSet>,
    policy: ExpansionPolicy,
    cancel: CancelSignal,
}

struct ExpandContext {
    direction: Direction,
    source: Arc<dyn EdgeSource>,
    visited: Arc<SyncNodeSet>,
    out: mpsc::Sender<SearchResult<Hop>>,
    cancel: CancelSignal,
}

impl FrontierExplorer {
    pub fn new(
        direction: Direction,
        source: Arc<dyn EdgeSource>,
        policy: ExpansionPolicy,
        cancel: CancelSignal,
    ) -> Self {
        Self {
            direction,
            source,
            visited: Arc::new(SyncNodeSet::new()),
            policy,
            cancel,
        }
    }

    /// 该方向的已访问集合，搜索结束后可用于统计
    pub fn visited(&self) -> Arc<SyncNodeSet> {
        self.visited.clone()
    }

    /// 从 `start` 开始扩展
    ///
    /// 返回边的输出通道和驱动任务句柄。驱动任务在所有扩展任务结束后退出，
    /// 之后输出通道关闭。
    pub fn spawn(self, start: Node, capacity: usize) -> (ExplorerOutput, JoinHandle<SearchResult<()>>) {
        let (out, receiver) = mpsc::channel(capacity.max(1));
        let context = Arc::new(ExpandContext {
            direction: self.direction,
            source: self.source,
            visited: self.visited,
            out,
            cancel: self.cancel.clone(),
        });

        let scheduler = TaskScheduler::new(self.policy, self.cancel);
        let handle = tokio::spawn(async move {
            scheduler
                .run(start, move |node, spawner| expand(context.clone(), node, spawner))
                .await
        });

        (receiver, handle)
    }
}

/// 扩展单个节点
async fn expand(context: Arc<ExpandContext>, node: Node, spawner: Spawner<Node>) {
    if !context.visited.insert_if_absent(node.clone()) {
        return;
    }

    // 等待调度期间可能已经取消
    if context.cancel.is_cancelled() {
        return;
    }

    debug!("扩展节点 [{}]: {}", context.direction, node);

    let mut hops = context.source.query(&node, context.direction);
    loop {
        let next = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => return,
            next = hops.next() => next,
        };

        let hop = match next {
            None => return,
            Some(Ok(hop)) => hop,
            Some(Err(e)) => {
                error!("节点 {} 的{}查询失败: {}", node, direction_label(context.direction), e);
                tokio::select! {
                    biased;
                    _ = context.cancel.cancelled() => {}
                    _ = context.out.send(Err(e)) => {}
                }
                return;
            }
        };

        let far = context.direction.far(&hop).clone();
        if far.is_marker() {
            continue;
        }

        let delivered = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => false,
            sent = context.out.send(Ok(hop)) => sent.is_ok(),
        };
        if !delivered {
            return;
        }

        // 仅作预过滤，真正的去重在任务开始时由 insert_if_absent 完成
        if !context.visited.contains(&far) {
            spawner.schedule(far);
        }
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Forward => "正向",
        Direction::Backward => "反向",
    }
}
