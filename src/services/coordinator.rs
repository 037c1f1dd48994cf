//! 双向搜索协调器
//!
//! 持有两个方向的前沿扩展器，按到达顺序合并两侧的边，
//! 维护两张前驱表并检测相遇节点。相遇、出错或超时后触发取消，
//! 等待所有扩展任务退出，然后重建路径。

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::core::{CancelSignal, Direction, Node, SearchError, SearchResult, TaggedHop};
use crate::services::algorithm::{reconstruct_path, BidirectionalBfs, PredecessorMap};
use crate::services::explorer::{ExpansionPolicy, ExplorerOutput, FrontierExplorer};
use crate::services::stats::{SearchStats, StatsTimer};
use crate::source::EdgeSource;

/// 默认合并通道容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 搜索模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// 两侧并发竞速，找到的第一条路径即返回，不保证最短
    #[default]
    Race,
    /// 同步分层的双向BFS，保证最短路径
    Layered,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Race => f.write_str("race"),
            SearchMode::Layered => f.write_str("layered"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "race" => Ok(SearchMode::Race),
            "layered" => Ok(SearchMode::Layered),
            other => Err(SearchError::Config(format!("未知的搜索模式: {}", other))),
        }
    }
}

/// 搜索选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub policy: ExpansionPolicy,
    /// 每个方向输出通道的容量
    pub channel_capacity: usize,
    /// 超过该时长未得出结果则取消搜索
    pub deadline: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            policy: ExpansionPolicy::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            deadline: None,
        }
    }
}

impl SearchOptions {
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ExpansionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// 搜索结果：路径（`None` 表示两侧耗尽仍未相遇）和统计信息
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub path: Option<Vec<Node>>,
    pub stats: SearchStats,
}

/// 双向搜索
pub struct BidirectionalSearch {
    source: Arc<dyn EdgeSource>,
    options: SearchOptions,
}

impl BidirectionalSearch {
    pub fn new(source: Arc<dyn EdgeSource>, options: SearchOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// 查找从 `source` 到 `target` 的路径
    pub async fn find_path(&self, source: &Node, target: &Node) -> SearchResult<Option<Vec<Node>>> {
        Ok(self.search(source, target).await?.path)
    }

    /// 查找路径并返回统计信息
    pub async fn search(&self, source: &Node, target: &Node) -> SearchResult<SearchReport> {
        let timer = StatsTimer::start();

        if source == target {
            debug!("起点与终点相同: {}", source);
            let mut stats = SearchStats::default();
            timer.finish(&mut stats);
            return Ok(SearchReport {
                path: Some(vec![source.clone()]),
                stats,
            });
        }

        info!(
            "开始搜索 [{}]: {} -> {}",
            self.options.mode, source, target
        );

        let (result, mut stats) = match self.options.mode {
            SearchMode::Race => self.race(source, target).await,
            SearchMode::Layered => self.layered(source, target).await,
        };
        timer.finish(&mut stats);

        match &result {
            Ok(Some(path)) => info!("找到路径 (长度 {}), {}", path.len(), stats),
            Ok(None) => info!("{} 与 {} 之间不存在路径, {}", source, target, stats),
            Err(e) => warn!("搜索失败: {}, {}", e, stats),
        }

        result.map(|path| SearchReport { path, stats })
    }

    /// 并发竞速模式
    async fn race(&self, source: &Node, target: &Node) -> (SearchResult<Option<Vec<Node>>>, SearchStats) {
        let cancel = CancelSignal::new();
        // 搜索 future 被提前丢弃时同样停止两侧扩展
        let _cancel_on_drop = cancel.drop_guard();
        let forward = FrontierExplorer::new(
            Direction::Forward,
            self.source.clone(),
            self.options.policy,
            cancel.clone(),
        );
        let backward = FrontierExplorer::new(
            Direction::Backward,
            self.source.clone(),
            self.options.policy,
            cancel.clone(),
        );
        let forward_visited = forward.visited();
        let backward_visited = backward.visited();

        let capacity = self.options.channel_capacity;
        let (forward_rx, forward_task) = forward.spawn(source.clone(), capacity);
        let (backward_rx, backward_task) = backward.spawn(target.clone(), capacity);

        // 两侧输出按到达顺序合并
        let mut merged = tagged(forward_rx, Direction::Forward)
            .merge(tagged(backward_rx, Direction::Backward));

        let mut merge = MergeState::new(source.clone(), target.clone());
        let consumed = with_deadline(
            self.options.deadline,
            &cancel,
            merge.consume(&mut merged),
        )
        .await;

        // 停止所有扩展任务并等待它们退出
        cancel.cancel();
        drop(merged);
        let forward_joined = forward_task.await.map_err(SearchError::from).and_then(|r| r);
        let backward_joined = backward_task.await.map_err(SearchError::from).and_then(|r| r);

        let stats = SearchStats {
            forward_expanded: forward_visited.len(),
            backward_expanded: backward_visited.len(),
            hops_merged: merge.hops_merged,
            ..SearchStats::default()
        };

        let result = consumed.and_then(|meeting| {
            forward_joined?;
            backward_joined?;
            Ok(meeting.map(|meeting| {
                info!("两侧在 {} 处相遇", meeting);
                reconstruct_path(
                    &merge.forward,
                    &merge.backward,
                    &meeting,
                    &merge.source,
                    &merge.target,
                )
            }))
        });

        (result, stats)
    }

    /// 同步分层模式
    async fn layered(&self, source: &Node, target: &Node) -> (SearchResult<Option<Vec<Node>>>, SearchStats) {
        let concurrency = self.options.policy.concurrency().unwrap_or(usize::MAX);
        let bfs = BidirectionalBfs::new(self.source.clone(), concurrency);
        let cancel = CancelSignal::new();
        let _cancel_on_drop = cancel.drop_guard();

        let result = with_deadline(
            self.options.deadline,
            &cancel,
            bfs.shortest_path(source, target, &cancel),
        )
        .await;

        match result {
            Ok(outcome) => {
                let stats = SearchStats {
                    forward_expanded: outcome.forward_expanded,
                    backward_expanded: outcome.backward_expanded,
                    hops_merged: outcome.hops_merged,
                    ..SearchStats::default()
                };
                (Ok(outcome.path), stats)
            }
            Err(e) => (Err(e), SearchStats::default()),
        }
    }
}

/// 给扩展器输出的每条边打上方向标记
fn tagged(
    output: ExplorerOutput,
    direction: Direction,
) -> impl Stream<Item = SearchResult<TaggedHop>> + Unpin {
    ReceiverStream::new(output).map(move |item| item.map(|hop| TaggedHop::new(direction, hop)))
}

/// 在截止时间内等待 `work` 完成
///
/// 超时后触发取消信号并返回 `Timeout`，`work` 随之被丢弃
async fn with_deadline<T, F>(deadline: Option<Duration>, cancel: &CancelSignal, work: F) -> SearchResult<T>
where
    F: Future<Output = SearchResult<T>>,
{
    let Some(deadline) = deadline else {
        return work.await;
    };

    match tokio::time::timeout(deadline, work).await {
        Ok(result) => result,
        Err(_) => {
            warn!("搜索超过截止时间 {:?}，取消中", deadline);
            cancel.cancel();
            Err(SearchError::Timeout(deadline))
        }
    }
}

/// 合并阶段状态，只由协调者的合并循环持有
struct MergeState {
    source: Node,
    target: Node,
    forward: PredecessorMap,
    backward: PredecessorMap,
    hops_merged: usize,
}

impl MergeState {
    fn new(source: Node, target: Node) -> Self {
        Self {
            source,
            target,
            forward: PredecessorMap::new(),
            backward: PredecessorMap::new(),
            hops_merged: 0,
        }
    }

    /// 消费合并后的输出直到相遇、两侧都关闭或出现错误
    async fn consume<S>(&mut self, merged: &mut S) -> SearchResult<Option<Node>>
    where
        S: Stream<Item = SearchResult<TaggedHop>> + Unpin,
    {
        while let Some(tagged) = merged.next().await {
            if let Some(meeting) = self.record(tagged?) {
                return Ok(Some(meeting));
            }
        }

        Ok(None)
    }

    /// 记录一条边，返回相遇节点
    ///
    /// 前驱先写者胜，已记录的前驱不会被覆盖
    fn record(&mut self, tagged: TaggedHop) -> Option<Node> {
        self.hops_merged += 1;

        let (own, opposite, own_root, opposite_root) = match tagged.direction {
            Direction::Forward => (&mut self.forward, &self.backward, &self.source, &self.target),
            Direction::Backward => (&mut self.backward, &self.forward, &self.target, &self.source),
        };

        let discovered = tagged.discovered();
        if discovered == own_root {
            return None;
        }

        if !own.contains_key(discovered) {
            own.insert(discovered.clone(), tagged.predecessor().clone());
        }

        if discovered == opposite_root || opposite.contains_key(discovered) {
            Some(discovered.clone())
        } else {
            None
        }
    }
}
