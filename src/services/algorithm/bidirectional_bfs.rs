//! 双向BFS算法模块
//!
//! 同步分层的双向广度优先搜索：每一轮完整扩展较小一侧前沿的一整层，
//! 层内节点并发查询，层与层之间同步。找到相遇节点时返回的路径保证最短，
//! 代价是吞吐量低于并发竞速模式。

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;

use crate::core::{CancelSignal, Direction, Hop, Node, SearchError, SearchResult};
use crate::services::algorithm::reconstruct::{reconstruct_path, PredecessorMap};
use crate::source::EdgeSource;

/// 分层搜索的结果
#[derive(Debug, Clone, Default)]
pub struct LayeredOutcome {
    pub path: Option<Vec<Node>>,
    pub forward_expanded: usize,
    pub backward_expanded: usize,
    pub hops_merged: usize,
}

/// 一侧的搜索状态
struct Side {
    direction: Direction,
    predecessors: PredecessorMap,
    depth: HashMap<Node, usize>,
    frontier: Vec<Node>,
    expanded: usize,
}

impl Side {
    fn new(direction: Direction, root: &Node) -> Self {
        let mut depth = HashMap::new();
        depth.insert(root.clone(), 0);
        Self {
            direction,
            predecessors: PredecessorMap::new(),
            depth,
            frontier: vec![root.clone()],
            expanded: 0,
        }
    }
}

/// 双向BFS算法结构体
pub struct BidirectionalBfs {
    source: Arc<dyn EdgeSource>,
    concurrency: usize,
}

impl BidirectionalBfs {
    pub fn new(source: Arc<dyn EdgeSource>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// 使用双向BFS查找最短路径
    /// 从起点和终点同时开始BFS，直到两个搜索前沿相遇
    pub async fn shortest_path(
        &self,
        start: &Node,
        target: &Node,
        cancel: &CancelSignal,
    ) -> SearchResult<LayeredOutcome> {
        if start == target {
            return Ok(LayeredOutcome {
                path: Some(vec![start.clone()]),
                ..LayeredOutcome::default()
            });
        }

        let mut forward = Side::new(Direction::Forward, start);
        let mut backward = Side::new(Direction::Backward, target);
        let mut hops_merged = 0;

        while !forward.frontier.is_empty() && !backward.frontier.is_empty() {
            // 每次扩展节点数较少的一侧
            let expand_forward = forward.frontier.len() <= backward.frontier.len();
            let (side, other) = if expand_forward {
                (&mut forward, &backward)
            } else {
                (&mut backward, &forward)
            };

            let layer = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                layer = self.expand_layer(&side.frontier, side.direction) => layer?,
            };
            side.expanded += side.frontier.len();
            hops_merged += layer.iter().map(|(_, hops)| hops.len()).sum::<usize>();

            let meeting = Self::merge_layer(side, other, layer);
            if let Some(meeting) = meeting {
                debug!("分层搜索在 {} 处相遇", meeting);
                let path = reconstruct_path(
                    &forward.predecessors,
                    &backward.predecessors,
                    &meeting,
                    start,
                    target,
                );
                return Ok(LayeredOutcome {
                    path: Some(path),
                    forward_expanded: forward.expanded,
                    backward_expanded: backward.expanded,
                    hops_merged,
                });
            }
        }

        Ok(LayeredOutcome {
            path: None,
            forward_expanded: forward.expanded,
            backward_expanded: backward.expanded,
            hops_merged,
        })
    }

    /// 并发查询一整层节点，返回每个节点的全部边
    async fn expand_layer(
        &self,
        frontier: &[Node],
        direction: Direction,
    ) -> SearchResult<Vec<(Node, Vec<Hop>)>> {
        let source = self.source.as_ref();
        stream::iter(frontier.iter().cloned())
            .map(move |node| async move {
                let hops: Vec<Hop> = source.query(&node, direction).try_collect().await?;
                Ok::<_, SearchError>((node, hops))
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }

    /// 合并一层扩展结果，返回该层中总深度最小的相遇节点
    fn merge_layer(side: &mut Side, other: &Side, layer: Vec<(Node, Vec<Hop>)>) -> Option<Node> {
        let mut next_frontier = Vec::new();
        let mut best: Option<(usize, Node)> = None;

        for (parent, hops) in layer {
            let parent_depth = side.depth.get(&parent).copied().unwrap_or(0);

            for hop in hops {
                let neighbor = side.direction.far(&hop).clone();
                if neighbor.is_marker() || side.depth.contains_key(&neighbor) {
                    continue;
                }

                let depth = parent_depth + 1;
                side.depth.insert(neighbor.clone(), depth);
                side.predecessors.insert(neighbor.clone(), parent.clone());

                // 检查是否遇到另一侧的搜索
                if let Some(other_depth) = other.depth.get(&neighbor) {
                    let total = depth + other_depth;
                    if best.as_ref().map_or(true, |(length, _)| total < *length) {
                        best = Some((total, neighbor.clone()));
                    }
                }

                next_frontier.push(neighbor);
            }
        }

        side.frontier = next_frontier;
        best.map(|(_, node)| node)
    }
}
