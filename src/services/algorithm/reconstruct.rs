//! 路径重建
//!
//! 从相遇节点出发，沿正向前驱表走回起点，沿反向前驱表走到终点，
//! 拼接成起点到终点的完整路径。

use std::collections::HashMap;

use crate::core::Node;

/// 前驱表：节点 → 首次发现该节点的边的另一端
pub type PredecessorMap = HashMap<Node, Node>;

/// 重建完整路径
///
/// 前驱表缺失节点或存在环属于程序不变量被破坏，直接 panic，不会无限循环。
pub fn reconstruct_path(
    forward: &PredecessorMap,
    backward: &PredecessorMap,
    meeting: &Node,
    source: &Node,
    target: &Node,
) -> Vec<Node> {
    let mut path = walk(forward, meeting, source, "正向");
    path.reverse();

    // 跳过 meeting 本身，避免在拼接处重复
    let tail = walk(backward, meeting, target, "反向");
    path.extend(tail.into_iter().skip(1));
    path
}

/// 从 `from` 沿前驱表走到 `to`，返回经过的节点（含两端）
fn walk(predecessors: &PredecessorMap, from: &Node, to: &Node, label: &str) -> Vec<Node> {
    let mut nodes = vec![from.clone()];
    let mut current = from;

    while current != to {
        assert!(
            nodes.len() <= predecessors.len() + 1,
            "{}前驱表存在环: 从 {} 出发无法到达 {}",
            label,
            from,
            to
        );
        current = predecessors
            .get(current)
            .unwrap_or_else(|| panic!("{}前驱表缺少节点 {}", label, current));
        nodes.push(current.clone());
    }

    nodes
}
