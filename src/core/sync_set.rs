//! 并发节点集合
//!
//! 记录某个搜索方向上已经扩展过的节点。判断与插入必须是同一个原子操作，
//! 否则两个并发发现者可能同时看到"未访问"并重复扩展同一节点。

use dashmap::DashSet;

use crate::core::types::Node;

/// 支持并发访问的节点集合，只增不减
#[derive(Debug, Default)]
pub struct SyncNodeSet {
    nodes: DashSet<Node>,
}

impl SyncNodeSet {
    pub fn new() -> Self {
        Self {
            nodes: DashSet::new(),
        }
    }

    /// 原子地插入节点
    ///
    /// 返回 `true` 表示调用者是第一个插入者，应当负责扩展该节点
    pub fn insert_if_absent(&self, node: Node) -> bool {
        self.nodes.insert(node)
    }

    /// 无条件插入
    pub fn insert(&self, node: Node) {
        self.nodes.insert(node);
    }

    /// 成员检查，只能作为预过滤使用，不能据此决定是否扩展
    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
