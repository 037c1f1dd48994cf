//! 核心数据类型
//!
//! 定义搜索过程中使用的节点、边和方向

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wikipedia 跟随重定向时返回的占位条目，不是真实节点
pub const MARKER_TITLES: [&str; 2] = ["H:L", "H:S"];

/// 图节点：规范化后的条目标题
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(String);

impl Node {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否为需要从遍历中排除的占位标记
    pub fn is_marker(&self) -> bool {
        MARKER_TITLES.contains(&self.0.as_str())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Node {
    fn from(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl From<String> for Node {
    fn from(title: String) -> Self {
        Self(title)
    }
}

impl AsRef<str> for Node {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 一条链接：`from` 页面上出现了指向 `to` 的链接
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    pub from: Node,
    pub to: Node,
}

impl Hop {
    pub fn new(from: impl Into<Node>, to: impl Into<Node>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// 搜索方向
///
/// 正向沿链接目标扩展（从起点出发），反向沿链接来源扩展（从终点出发）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// 获取反向方向
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// 该方向上由这条边新发现的节点
    pub fn far<'a>(&self, hop: &'a Hop) -> &'a Node {
        match self {
            Direction::Forward => &hop.to,
            Direction::Backward => &hop.from,
        }
    }

    /// 该方向上这条边的出发节点，即新节点的前驱
    pub fn near<'a>(&self, hop: &'a Hop) -> &'a Node {
        match self {
            Direction::Forward => &hop.from,
            Direction::Backward => &hop.to,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// 带方向标记的边，用于合并阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedHop {
    pub direction: Direction,
    pub hop: Hop,
}

impl TaggedHop {
    pub fn new(direction: Direction, hop: Hop) -> Self {
        Self { direction, hop }
    }

    /// 这条边是否来自起点一侧
    pub fn from_source_side(&self) -> bool {
        self.direction == Direction::Forward
    }

    pub fn discovered(&self) -> &Node {
        self.direction.far(&self.hop)
    }

    pub fn predecessor(&self) -> &Node {
        self.direction.near(&self.hop)
    }
}
