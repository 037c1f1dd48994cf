//! 边数据源
//!
//! 搜索核心只依赖这里定义的两个接口：
//! - `EdgeSource`：按节点和方向惰性地产生链接序列，分页对调用者透明
//! - `TitleResolver`：把用户输入的标题或 URL 规范化为节点

pub mod mediawiki;
pub mod memory;
pub mod throttle;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::{Direction, Hop, Node, SearchResult};

pub use mediawiki::MediaWikiClient;
pub use memory::InMemoryGraph;
pub use throttle::Throttle;

/// 一个节点在某个方向上的链接流
pub type HopStream<'a> = BoxStream<'a, SearchResult<Hop>>;

/// 链接查询接口
///
/// 正向查询返回 `node` 页面上的所有链接（`from == node`），
/// 反向查询返回所有链接到 `node` 的页面（`to == node`）。
/// 丢弃返回的流即中止尚未完成的远程请求。
pub trait EdgeSource: Send + Sync {
    fn query<'a>(&'a self, node: &'a Node, direction: Direction) -> HopStream<'a>;
}

/// 标题规范化接口
#[async_trait]
pub trait TitleResolver: Send + Sync {
    /// 解析标题或条目 URL，无法解析时返回 `SearchError::NotFound`
    async fn resolve(&self, input: &str) -> SearchResult<Node>;
}
