//! 路径查找入口
//!
//! 先通过标题解析器把用户输入（标题或条目 URL）规范化为节点，
//! 再运行配置的搜索模式。

use std::sync::Arc;

use serde::Serialize;

use crate::core::{Node, SearchResult};
use crate::services::coordinator::{BidirectionalSearch, SearchOptions};
use crate::services::stats::SearchStats;
use crate::source::{EdgeSource, TitleResolver};

/// 一次查找的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindReport {
    pub source: Node,
    pub target: Node,
    pub path: Option<Vec<Node>>,
    pub stats: SearchStats,
}

impl FindReport {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// 路径查找器
pub struct PathFinder {
    resolver: Arc<dyn TitleResolver>,
    search: BidirectionalSearch,
}

impl PathFinder {
    pub fn new(
        resolver: Arc<dyn TitleResolver>,
        source: Arc<dyn EdgeSource>,
        options: SearchOptions,
    ) -> Self {
        Self {
            resolver,
            search: BidirectionalSearch::new(source, options),
        }
    }

    /// 同一个后端同时作为标题解析器和边数据源
    pub fn with_backend<B>(backend: Arc<B>, options: SearchOptions) -> Self
    where
        B: EdgeSource + TitleResolver + 'static,
    {
        Self::new(backend.clone(), backend, options)
    }

    pub fn options(&self) -> &SearchOptions {
        self.search.options()
    }

    /// 解析两个输入并查找路径
    ///
    /// 任一输入无法解析时返回 `NotFound`，搜索不会开始
    pub async fn find(&self, source: &str, target: &str) -> SearchResult<FindReport> {
        let (source, target) = tokio::try_join!(
            self.resolver.resolve(source),
            self.resolver.resolve(target)
        )?;

        let report = self.search.search(&source, &target).await?;
        Ok(FindReport {
            source,
            target,
            path: report.path,
            stats: report.stats,
        })
    }
}
