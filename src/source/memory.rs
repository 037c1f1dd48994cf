//! 内存链接图
//!
//! 由边列表构建的 `EdgeSource`，反向索引来自同一组边。
//! 支持分页、人工延迟、故障注入和查询计数，主要用于测试。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};

use crate::core::{Direction, Hop, Node, SearchError, SearchResult};
use crate::source::{EdgeSource, HopStream, TitleResolver};

/// 内存链接图
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    forward: HashMap<Node, Vec<Node>>,
    backward: HashMap<Node, Vec<Node>>,
    nodes: HashSet<Node>,
    page_size: Option<usize>,
    latency: Option<Duration>,
    failing: HashSet<Node>,
    queries: AtomicUsize,
    pages: AtomicUsize,
    per_node: DashMap<(Node, Direction), usize>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `(from, to)` 边列表构建
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<Node>,
        B: Into<Node>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    pub fn add_edge(&mut self, from: impl Into<Node>, to: impl Into<Node>) {
        let from = from.into();
        let to = to.into();
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.backward
            .entry(to.clone())
            .or_default()
            .push(from.clone());
        self.forward.entry(from).or_default().push(to);
    }

    /// 每页返回的边数，每一页计为一次远程请求
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// 每页请求的人工延迟
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 查询该节点时返回远程查询错误
    pub fn fail_on(mut self, node: impl Into<Node>) -> Self {
        self.failing.insert(node.into());
        self
    }

    pub fn has_edge(&self, from: &Node, to: &Node) -> bool {
        self.forward
            .get(from)
            .map(|targets| targets.contains(to))
            .unwrap_or(false)
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// 已发起的查询次数（每个节点每个方向的一次 `query` 调用计一次）
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// 已请求的页数
    pub fn page_count(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }

    pub fn queries_for(&self, node: &Node, direction: Direction) -> usize {
        self.per_node
            .get(&(node.clone(), direction))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// 所有被查询过的节点及次数
    pub fn query_log(&self) -> Vec<((Node, Direction), usize)> {
        self.per_node
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    fn hops_for(&self, node: &Node, direction: Direction) -> Vec<Hop> {
        match direction {
            Direction::Forward => self
                .forward
                .get(node)
                .map(|targets| {
                    targets
                        .iter()
                        .map(|to| Hop::new(node.clone(), to.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            Direction::Backward => self
                .backward
                .get(node)
                .map(|sources| {
                    sources
                        .iter()
                        .map(|from| Hop::new(from.clone(), node.clone()))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl EdgeSource for InMemoryGraph {
    fn query<'a>(&'a self, node: &'a Node, direction: Direction) -> HopStream<'a> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.per_node.entry((node.clone(), direction)).or_insert(0) += 1;

        if self.failing.contains(node) {
            let err = SearchError::remote(node.as_str(), "injected failure");
            return stream::once(async move { Err(err) }).boxed();
        }

        let hops = self.hops_for(node, direction);
        let page_size = self.page_size.unwrap_or_else(|| hops.len().max(1));
        let pages: Vec<Vec<Hop>> = if hops.is_empty() {
            vec![Vec::new()]
        } else {
            hops.chunks(page_size).map(<[Hop]>::to_vec).collect()
        };

        stream::iter(pages)
            .then(move |page| async move {
                if let Some(latency) = self.latency {
                    tokio::time::sleep(latency).await;
                }
                self.pages.fetch_add(1, Ordering::SeqCst);
                stream::iter(page.into_iter().map(Ok))
            })
            .flatten()
            .boxed()
    }
}

#[async_trait]
impl TitleResolver for InMemoryGraph {
    async fn resolve(&self, input: &str) -> SearchResult<Node> {
        let node = Node::from(input.trim().replace('_', " "));
        if node.as_str().is_empty() || !self.nodes.contains(&node) {
            return Err(SearchError::NotFound(input.to_string()));
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn sample_graph() -> InMemoryGraph {
        InMemoryGraph::from_edges([("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")])
    }

    #[tokio::test]
    async fn test_forward_and_backward_queries() {
        let graph = sample_graph();

        let forward: Vec<Hop> = graph
            .query(&Node::from("A"), Direction::Forward)
            .try_collect()
            .await
            .expect("query should succeed");
        assert_eq!(forward, vec![Hop::new("A", "B"), Hop::new("A", "C")]);

        let backward: Vec<Hop> = graph
            .query(&Node::from("D"), Direction::Backward)
            .try_collect()
            .await
            .expect("query should succeed");
        assert_eq!(backward, vec![Hop::new("B", "D"), Hop::new("C", "D")]);

        assert_eq!(graph.query_count(), 2);
        assert_eq!(graph.queries_for(&Node::from("A"), Direction::Forward), 1);
        assert_eq!(graph.queries_for(&Node::from("A"), Direction::Backward), 0);
    }

    #[tokio::test]
    async fn test_pagination_is_transparent() {
        let mut graph = InMemoryGraph::new().with_page_size(2);
        for i in 0..5 {
            graph.add_edge("Hub", format!("Spoke {}", i));
        }

        let hops: Vec<Hop> = graph
            .query(&Node::from("Hub"), Direction::Forward)
            .try_collect()
            .await
            .expect("query should succeed");
        assert_eq!(hops.len(), 5);
        assert_eq!(graph.page_count(), 3);
        assert_eq!(graph.query_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_node_yields_empty_stream() {
        let graph = sample_graph();
        let hops: Vec<Hop> = graph
            .query(&Node::from("Z"), Direction::Forward)
            .try_collect()
            .await
            .expect("query should succeed");
        assert!(hops.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let graph = sample_graph().fail_on("B");
        let result: SearchResult<Vec<Hop>> = graph
            .query(&Node::from("B"), Direction::Forward)
            .try_collect()
            .await;
        assert!(matches!(result, Err(SearchError::RemoteQuery { .. })));
    }

    #[tokio::test]
    async fn test_resolve() {
        let graph = InMemoryGraph::from_edges([("Foo Bar", "Baz")]);
        assert_eq!(
            graph.resolve(" Foo_Bar ").await.expect("should resolve"),
            Node::from("Foo Bar")
        );
        assert!(matches!(
            graph.resolve("Missing").await,
            Err(SearchError::NotFound(_))
        ));
        assert!(matches!(graph.resolve("  ").await, Err(SearchError::NotFound(_))));
    }

    #[test]
    fn test_has_edge() {
        let graph = sample_graph();
        assert!(graph.has_edge(&Node::from("A"), &Node::from("B")));
        assert!(!graph.has_edge(&Node::from("B"), &Node::from("A")));
        assert!(graph.contains(&Node::from("E")));
    }
}
