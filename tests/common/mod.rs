//! 集成测试共享工具模块
//!
//! 提供测试基础设施和辅助函数，供所有集成测试使用

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;

use std::sync::Arc;

use wikiracer::services::{BidirectionalSearch, ExpansionPolicy, SearchMode, SearchOptions};
use wikiracer::source::InMemoryGraph;

/// 所有搜索模式和并发策略的组合
pub fn all_option_sets() -> Vec<SearchOptions> {
    let mut sets = Vec::new();
    for mode in [SearchMode::Race, SearchMode::Layered] {
        for policy in [ExpansionPolicy::Unbounded, ExpansionPolicy::Pool { workers: 3 }] {
            sets.push(SearchOptions::default().with_mode(mode).with_policy(policy));
        }
    }
    sets
}

/// 在内存图上构建搜索，同时返回图的共享句柄以便检查查询计数
pub fn search_over(graph: InMemoryGraph, options: SearchOptions) -> (Arc<InMemoryGraph>, BidirectionalSearch) {
    let graph = Arc::new(graph);
    let search = BidirectionalSearch::new(graph.clone(), options);
    (graph, search)
}
