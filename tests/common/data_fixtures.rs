//! 测试数据生成模块
//!
//! 提供各种形状的内存链接图

use std::time::Duration;

use wikiracer::source::InMemoryGraph;

/// A→B, A→C, B→D, C→D, D→E
pub fn scenario_graph() -> InMemoryGraph {
    InMemoryGraph::from_edges([("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")])
}

/// 两个互不相连的分量：A→B→C 和 X→Y→Z
pub fn disconnected_graph() -> InMemoryGraph {
    InMemoryGraph::from_edges([("A", "B"), ("B", "C"), ("X", "Y"), ("Y", "Z")])
}

/// 一条长度为 `length` 的长链 S → L1 → ... → T，外加捷径 S → Short → T
pub fn chain_with_shortcut(length: usize) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    let mut previous = "S".to_string();
    for i in 1..length {
        let next = format!("L{}", i);
        graph.add_edge(previous.clone(), next.clone());
        previous = next;
    }
    graph.add_edge(previous, "T");
    graph.add_edge("S", "Short");
    graph.add_edge("Short", "T");
    graph
}

/// 两把互不相交的扇子，每页都有人工延迟
///
/// Hub 出发有 `spokes` 条长度为 `depth` 的链，另有 `spokes` 条同样长度的链汇入 Goal，
/// Hub 与 Goal 之间没有路径。任何策略下扩展都至少需要 `depth` 轮延迟。
pub fn slow_fan_graph(spokes: usize, depth: usize, latency: Duration) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new().with_latency(latency);
    for i in 0..spokes {
        let mut out = "Hub".to_string();
        let mut into = "Goal".to_string();
        for level in 1..=depth {
            let next_out = format!("S{}_{}", i, level);
            let next_into = format!("G{}_{}", i, level);
            graph.add_edge(out, next_out.clone());
            graph.add_edge(next_into.clone(), into);
            out = next_out;
            into = next_into;
        }
    }
    graph
}

/// 每页都有人工延迟的环形图，用于超时和取消测试
pub fn slow_ring_graph(size: usize, latency: Duration) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new().with_latency(latency);
    for i in 0..size {
        graph.add_edge(format!("N{}", i), format!("N{}", (i + 1) % size));
    }
    graph
}

/// 节点 `0..size` 组成的环，每个节点额外连向 `i + stride`
pub fn ring_graph(size: usize, stride: usize) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    for i in 0..size {
        graph.add_edge(format!("N{}", i), format!("N{}", (i + 1) % size));
        graph.add_edge(format!("N{}", i), format!("N{}", (i + stride) % size));
    }
    graph
}

/// 一个宽网格：每层 `width` 个节点，层与层之间全连接
///
/// 节点名为 `R{层}C{列}`，另有起点 `Start` 连向第一层、最后一层连向 `Goal`
pub fn layered_grid(layers: usize, width: usize) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    for column in 0..width {
        graph.add_edge("Start", format!("R0C{}", column));
        graph.add_edge(format!("R{}C{}", layers - 1, column), "Goal");
    }
    for layer in 0..layers - 1 {
        for from in 0..width {
            for to in 0..width {
                graph.add_edge(format!("R{}C{}", layer, from), format!("R{}C{}", layer + 1, to));
            }
        }
    }
    graph
}
