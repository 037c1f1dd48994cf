//! 自定义断言辅助模块
//!
//! 提供测试中的常用断言函数

use wikiracer::core::{Direction, Node};
use wikiracer::source::InMemoryGraph;

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言 Option 是 Some 并返回内部值
pub fn assert_some<T>(opt: &Option<T>) -> &T {
    opt.as_ref().expect("值应该是 Some")
}

/// 断言路径从起点开始、在终点结束，且相邻两节点之间都存在链接
pub fn assert_valid_path(graph: &InMemoryGraph, path: &[Node], source: &str, target: &str) {
    assert!(!path.is_empty(), "路径不能为空");
    assert_eq!(path[0], Node::from(source), "路径应从起点开始: {:?}", path);
    assert_eq!(
        path[path.len() - 1],
        Node::from(target),
        "路径应在终点结束: {:?}",
        path
    );
    for pair in path.windows(2) {
        assert!(
            graph.has_edge(&pair[0], &pair[1]),
            "路径中的 {} -> {} 不是图中的边",
            pair[0],
            pair[1]
        );
    }
}

/// 断言没有任何节点在同一方向上被查询超过一次
pub fn assert_queried_at_most_once(graph: &InMemoryGraph) {
    for ((node, direction), count) in graph.query_log() {
        assert!(
            count <= 1,
            "节点 {} 在 {} 方向被查询了 {} 次",
            node,
            direction,
            count
        );
    }
}

/// 断言某个方向上查询过该节点
pub fn assert_queried(graph: &InMemoryGraph, node: &str, direction: Direction) {
    assert!(
        graph.queries_for(&Node::from(node), direction) > 0,
        "节点 {} 应该在 {} 方向被查询",
        node,
        direction
    );
}
