//! 算法模块
//!
//! 包含路径搜索相关算法实现

pub mod bidirectional_bfs;
pub mod reconstruct;

// 重新导出常用算法结构体
pub use bidirectional_bfs::{BidirectionalBfs, LayeredOutcome};
pub use reconstruct::{reconstruct_path, PredecessorMap};
