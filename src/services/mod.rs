//! 服务层模块
//!
//! 包含前沿扩展、双向搜索协调和路径查找入口

pub mod algorithm;
pub mod coordinator;
pub mod explorer;
pub mod finder;
pub mod stats;

// 重新导出常用服务
pub use coordinator::{BidirectionalSearch, SearchMode, SearchOptions, SearchReport};
pub use explorer::{ExpansionPolicy, FrontierExplorer};
pub use finder::{FindReport, PathFinder};
pub use stats::SearchStats;
