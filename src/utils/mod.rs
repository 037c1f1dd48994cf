// 工具模块 - 仅用于导出各个子模块，不包含具体实现

// 日志模块
pub mod logging;

// 重试模块
pub mod retry;
pub use retry::{retry_with_backoff, RetryConfig};
