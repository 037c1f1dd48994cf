//! 统一错误处理
//!
//! 搜索过程中的错误都收敛到 `SearchError`，`SearchResult<T>` 为统一返回类型。
//! "未找到路径" 不是错误，由 `Ok(None)` 表示。

use std::time::Duration;
use thiserror::Error;

/// 搜索错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// 输入无法规范化为真实条目，搜索不会开始
    #[error("条目不存在: {0}")]
    NotFound(String),

    /// 某个节点的远程查询失败，整个搜索中止
    #[error("远程查询失败 ({node}): {message}")]
    RemoteQuery {
        node: String,
        message: String,
        /// 临时故障（网络、限流、5xx），可以重试
        transient: bool,
    },

    #[error("搜索超时: {0:?}")]
    Timeout(Duration),

    /// 搜索在得出结果之前被外部取消
    #[error("搜索已取消")]
    Cancelled,

    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn remote(node: impl Into<String>, message: impl Into<String>) -> Self {
        SearchError::RemoteQuery {
            node: node.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// 构造一个可重试的远程查询错误
    pub fn transient(node: impl Into<String>, message: impl Into<String>) -> Self {
        SearchError::RemoteQuery {
            node: node.into(),
            message: message.into(),
            transient: true,
        }
    }

    /// 是否值得重试（仅限远程查询的临时故障）
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::RemoteQuery { transient: true, .. })
    }
}

/// 统一的结果类型
pub type SearchResult<T> = Result<T, SearchError>;

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        SearchError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SearchError {
    fn from(err: toml::ser::Error) -> Self {
        SearchError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SearchError {
    fn from(err: tokio::task::JoinError) -> Self {
        SearchError::Internal(format!("搜索任务异常退出: {}", err))
    }
}
