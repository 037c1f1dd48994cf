//! 命令行输出格式

use std::fmt;
use std::str::FromStr;

use crate::core::{Node, SearchError};

/// 路径的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `A -> B -> C`
    #[default]
    Human,
    /// 节点数组，或未找到时的 `null`
    Json,
}

impl FromStr for OutputFormat {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(SearchError::Config(format!("未知的输出格式: {}", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Human => f.write_str("human"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

pub const NO_PATH_MESSAGE: &str = "No path found.";

/// 按格式渲染查找结果
pub fn render(path: Option<&[Node]>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => match path {
            Some(path) => path
                .iter()
                .map(Node::as_str)
                .collect::<Vec<_>>()
                .join(" -> "),
            None => NO_PATH_MESSAGE.to_string(),
        },
        OutputFormat::Json => {
            // Node 是透明的字符串，序列化不会失败
            serde_json::to_string(&path).unwrap_or_else(|_| "null".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<Node> {
        ["A", "B", "D", "E"].into_iter().map(Node::from).collect()
    }

    #[test]
    fn test_human_output() {
        assert_eq!(render(Some(&path()), OutputFormat::Human), "A -> B -> D -> E");
        assert_eq!(render(None, OutputFormat::Human), "No path found.");
    }

    #[test]
    fn test_json_output() {
        assert_eq!(render(Some(&path()), OutputFormat::Json), r#"["A","B","D","E"]"#);
        assert_eq!(render(None, OutputFormat::Json), "null");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
