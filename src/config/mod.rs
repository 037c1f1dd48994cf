use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::core::error::{SearchError, SearchResult};
use crate::services::coordinator::{SearchMode, SearchOptions, DEFAULT_CHANNEL_CAPACITY};
use crate::services::explorer::{ExpansionPolicy, DEFAULT_WORKERS};
use crate::source::mediawiki::MAX_PAGE_LIMIT;
use crate::utils::retry::RetryConfig;

/// 配置文件中的并发策略名称
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Pool,
    Unbounded,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub wiki: WikiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub policy: PolicyKind,
    pub workers: usize,
    pub channel_capacity: usize,
    /// 0 表示不设截止时间
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Race,
            policy: PolicyKind::Pool,
            workers: DEFAULT_WORKERS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            timeout_secs: 0,
        }
    }
}

impl SearchConfig {
    pub fn expansion_policy(&self) -> ExpansionPolicy {
        match self.policy {
            PolicyKind::Pool => ExpansionPolicy::Pool {
                workers: self.workers,
            },
            PolicyKind::Unbounded => ExpansionPolicy::Unbounded,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            mode: self.mode,
            policy: self.expansion_policy(),
            channel_capacity: self.channel_capacity,
            deadline: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WikiConfig {
    pub api_url: String,
    pub user_agent: String,
    /// 0 表示不限速
    pub requests_per_second: u32,
    pub page_limit: u32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!("wikiracer/{}", env!("CARGO_PKG_VERSION")),
            requests_per_second: 10,
            page_limit: MAX_PAGE_LIMIT,
            request_timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 5000,
        }
    }
}

impl WikiConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(self.max_retries.saturating_add(1))
            .with_initial_delay(self.initial_backoff_ms)
            .with_max_delay(self.max_backoff_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "wikiracer".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

impl Config {
    /// 加载配置文件，文件不存在时使用默认配置
    pub fn load<P: AsRef<Path>>(path: P) -> SearchResult<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("配置文件 {} 不存在，使用默认配置", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(SearchError::Config(format!(
                    "无法读取配置文件 {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> SearchResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| {
            SearchError::Config(format!("无法写入配置文件 {}: {}", path.as_ref().display(), e))
        })?;
        Ok(())
    }

    pub fn validate(&self) -> SearchResult<()> {
        if self.search.policy == PolicyKind::Pool && self.search.workers == 0 {
            return Err(SearchError::Config(
                "search.workers 在 pool 策略下必须大于 0".to_string(),
            ));
        }
        if self.search.channel_capacity == 0 {
            return Err(SearchError::Config(
                "search.channel_capacity 必须大于 0".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&self.wiki.page_limit) {
            return Err(SearchError::Config(format!(
                "wiki.page_limit 必须在 1 到 {} 之间",
                MAX_PAGE_LIMIT
            )));
        }
        if self.wiki.api_url.trim().is_empty() {
            return Err(SearchError::Config("wiki.api_url 不能为空".to_string()));
        }
        Ok(())
    }
}
