//! HTTP 服务器
//!
//! 提供基于 HTTP 的路径查找服务接口

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::services::PathFinder;

use super::{router::create_router, state::AppState};

/// HTTP 服务器
pub struct HttpServer {
    finder: PathFinder,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(finder: PathFinder, config: ServerConfig) -> Self {
        Self { finder, config }
    }

    /// 获取路径查找器
    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs.max(1))
    }

    /// 绑定监听地址并处理请求，直到 `shutdown` 完成
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = self.config.address();
        let listener = TcpListener::bind(&address).await?;
        info!("HTTP 服务监听于 {}", listener.local_addr()?);

        let router = create_router(AppState::new(Arc::new(self)));
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
