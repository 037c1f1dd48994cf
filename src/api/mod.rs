use anyhow::Result;
use log::{error, info};
use std::sync::Arc;
use tokio::signal;

pub mod output;
#[cfg(feature = "server")]
pub mod server;

use crate::api::output::OutputFormat;
use crate::config::Config;
use crate::services::PathFinder;
use crate::source::MediaWikiClient;

/// 以配置构建基于 MediaWiki 的路径查找器
pub fn build_finder(config: &Config) -> Result<PathFinder> {
    let client = Arc::new(MediaWikiClient::new(&config.wiki)?);
    info!(
        "MediaWiki 客户端: {} ({} 次请求/秒)",
        client.api_url(),
        config.wiki.requests_per_second
    );
    Ok(PathFinder::with_backend(client, config.search.search_options()))
}

/// 查找一次路径并打印结果
///
/// 未找到路径不是错误；输入无法解析或远程查询失败时返回错误
pub async fn run_find(config: &Config, source: &str, target: &str, format: OutputFormat) -> Result<()> {
    let finder = build_finder(config)?;

    match finder.find(source, target).await {
        Ok(report) => {
            println!("{}", output::render(report.path.as_deref(), format));
            Ok(())
        }
        Err(e) => {
            error!("查找 {} -> {} 失败: {}", source, target, e);
            Err(e.into())
        }
    }
}

#[cfg(feature = "server")]
pub async fn start_service(config: Config) -> Result<()> {
    use crate::api::server::HttpServer;

    println!("Initializing wikiracer service...");

    let finder = build_finder(&config)?;
    let server = HttpServer::new(finder, config.server.clone());

    println!("Starting HTTP server on {}", config.server.address());
    server.serve(shutdown_signal()).await?;

    println!("Shutting down wikiracer service...");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
