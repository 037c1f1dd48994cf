use anyhow::Result;
use clap::Parser;

// 导入库模块
use wikiracer::api;
use wikiracer::api::output::OutputFormat;
use wikiracer::config::Config;
use wikiracer::services::SearchMode;
use wikiracer::utils::logging;

#[derive(Parser)]
#[clap(version, author = "wikiracer contributors")]
enum Cli {
    /// Find a chain of links between two Wikipedia articles
    Find {
        /// Source article title or URL
        source: String,
        /// Target article title or URL
        target: String,
        #[clap(short, long, default_value = "human")]
        format: OutputFormat,
        #[clap(short, long, default_value = "config.toml")]
        config: String,
        /// Override the configured search mode (race | layered)
        #[clap(short, long)]
        mode: Option<SearchMode>,
    },
    /// Start the HTTP service
    Serve {
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

fn load_config(path: &str) -> Result<Config> {
    let config = Config::load(path)?;
    if let Err(e) = logging::init(&config.log) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli {
        Cli::Find {
            source,
            target,
            format,
            config,
            mode,
        } => {
            let mut config = load_config(&config)?;
            if let Some(mode) = mode {
                config.search.mode = mode;
            }
            api::run_find(&config, &source, &target, format).await
        }
        Cli::Serve { config } => {
            let config = load_config(&config)?;
            serve(config).await
        }
    };

    logging::shutdown();
    result
}

#[cfg(feature = "server")]
async fn serve(config: Config) -> Result<()> {
    api::start_service(config).await
}

#[cfg(not(feature = "server"))]
async fn serve(_config: Config) -> Result<()> {
    anyhow::bail!("wikiracer was built without the `server` feature")
}
