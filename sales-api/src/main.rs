use std::path::PathBuf;
use clap::Parser;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sales_api::{ApiServer, ApiServerConfig};
use sales_cache::CacheConfig;

#[derive(Parser)]
#[command(name = "sales-api")]
#[command(about = "Sales management API with a cache-aside query layer", long_about = None)]
struct Cli {
    /// Host to bind to
    #[arg(long, env = "SALES_API_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "SALES_API_PORT", default_value = "8080")]
    port: u16,

    /// Data directory for mirrored documents
    #[arg(short, long, env = "SALES_API_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Redis connection URL (requires the `redis` feature)
    #[arg(long, env = "SALES_API_REDIS_URL")]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sales_api=info,sales_cache=info".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ApiServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        data_dir: cli.data_dir.clone(),
        redis_url: cli.redis_url.clone(),
        cache: CacheConfig::from_env()?,
    };

    let server = ApiServer::new(config);
    println!("Starting API server on {}:{}", cli.host, cli.port);
    server.start().await?;

    Ok(())
}
