use clap::Parser;
use kraftmq::{BrokerConfig, BrokerServer, Result};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "kraftmq")]
#[command(about = "A Kafka-compatible broker backed by a KRaft metadata log")]
struct Args {
    /// Overrides KRAFTMQ_HOST
    #[arg(long)]
    host: Option<String>,

    /// Overrides KRAFTMQ_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// KRaft metadata log segment to load at startup
    #[arg(long)]
    metadata_log: Option<PathBuf>,

    /// Root directory of partition logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    let mut config = BrokerConfig::from_env()?;
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(path) = args.metadata_log {
        config = config.with_metadata_log_path(path);
    }
    if let Some(dir) = args.log_dir {
        config = config.with_log_dir(dir);
    }

    info!("Starting kraftmq broker on {}", config.bind_address());
    info!("Metadata log: {}", config.metadata_log_path.display());
    info!("Log directory: {}", config.log_dir.display());

    let server = BrokerServer::new(config)?;
    let metrics = server.metrics();

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
            server.shutdown();
        }
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
    }

    info!("kraftmq shut down: {:?}", metrics.snapshot());
    Ok(())
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            warn!("Invalid log level '{}', defaulting to 'info'", level);
            tracing::Level::INFO
        }
    }
}
