use clap::Parser;
use miasi_http::server::{ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// MIASI HTTP API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace), overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Server configuration file (JSON)
    #[arg(short, long, env = "MIASI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => miasi_core::config::from_file::<ServerConfig, _>(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    println!("Starting MIASI HTTP server on {}:{}", config.host, config.port);
    start_server(config).await
}
