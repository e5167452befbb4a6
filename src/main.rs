use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use shelfdb::config::Config;
use shelfdb::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// ShelfDB - in-memory book and word records over HTTP
#[derive(Parser, Debug)]
#[command(name = "shelfdb")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an INI configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Listening address, overrides the configuration file
    #[arg(long)]
    addr: Option<String>,

    /// Log level, overrides the configuration file
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(addr) = &args.addr {
        config.server_addr = addr.clone();
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .with_context(|| format!("invalid log level '{}'", config.log.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &config.log.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!("Starting ShelfDB - in-memory book and word records");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = Server::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr))?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
