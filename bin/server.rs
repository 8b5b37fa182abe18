// Receipt Points - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use receipt_points::{server, Config, ReceiptProcessor, StorageBackend};
use std::path::PathBuf;

/// Command-line overrides; anything left unset comes from the environment
#[derive(Parser)]
#[command(name = "receipt-server", about = "Receipt points HTTP service", version)]
struct Args {
    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,

    #[arg(long)]
    database: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.apply(Config::from_env()?);

    receipt_points::logging::init(&config.log_filter);

    let store = config.open_store()?;
    let app = server::router(ReceiptProcessor::new(store));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(%addr, version = receipt_points::VERSION, "receipt server listening");

    axum::serve(listener, app)
        .await
        .context("Server failed")?;

    Ok(())
}
