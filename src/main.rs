//! yolo-game API server binary

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use yolo_game::{
    api::{init_tracing, ApiServer},
    config::{self, NumberSourceKind},
    ConfigLoader, RegistryFactory,
};

#[derive(Parser, Debug)]
#[command(name = "yolo-game")]
#[command(about = "Numeric guessing game session server", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Seconds a new game accepts bets
    #[arg(long)]
    session_timeout_secs: Option<u64>,

    /// Number source for settlement (random or vrf)
    #[arg(long)]
    number_source: Option<NumberSourceKind>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    // Command line flags override file and environment
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(secs) = args.session_timeout_secs {
        config.game.session_timeout_secs = secs;
    }
    if let Some(kind) = args.number_source {
        config.game.number_source = kind;
    }
    config::validate(&config)?;

    init_tracing(&config.logging.filter);
    info!(version = env!("CARGO_PKG_VERSION"), "yolo-game starting");

    let registry = RegistryFactory::create_registry(config.game.clone());
    let server = ApiServer::new(config.api, registry);
    server.run().await?;

    Ok(())
}
