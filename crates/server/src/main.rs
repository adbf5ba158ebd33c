use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use micro_wire_server::store::KvStore;
use micro_wire_server::{ConfigOverrides, Server, ServerConfig, app, logging};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "micro-wire-server", version, about = "One request per connection key-value server", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .merge(cli.overrides);
    config.validate()?;

    logging::init(config.log_level()?)?;
    info!(?config, "loaded configuration");

    let router = app::router(Arc::new(KvStore::new()));
    if let Err(e) = Server::new(router, &config).run(&config.address).await {
        error!(cause = %e, address = %config.address, "server stopped");
        return Err(e.into());
    }
    Ok(())
}
