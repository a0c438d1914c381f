mod cache;
mod commands;
mod config;
mod logging;
mod remote;
mod render;
mod store;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::remote::PostgrestClient;
use crate::render::Output;
use crate::store::Stores;

#[derive(Parser, Debug)]
#[command(name = "fleetdesk")]
#[command(about = "Manage mopeds, clients, warehouses and rental deals from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/fleetdesk/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Override the lookup cache TTL in seconds
  #[arg(long, global = true)]
  ttl: Option<u64>,

  /// Print results as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _guard = logging::init(&config.log)?;

  // Override TTL if specified on command line
  let ttl = args
    .ttl
    .map(Duration::from_secs)
    .unwrap_or_else(|| config.cache.ttl());

  let client = PostgrestClient::new(&config.backend)?;
  let stores = Stores::new(Arc::new(client), ttl);
  info!(backend = %config.backend.url, ttl = ?stores.mopeds.cache().ttl(), "starting");

  commands::run(args.command, &stores, Output { json: args.json }).await
}
