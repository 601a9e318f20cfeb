mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod school;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "dps")]
#[command(about = "Terminal client for the DPS Mushkipur parent and staff portal")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./dps.yaml, then $XDG_CONFIG_HOME/dps-portal/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Skip the offline cache for this run
  #[arg(long)]
  no_cache: bool,

  /// Forget the saved login before starting
  #[arg(long)]
  logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if args.no_cache {
    config.cache.enabled = false;
  }

  // Held until exit so buffered log lines are flushed
  let _guard = logging::init(&config.logging, &config.log_dir()?)?;
  info!(api = %config.api.url, cache = config.cache.enabled, "starting");

  let store = session::SessionStore::new(config.session_path()?);
  debug!(path = %store.path().display(), "session store");
  if args.logout {
    store.clear()?;
  }
  let session = store.load()?;

  let client = api::CachedDpsClient::new(&config)?;

  let mut app = app::App::new(config, client, store, session);
  app.run().await?;

  info!("exiting");
  Ok(())
}
