pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = glossa_config::load(&args.config)?;

	init_tracing(&config)?;

	let http_addr: SocketAddr = config.service.http_bind.parse()?;

	if config.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"http_bind must be a loopback address when bind_localhost_only is true."
		));
	}

	let state = AppState::new(config.clone())?;

	spawn_maintenance(state.clone(), &config);

	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");
	axum::serve(listener, app).await?;

	Ok(())
}

/// Periodic autosave of dirty state plus hour-stamped backups.
fn spawn_maintenance(state: AppState, config: &glossa_config::Config) {
	let autosave_every = Duration::from_secs(config.service.autosave_secs.max(1));
	let backup_every = Duration::from_secs(config.service.backup_secs.max(1));
	let saver = state.clone();

	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(autosave_every);

		// the first tick fires immediately; skip it
		ticker.tick().await;

		loop {
			ticker.tick().await;

			let mut service = saver.service.write().await;

			if service.is_dirty()
				&& let Err(e) = service.save()
			{
				tracing::error!(error = %e, "autosave failed.");
			}
		}
	});
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(backup_every);

		ticker.tick().await;

		loop {
			ticker.tick().await;

			if let Err(e) = state.service.read().await.backup() {
				tracing::error!(error = %e, "backup failed.");
			}
		}
	});
}

fn init_tracing(config: &glossa_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	Ok(())
}
