use std::net::SocketAddr;

use axum::serve;
use projects_commit_report::{app, config::{Config, ConfigError}};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MainError {
	#[error("TracingInit: {source}")]
	TracingInit {
		#[source]
		source: utils_trace::TracingInitError,
	},
	#[error("LoadConfig: {source}")]
	LoadConfig {
		#[source]
		source: ConfigError,
	},
	#[error("TcpListenerBind: {source}")]
	TcpListenerBind {
		#[source]
		source: std::io::Error,
	},
	#[error("Serve: {source}")]
	Serve {
		#[source]
		source: std::io::Error,
	}
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
	dotenvy::dotenv().ok();

	utils_trace::init("info")
		.map_err(|source| MainError::TracingInit { source })?;

	// Missing GITHUB_TOKEN or GITHUB_ORG is fatal before the listener binds.
	let config = Config::from_env()
		.map_err(|source| MainError::LoadConfig { source })?;

	info!("Counting commits for organization: {}", config.github_org);

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|source| MainError::TcpListenerBind { source })?;

	info!("Server running on addr: {}", addr);

	serve(listener, app(config))
		.await
		.map_err(|source| MainError::Serve { source })?;

	Ok(())
}
