//! GitHub commit counting service
//!
//! - REST API endpoints in `endpoints/`
//! - Startup configuration in `config`
//! - Requires GITHUB_TOKEN and GITHUB_ORG env vars at startup

pub mod config;
pub mod endpoints;

use axum::{
	routing::{get, post},
	Extension, Router,
};

use crate::config::Config;
use crate::endpoints::github::commit_count::index::handler as github_commit_count_handler;
use crate::endpoints::health::index::handler as health_handler;

/// Builds the service router. The binary and the HTTP tests share this so
/// both exercise the same routes and layers.
pub fn app(config: Config) -> Router {
	Router::new()
		.route("/health", get(health_handler))
		.route("/commit-count", post(github_commit_count_handler))
		.layer(Extension(config))
}
