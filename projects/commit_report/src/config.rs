use std::env;

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_PORT: u16 = 3000;

/// Process configuration, read once at startup and handed to handlers
/// through an `Extension` layer.
#[derive(Debug, Clone)]
pub struct Config {
	pub github_token: String,
	pub github_org: String,
	pub github_api_base: String,
	pub port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("MissingEnvVar: {name}")]
	MissingEnvVar {
		name: &'static str,
	},

	#[error("InvalidPort: {source}")]
	InvalidPort {
		source: std::num::ParseIntError,
	},
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Env access goes through `lookup` so tests can inject variables
	/// without mutating process state.
	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let github_token = lookup("GITHUB_TOKEN")
			.ok_or(ConfigError::MissingEnvVar { name: "GITHUB_TOKEN" })?;

		let github_org = lookup("GITHUB_ORG")
			.ok_or(ConfigError::MissingEnvVar { name: "GITHUB_ORG" })?;

		let github_api_base = lookup("GITHUB_API_BASE")
			.unwrap_or_else(|| DEFAULT_API_BASE.to_string());

		let port = match lookup("PORT") {
			Some(raw) => raw
				.parse()
				.map_err(|source| ConfigError::InvalidPort { source })?,
			None => DEFAULT_PORT,
		};

		Ok(Self {
			github_token,
			github_org,
			github_api_base,
			port,
		})
	}
}
