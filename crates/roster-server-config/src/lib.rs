// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for Roster server.
//!
//! Layers are merged in precedence order:
//! 1. Environment variables (`ROSTER_SERVER_*`)
//! 2. Config file (`/etc/roster/server.toml` or `--config`)
//! 3. Built-in defaults
//!
//! # Usage
//!
//! ```ignore
//! use roster_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub clinic: ClinicConfig,
	pub identity: IdentityConfig,
	pub auth: AuthConfig,
	pub smtp: Option<SmtpConfig>,
	pub notifications: NotificationsConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults, the system config file and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let clinic = layer.clinic.unwrap_or_default().finalize();
	let identity = layer.identity.unwrap_or_default().finalize()?;
	let auth = layer.auth.unwrap_or_default().finalize();
	let smtp = layer.smtp.and_then(|l| l.finalize());
	let notifications = layer.notifications.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&http, &auth)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		clinic_url = %clinic.base_url,
		identity_url = %identity.base_url,
		server_name = %identity.server_name,
		smtp_configured = smtp.is_some(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		clinic,
		identity,
		auth,
		smtp,
		notifications,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(http: &HttpConfig, auth: &AuthConfig) -> Result<(), ConfigError> {
	if http.request_timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"http.request_timeout_secs must be greater than zero".to_string(),
		));
	}
	if auth.admin_role.trim().is_empty() {
		return Err(ConfigError::Validation(
			"auth.admin_role must not be empty".to_string(),
		));
	}
	Ok(())
}
