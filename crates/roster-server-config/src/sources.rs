// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::load_secret_env;
use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, ClinicConfigLayer, DatabaseConfigLayer, HttpConfigLayer, IdentityConfigLayer,
	LogFormat, LoggingConfigLayer, NotificationsConfigLayer, SmtpConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/roster/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: ROSTER_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()),
			clinic: Some(load_clinic_from_env()?),
			identity: Some(load_identity_from_env()?),
			auth: Some(load_auth_from_env()),
			smtp: Some(load_smtp_from_env()?),
			notifications: Some(load_notifications_from_env()),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("ROSTER_SERVER_HOST"),
		port: env_u16("ROSTER_SERVER_PORT")?,
		request_timeout_secs: env_u64("ROSTER_SERVER_HTTP_REQUEST_TIMEOUT_SECS")?,
	})
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("ROSTER_SERVER_DATABASE_URL"),
	}
}

fn load_clinic_from_env() -> Result<ClinicConfigLayer, ConfigError> {
	Ok(ClinicConfigLayer {
		base_url: env_var("ROSTER_SERVER_CLINIC_BASE_URL"),
		timeout_secs: env_u64("ROSTER_SERVER_CLINIC_TIMEOUT_SECS")?,
	})
}

fn load_identity_from_env() -> Result<IdentityConfigLayer, ConfigError> {
	Ok(IdentityConfigLayer {
		base_url: env_var("ROSTER_SERVER_IDENTITY_BASE_URL"),
		profile_base_url: env_var("ROSTER_SERVER_IDENTITY_PROFILE_BASE_URL"),
		server_name: env_var("ROSTER_SERVER_IDENTITY_SERVER_NAME"),
		server_secret: load_secret_env("ROSTER_SERVER_IDENTITY_SERVER_SECRET")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		timeout_secs: env_u64("ROSTER_SERVER_IDENTITY_TIMEOUT_SECS")?,
	})
}

fn load_auth_from_env() -> AuthConfigLayer {
	AuthConfigLayer {
		admin_role: env_var("ROSTER_SERVER_AUTH_ADMIN_ROLE"),
		session_header: env_var("ROSTER_SERVER_AUTH_SESSION_HEADER"),
	}
}

fn load_smtp_from_env() -> Result<SmtpConfigLayer, ConfigError> {
	Ok(SmtpConfigLayer {
		host: env_var("ROSTER_SERVER_SMTP_HOST"),
		port: env_u16("ROSTER_SERVER_SMTP_PORT")?,
		username: env_var("ROSTER_SERVER_SMTP_USERNAME"),
		password: load_secret_env("ROSTER_SERVER_SMTP_PASSWORD")
			.map_err(|e| ConfigError::Secret(e.to_string()))?,
		from_address: env_var("ROSTER_SERVER_SMTP_FROM_ADDRESS"),
		from_name: env_var("ROSTER_SERVER_SMTP_FROM_NAME"),
		use_tls: env_bool("ROSTER_SERVER_SMTP_USE_TLS"),
	})
}

fn load_notifications_from_env() -> NotificationsConfigLayer {
	NotificationsConfigLayer {
		web_url: env_var("ROSTER_SERVER_NOTIFICATIONS_WEB_URL"),
	}
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("ROSTER_SERVER_LOGGING_FORMAT") {
		Some(v) => match v.to_lowercase().as_str() {
			"json" => Some(LogFormat::Json),
			"pretty" | "text" => Some(LogFormat::Pretty),
			_ => {
				return Err(ConfigError::InvalidValue {
					key: "ROSTER_SERVER_LOGGING_FORMAT".to_string(),
					message: format!("expected 'pretty' or 'json', got '{v}'"),
				})
			}
		},
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("ROSTER_SERVER_LOGGING_LEVEL"),
		format,
	})
}
