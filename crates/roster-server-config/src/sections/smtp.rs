// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP configuration. Email is disabled unless `host` and `from_address` are set.

use roster_common_secret::SecretString;
use roster_server_smtp::SmtpConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub from_address: Option<String>,
	#[serde(default)]
	pub from_name: Option<String>,
	#[serde(default)]
	pub use_tls: Option<bool>,
}

impl SmtpConfigLayer {
	pub fn merge(&mut self, other: SmtpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.use_tls.is_some() {
			self.use_tls = other.use_tls;
		}
	}

	pub fn finalize(self) -> Option<SmtpConfig> {
		let host = self.host?;
		let from_address = self.from_address?;
		Some(SmtpConfig {
			host,
			port: self.port.unwrap_or(587),
			username: self.username,
			password: self.password,
			from_address,
			from_name: self.from_name.unwrap_or_else(|| "Roster".to_string()),
			use_tls: self.use_tls.unwrap_or(true),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unconfigured_smtp_is_none() {
		assert!(SmtpConfigLayer::default().finalize().is_none());
		let host_only = SmtpConfigLayer {
			host: Some("smtp.example.com".to_string()),
			..Default::default()
		};
		assert!(host_only.finalize().is_none());
	}

	#[test]
	fn test_defaults_when_configured() {
		let layer = SmtpConfigLayer {
			host: Some("smtp.example.com".to_string()),
			from_address: Some("invites@example.com".to_string()),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.port, 587);
		assert_eq!(config.from_name, "Roster");
		assert!(config.use_tls);
	}
}
