// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity service configuration.
//!
//! Roster authenticates to the identity service as a server using
//! `server_name` and `server_secret`. The secret is required.

use roster_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct IdentityConfig {
	pub base_url: String,
	/// Base URL of the profile metadata service. Defaults to `base_url`.
	pub profile_base_url: String,
	pub server_name: String,
	pub server_secret: SecretString,
	pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub profile_base_url: Option<String>,
	#[serde(default)]
	pub server_name: Option<String>,
	#[serde(default)]
	pub server_secret: Option<SecretString>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl IdentityConfigLayer {
	pub fn merge(&mut self, other: IdentityConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.profile_base_url.is_some() {
			self.profile_base_url = other.profile_base_url;
		}
		if other.server_name.is_some() {
			self.server_name = other.server_name;
		}
		if other.server_secret.is_some() {
			self.server_secret = other.server_secret;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> Result<IdentityConfig, ConfigError> {
		let server_secret = self
			.server_secret
			.filter(|s| !s.is_empty())
			.ok_or_else(|| {
				ConfigError::Validation(
					"identity server secret is required (ROSTER_SERVER_IDENTITY_SERVER_SECRET or \
					 ROSTER_SERVER_IDENTITY_SERVER_SECRET_FILE)"
						.to_string(),
				)
			})?;

		let base_url = self
			.base_url
			.map(|u| u.trim_end_matches('/').to_string())
			.unwrap_or_else(|| "http://localhost:9107".to_string());
		let profile_base_url = self
			.profile_base_url
			.map(|u| u.trim_end_matches('/').to_string())
			.unwrap_or_else(|| base_url.clone());

		Ok(IdentityConfig {
			base_url,
			profile_base_url,
			server_name: self.server_name.unwrap_or_else(|| "roster".to_string()),
			server_secret,
			timeout_secs: self.timeout_secs.unwrap_or(10),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_secret_is_rejected() {
		let result = IdentityConfigLayer::default().finalize();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_profile_url_defaults_to_base_url() {
		let layer = IdentityConfigLayer {
			base_url: Some("https://auth.internal/".to_string()),
			server_secret: Some(SecretString::new("s3cret".to_string())),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.base_url, "https://auth.internal");
		assert_eq!(config.profile_base_url, "https://auth.internal");
		assert_eq!(config.server_name, "roster");
	}

	#[test]
	fn test_secret_is_redacted_in_debug() {
		let layer = IdentityConfigLayer {
			server_secret: Some(SecretString::new("s3cret".to_string())),
			..Default::default()
		};
		let debug = format!("{:?}", layer.finalize().unwrap());
		assert!(!debug.contains("s3cret"));
	}
}
