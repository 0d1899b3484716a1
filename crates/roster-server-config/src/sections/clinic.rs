// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clinic service client configuration.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ClinicConfig {
	pub base_url: String,
	pub timeout_secs: u64,
}

impl Default for ClinicConfig {
	fn default() -> Self {
		ClinicConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl ClinicConfigLayer {
	pub fn merge(&mut self, other: ClinicConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> ClinicConfig {
		ClinicConfig {
			base_url: self
				.base_url
				.map(|u| u.trim_end_matches('/').to_string())
				.unwrap_or_else(|| "http://localhost:8080".to_string()),
			timeout_secs: self.timeout_secs.unwrap_or(10),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_trailing_slash_is_trimmed() {
		let layer = ClinicConfigLayer {
			base_url: Some("https://clinic.internal/".to_string()),
			timeout_secs: None,
		};
		let config = layer.finalize();
		assert_eq!(config.base_url, "https://clinic.internal");
		assert_eq!(config.timeout_secs, 10);
	}
}
