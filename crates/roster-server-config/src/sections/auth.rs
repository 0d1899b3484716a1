// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller authentication and authorization settings.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Clinic role that grants invite management.
	pub admin_role: String,
	/// Header carrying the caller's session token.
	pub session_header: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_role: Option<String>,
	#[serde(default)]
	pub session_header: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_role.is_some() {
			self.admin_role = other.admin_role;
		}
		if other.session_header.is_some() {
			self.session_header = other.session_header;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			admin_role: self.admin_role.unwrap_or_else(|| "CLINIC_ADMIN".to_string()),
			session_header: self
				.session_header
				.map(|h| h.to_ascii_lowercase())
				.unwrap_or_else(|| "x-tidepool-session-token".to_string()),
		}
	}
}
