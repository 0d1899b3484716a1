// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification content settings.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct NotificationsConfig {
	/// Public web app URL; invite links are `{web_url}/{login|signup}`.
	pub web_url: String,
}

impl Default for NotificationsConfig {
	fn default() -> Self {
		NotificationsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsConfigLayer {
	#[serde(default)]
	pub web_url: Option<String>,
}

impl NotificationsConfigLayer {
	pub fn merge(&mut self, other: NotificationsConfigLayer) {
		if other.web_url.is_some() {
			self.web_url = other.web_url;
		}
	}

	pub fn finalize(self) -> NotificationsConfig {
		NotificationsConfig {
			web_url: self
				.web_url
				.map(|u| u.trim_end_matches('/').to_string())
				.unwrap_or_else(|| "http://localhost:3000".to_string()),
		}
	}
}
