// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The mergeable top-level configuration layer.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, ClinicConfigLayer, DatabaseConfigLayer, HttpConfigLayer, IdentityConfigLayer,
	LoggingConfigLayer, NotificationsConfigLayer, SmtpConfigLayer,
};

/// One source's view of the configuration. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub clinic: Option<ClinicConfigLayer>,
	#[serde(default)]
	pub identity: Option<IdentityConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub smtp: Option<SmtpConfigLayer>,
	#[serde(default)]
	pub notifications: Option<NotificationsConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_option<T: Default>(slot: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	if let Some(other) = other {
		merge(slot.get_or_insert_with(Default::default), other);
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`; set values in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_option(&mut self.clinic, other.clinic, ClinicConfigLayer::merge);
		merge_option(&mut self.identity, other.identity, IdentityConfigLayer::merge);
		merge_option(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_option(&mut self.smtp, other.smtp, SmtpConfigLayer::merge);
		merge_option(
			&mut self.notifications,
			other.notifications,
			NotificationsConfigLayer::merge,
		);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_toml_layer_parses_sections() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			port = 8000

			[clinic]
			base_url = "http://clinic:9000"

			[auth]
			admin_role = "OWNER"
			"#,
		)
		.unwrap();
		assert_eq!(layer.http.unwrap().port, Some(8000));
		assert_eq!(
			layer.clinic.unwrap().base_url.as_deref(),
			Some("http://clinic:9000")
		);
		assert_eq!(layer.auth.unwrap().admin_role.as_deref(), Some("OWNER"));
		assert!(layer.smtp.is_none());
	}

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			host = "127.0.0.1"
			port = 8000
			"#,
		)
		.unwrap();
		let over: ServerConfigLayer = toml::from_str("[http]\nport = 9000").unwrap();
		base.merge(over);
		let http = base.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(http.port, Some(9000));
	}
}
