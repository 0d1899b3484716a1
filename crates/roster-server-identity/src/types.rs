// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity service wire types.

use roster_confirmation_core::UserId;
use serde::{Deserialize, Serialize};

/// An account as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	#[serde(rename = "userid")]
	pub id: UserId,
	/// Verified emails; the first is the primary email.
	#[serde(default)]
	pub emails: Vec<String>,
}

impl Account {
	pub fn primary_email(&self) -> Option<&str> {
		self.emails.first().map(String::as_str)
	}
}

/// The claims behind a validated session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
	#[serde(rename = "userid")]
	pub user_id: UserId,
	#[serde(rename = "isserver", default)]
	pub is_server: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	#[serde(default)]
	pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn account_primary_email_is_first() {
		let account: Account = serde_json::from_str(
			r#"{"userid":"u1","username":"a@x.com","emails":["a@x.com","b@x.com"]}"#,
		)
		.unwrap();
		assert_eq!(account.id, UserId::from("u1"));
		assert_eq!(account.primary_email(), Some("a@x.com"));
	}

	#[test]
	fn account_without_emails_has_no_primary() {
		let account: Account = serde_json::from_str(r#"{"userid":"u1"}"#).unwrap();
		assert_eq!(account.primary_email(), None);
	}

	#[test]
	fn token_data_defaults_to_user() {
		let data: TokenData = serde_json::from_str(r#"{"userid":"u1"}"#).unwrap();
		assert!(!data.is_server);
		let server: TokenData = serde_json::from_str(r#"{"userid":"svc","isserver":true}"#).unwrap();
		assert!(server.is_server);
	}

	#[test]
	fn profile_reads_full_name() {
		let profile: Profile = serde_json::from_str(r#"{"fullName":"Dr Admin"}"#).unwrap();
		assert_eq!(profile.full_name.as_deref(), Some("Dr Admin"));
	}
}
