// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_common_secret::SecretString;
use roster_confirmation_core::UserId;

/// A validated caller.
///
/// The session token is kept so downstream calls made on the caller's
/// behalf can present it again.
#[derive(Debug, Clone)]
pub struct CallerToken {
	user_id: UserId,
	is_server: bool,
	session_token: SecretString,
}

impl CallerToken {
	/// An end user authenticated by their own session.
	pub fn user(user_id: UserId, session_token: SecretString) -> Self {
		Self {
			user_id,
			is_server: false,
			session_token,
		}
	}

	/// A backend service authenticated by server login.
	pub fn server(user_id: UserId, session_token: SecretString) -> Self {
		Self {
			user_id,
			is_server: true,
			session_token,
		}
	}

	pub fn user_id(&self) -> &UserId {
		&self.user_id
	}

	pub fn is_server(&self) -> bool {
		self.is_server
	}

	pub fn session_token(&self) -> &SecretString {
		&self.session_token
	}

	/// True only for an end-user token whose id is `user_id`.
	pub fn is_user(&self, user_id: &UserId) -> bool {
		!self.is_server && &self.user_id == user_id
	}
}

/// Authentication state attached to a request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub caller: Option<CallerToken>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self { caller: None }
	}

	pub fn authenticated(caller: CallerToken) -> Self {
		Self {
			caller: Some(caller),
		}
	}

	/// Require authentication, returning the caller or an error.
	pub fn require_caller(&self) -> Result<&CallerToken, AuthRequired> {
		self.caller.as_ref().ok_or(AuthRequired)
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

#[cfg(test)]
mod tests {
	use super::*;

	fn token() -> SecretString {
		SecretString::new("session-abc".to_string())
	}

	#[test]
	fn user_token_matches_only_its_own_id() {
		let caller = CallerToken::user(UserId::from("u1"), token());
		assert!(caller.is_user(&UserId::from("u1")));
		assert!(!caller.is_user(&UserId::from("u2")));
		assert!(!caller.is_server());
	}

	#[test]
	fn server_token_is_never_a_user() {
		let caller = CallerToken::server(UserId::from("svc"), token());
		assert!(caller.is_server());
		assert!(!caller.is_user(&UserId::from("svc")));
	}

	#[test]
	fn debug_does_not_leak_session_token() {
		let caller = CallerToken::user(UserId::from("u1"), token());
		let debug = format!("{caller:?}");
		assert!(!debug.contains("session-abc"));
	}

	#[test]
	fn unauthenticated_context_requires_caller() {
		assert_eq!(
			AuthContext::unauthenticated().require_caller().unwrap_err(),
			AuthRequired
		);
		let ctx = AuthContext::authenticated(CallerToken::user(UserId::from("u1"), token()));
		assert_eq!(ctx.require_caller().unwrap().user_id(), &UserId::from("u1"));
	}
}
