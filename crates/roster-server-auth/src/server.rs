// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use roster_common_secret::SecretString;

/// Error returned when this service cannot obtain its own server token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("server token unavailable: {0}")]
pub struct CredentialError(pub String);

/// Supplies the token Roster presents when calling other services as itself.
#[async_trait]
pub trait ServerTokenSource: Send + Sync {
	async fn server_token(&self) -> Result<SecretString, CredentialError>;

	/// Called when a peer refused the token; the next call should mint a new one.
	async fn invalidate(&self) {}
}

/// A fixed token, for tests and for deployments that mint tokens out of band.
#[derive(Debug, Clone)]
pub struct StaticServerToken(SecretString);

impl StaticServerToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(SecretString::new(token.into()))
	}
}

#[async_trait]
impl ServerTokenSource for StaticServerToken {
	async fn server_token(&self) -> Result<SecretString, CredentialError> {
		Ok(self.0.clone())
	}
}
