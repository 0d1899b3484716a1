// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server login and token caching.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use roster_common_secret::SecretString;
use roster_server_auth::{
	CredentialError, ServerTokenSource, SERVER_NAME_HEADER, SERVER_SECRET_HEADER,
	SESSION_TOKEN_HEADER,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::IdentityError;

/// Server tokens are refreshed well before the identity service expires them.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

struct CachedToken {
	token: SecretString,
	obtained_at: Instant,
}

/// Logs in to the identity service as Roster and caches the resulting token.
pub struct ServerLogin {
	http_client: Client,
	base_url: String,
	server_name: String,
	server_secret: SecretString,
	token_ttl: Duration,
	cached: RwLock<Option<CachedToken>>,
}

impl ServerLogin {
	pub fn new(
		base_url: impl Into<String>,
		server_name: impl Into<String>,
		server_secret: SecretString,
		timeout: Duration,
	) -> Self {
		Self {
			http_client: roster_common_http::new_client_with_timeout(timeout),
			base_url: base_url.into(),
			server_name: server_name.into(),
			server_secret,
			token_ttl: DEFAULT_TOKEN_TTL,
			cached: RwLock::new(None),
		}
	}

	/// Sets how long a token is reused before logging in again.
	pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
		self.token_ttl = ttl;
		self
	}

	/// `POST /serverlogin`; the token comes back in the session header.
	#[instrument(skip(self), fields(server_name = %self.server_name))]
	async fn login(&self) -> Result<SecretString, IdentityError> {
		let url = format!("{}/serverlogin", self.base_url.trim_end_matches('/'));
		debug!(url = %url, "Logging in to identity service");

		let response = self
			.http_client
			.post(&url)
			.header(SERVER_NAME_HEADER, &self.server_name)
			.header(SERVER_SECRET_HEADER, self.server_secret.expose().as_str())
			.send()
			.await
			.map_err(IdentityError::from_send)?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), "Server login rejected");
			return Err(IdentityError::ApiError {
				status: status.as_u16(),
				message,
			});
		}

		let token = response
			.headers()
			.get(SESSION_TOKEN_HEADER)
			.and_then(|v| v.to_str().ok())
			.filter(|v| !v.is_empty())
			.ok_or_else(|| {
				IdentityError::InvalidResponse("server login returned no session token".to_string())
			})?;

		info!("Obtained server token");
		Ok(SecretString::new(token.to_string()))
	}
}

#[async_trait]
impl ServerTokenSource for ServerLogin {
	async fn server_token(&self) -> Result<SecretString, CredentialError> {
		if let Some(cached) = self.cached.read().await.as_ref() {
			if cached.obtained_at.elapsed() < self.token_ttl {
				return Ok(cached.token.clone());
			}
		}

		let mut slot = self.cached.write().await;
		// Another task may have refreshed while we waited for the lock.
		if let Some(cached) = slot.as_ref() {
			if cached.obtained_at.elapsed() < self.token_ttl {
				return Ok(cached.token.clone());
			}
		}

		let token = self
			.login()
			.await
			.map_err(|e| CredentialError(e.to_string()))?;
		*slot = Some(CachedToken {
			token: token.clone(),
			obtained_at: Instant::now(),
		});
		Ok(token)
	}

	/// Drop the cached token so the next call logs in again.
	async fn invalidate(&self) {
		debug!("Dropping cached server token");
		*self.cached.write().await = None;
	}
}
