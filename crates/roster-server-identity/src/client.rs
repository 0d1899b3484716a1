// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account lookup and token validation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use roster_common_secret::SecretString;
use roster_server_auth::{ServerTokenSource, SESSION_TOKEN_HEADER};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::error::IdentityError;
use crate::types::{Account, TokenData};

#[async_trait]
pub trait IdentityLookup: Send + Sync {
	/// Resolve an email or user id to an account, authenticating with `credential`.
	///
	/// Returns `Ok(None)` when no such account exists.
	async fn resolve_user(
		&self,
		email_or_id: &str,
		credential: &SecretString,
	) -> Result<Option<Account>, IdentityError>;

	/// Validate a caller's session token.
	///
	/// Returns `Ok(None)` when the token is unknown or expired.
	async fn check_token(&self, token: &SecretString) -> Result<Option<TokenData>, IdentityError>;
}

/// HTTP implementation of [`IdentityLookup`].
#[derive(Clone)]
pub struct HttpIdentityClient {
	http_client: Client,
	base_url: String,
	credentials: Arc<dyn ServerTokenSource>,
}

impl HttpIdentityClient {
	/// `credentials` supplies the server token used for token validation.
	pub fn new(
		base_url: impl Into<String>,
		timeout: Duration,
		credentials: Arc<dyn ServerTokenSource>,
	) -> Self {
		Self {
			http_client: roster_common_http::new_client_with_timeout(timeout),
			base_url: base_url.into(),
			credentials,
		}
	}

	fn endpoint(&self, parts: &[&str]) -> Result<reqwest::Url, IdentityError> {
		let mut url = reqwest::Url::parse(&self.base_url)
			.map_err(|e| IdentityError::InvalidResponse(format!("invalid base url: {e}")))?;
		url
			.path_segments_mut()
			.map_err(|_| IdentityError::InvalidResponse("base url cannot be a base".to_string()))?
			.pop_if_empty()
			.extend(parts);
		Ok(url)
	}

	/// GET `url` with `credential`; statuses in `absent` map to `None`.
	async fn get_optional<T: DeserializeOwned>(
		&self,
		url: reqwest::Url,
		credential: &SecretString,
		absent: &[StatusCode],
	) -> Result<Option<T>, IdentityError> {
		debug!(url = %url, "Sending request to identity service");

		let response = self
			.http_client
			.get(url)
			.header(SESSION_TOKEN_HEADER, credential.expose().as_str())
			.send()
			.await
			.map_err(IdentityError::from_send)?;

		let status = response.status();
		if absent.contains(&status) {
			debug!(status = %status, "Identity service reports no match");
			return Ok(None);
		}
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			if status == StatusCode::UNAUTHORIZED {
				debug!("Identity service refused the credential");
			} else {
				error!(status = status.as_u16(), "Identity service error");
			}
			return Err(IdentityError::ApiError {
				status: status.as_u16(),
				message,
			});
		}

		let body = response.text().await.map_err(IdentityError::from_send)?;
		serde_json::from_str(&body)
			.map(Some)
			.map_err(|e| IdentityError::InvalidResponse(format!("JSON parse error: {e}")))
	}
}

#[async_trait]
impl IdentityLookup for HttpIdentityClient {
	#[instrument(skip(self, credential))]
	async fn resolve_user(
		&self,
		email_or_id: &str,
		credential: &SecretString,
	) -> Result<Option<Account>, IdentityError> {
		let url = self.endpoint(&["user", email_or_id])?;
		self
			.get_optional(url, credential, &[StatusCode::NOT_FOUND])
			.await
	}

	#[instrument(skip(self, token))]
	async fn check_token(&self, token: &SecretString) -> Result<Option<TokenData>, IdentityError> {
		let server_token = self.credentials.server_token().await?;
		let url = self.endpoint(&["token", token.expose().as_str()])?;
		match self
			.get_optional(url, &server_token, &[StatusCode::NOT_FOUND])
			.await
		{
			// The checked token or our own was refused; log in afresh next time.
			Err(IdentityError::ApiError { status: 401, .. }) => {
				self.credentials.invalidate().await;
				Ok(None)
			}
			other => other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_confirmation_core::UserId;
	use roster_server_auth::StaticServerToken;
	use wiremock::matchers::{header, method, path};

	use crate::login::ServerLogin;
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client_for(server: &MockServer) -> HttpIdentityClient {
		HttpIdentityClient::new(
			server.uri(),
			Duration::from_secs(5),
			Arc::new(StaticServerToken::new("svc-token")),
		)
	}

	fn secret(value: &str) -> SecretString {
		SecretString::new(value.to_string())
	}

	#[tokio::test]
	async fn resolve_user_by_email() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user/a@x.com"))
			.and(header(SESSION_TOKEN_HEADER, "caller-token"))
			.respond_with(ResponseTemplate::new(200).set_body_json(
				serde_json::json!({"userid": "u1", "emails": ["a@x.com"]}),
			))
			.mount(&server)
			.await;

		let account = client_for(&server)
			.resolve_user("a@x.com", &secret("caller-token"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(account.id, UserId::from("u1"));
		assert_eq!(account.primary_email(), Some("a@x.com"));
	}

	#[tokio::test]
	async fn resolve_unknown_user_is_none() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user/ghost@x.com"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let account = client_for(&server)
			.resolve_user("ghost@x.com", &secret("t"))
			.await
			.unwrap();
		assert!(account.is_none());
	}

	#[tokio::test]
	async fn resolve_user_surfaces_server_errors() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user/u1"))
			.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
			.mount(&server)
			.await;

		let result = client_for(&server).resolve_user("u1", &secret("t")).await;
		assert!(matches!(
			result,
			Err(IdentityError::ApiError { status: 500, .. })
		));
	}

	#[tokio::test]
	async fn check_token_uses_server_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/token/caller-token"))
			.and(header(SESSION_TOKEN_HEADER, "svc-token"))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(serde_json::json!({"userid": "u1", "isserver": false})),
			)
			.mount(&server)
			.await;

		let data = client_for(&server)
			.check_token(&secret("caller-token"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(data.user_id, UserId::from("u1"));
		assert!(!data.is_server);
	}

	#[tokio::test]
	async fn rejected_token_is_none() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/token/stale"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let data = client_for(&server).check_token(&secret("stale")).await.unwrap();
		assert!(data.is_none());
	}

	#[tokio::test]
	async fn refused_token_check_forces_new_server_login() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/serverlogin"))
			.respond_with(ResponseTemplate::new(200).insert_header(SESSION_TOKEN_HEADER, "svc-token"))
			.expect(2)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/token/caller-token"))
			.respond_with(ResponseTemplate::new(401))
			.expect(2)
			.mount(&server)
			.await;

		let login = ServerLogin::new(
			server.uri(),
			"roster",
			secret("s3cret"),
			Duration::from_secs(5),
		);
		let client = HttpIdentityClient::new(server.uri(), Duration::from_secs(5), Arc::new(login));
		assert!(client.check_token(&secret("caller-token")).await.unwrap().is_none());
		assert!(client.check_token(&secret("caller-token")).await.unwrap().is_none());
	}
}
