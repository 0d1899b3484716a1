// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile metadata lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use roster_confirmation_core::UserId;
use roster_server_auth::{ServerTokenSource, SESSION_TOKEN_HEADER};
use tracing::{debug, instrument, warn};

use crate::error::IdentityError;
use crate::types::Profile;

#[async_trait]
pub trait ProfileLookup: Send + Sync {
	async fn get_profile(&self, user_id: &UserId) -> Result<Profile, IdentityError>;
}

/// Reads `GET /metadata/{user_id}/profile` as Roster.
#[derive(Clone)]
pub struct HttpProfileClient {
	http_client: Client,
	base_url: String,
	credentials: Arc<dyn ServerTokenSource>,
}

impl HttpProfileClient {
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
}

#[async_trait]
impl ProfileLookup for HttpProfileClient {
	#[instrument(skip(self), fields(user_id = %user_id))]
	async fn get_profile(&self, user_id: &UserId) -> Result<Profile, IdentityError> {
		let token = self.credentials.server_token().await?;
		let mut url = reqwest::Url::parse(&self.base_url)
			.map_err(|e| IdentityError::InvalidResponse(format!("invalid base url: {e}")))?;
		url
			.path_segments_mut()
			.map_err(|_| IdentityError::InvalidResponse("base url cannot be a base".to_string()))?
			.pop_if_empty()
			.extend(["metadata", user_id.as_str(), "profile"]);

		debug!(url = %url, "Fetching profile");
		let response = self
			.http_client
			.get(url)
			.header(SESSION_TOKEN_HEADER, token.expose().as_str())
			.send()
			.await
			.map_err(IdentityError::from_send)?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED {
			self.credentials.invalidate().await;
		}
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), "Profile lookup failed");
			return Err(IdentityError::ApiError {
				status: status.as_u16(),
				message,
			});
		}

		response
			.json::<Profile>()
			.await
			.map_err(|e| IdentityError::InvalidResponse(format!("JSON parse error: {e}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_server_auth::StaticServerToken;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client_for(server: &MockServer) -> HttpProfileClient {
		HttpProfileClient::new(
			server.uri(),
			Duration::from_secs(5),
			Arc::new(StaticServerToken::new("svc-token")),
		)
	}

	#[tokio::test]
	async fn fetches_full_name() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/metadata/admin-1/profile"))
			.and(header(SESSION_TOKEN_HEADER, "svc-token"))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(serde_json::json!({"fullName": "Dr Admin"})),
			)
			.mount(&server)
			.await;

		let profile = client_for(&server)
			.get_profile(&UserId::from("admin-1"))
			.await
			.unwrap();
		assert_eq!(profile.full_name.as_deref(), Some("Dr Admin"));
	}

	#[tokio::test]
	async fn missing_profile_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/metadata/nobody/profile"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let result = client_for(&server).get_profile(&UserId::from("nobody")).await;
		assert!(matches!(
			result,
			Err(IdentityError::ApiError { status: 404, .. })
		));
	}
}
