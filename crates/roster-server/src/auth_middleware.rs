// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session token authentication.
//!
//! [`auth_layer`] validates the session token header against the identity
//! service and stores an [`AuthContext`] on the request. Handlers then use
//! [`RequireCaller`] to get the validated [`CallerToken`].
//!
//! Token values are never logged; only the resolved user id is recorded.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use roster_server_api::InviteErrorResponse;
use roster_server_auth::{extract_session_token, AuthContext, CallerToken};
use tracing::instrument;

use crate::api::AppState;

#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		user_id = tracing::field::Empty,
		is_server = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();

	let auth_ctx = match extract_session_token(request.headers(), &state.session_header) {
		Some(token) => match state.identity.check_token(&token).await {
			Ok(Some(data)) => {
				span.record("user_id", tracing::field::display(&data.user_id));
				span.record("is_server", data.is_server);
				let caller = if data.is_server {
					CallerToken::server(data.user_id, token)
				} else {
					CallerToken::user(data.user_id, token)
				};
				AuthContext::authenticated(caller)
			}
			Ok(None) => {
				tracing::debug!("Session token rejected by identity service");
				AuthContext::unauthenticated()
			}
			Err(e) => {
				tracing::warn!(error = %e, "Session token check failed");
				AuthContext::unauthenticated()
			}
		},
		None => {
			tracing::debug!("No session token on request");
			AuthContext::unauthenticated()
		}
	};

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

/// Extractor that requires a validated caller.
///
/// Rejects with `401 unauthorized` when [`auth_layer`] found no valid token.
pub struct RequireCaller(pub CallerToken);

impl<S> FromRequestParts<S> for RequireCaller
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireCaller::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.require_caller() {
			Ok(caller) => Ok(RequireCaller(caller.clone())),
			Err(_) => {
				let response = (
					StatusCode::UNAUTHORIZED,
					Json(InviteErrorResponse {
						error: "unauthorized".to_string(),
						message: "Authentication required".to_string(),
					}),
				);
				Err(response.into_response())
			}
		}
	}
}
