// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::{header::CONTENT_TYPE, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use roster_server_api::InviteErrorResponse;
use roster_server_invites::InviteError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error(transparent)]
	Invite(#[from] InviteError),
}

fn error_body(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
	(
		status,
		Json(InviteErrorResponse {
			error: error.to_string(),
			message: message.into(),
		}),
	)
		.into_response()
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let ServerError::Invite(err) = self;

		let status = err.status_code();
		let code = err.error_code();
		match err {
			// Relayed verbatim; the clinic service always answers in JSON.
			InviteError::UpstreamRelay { status, body } => {
				(status, [(CONTENT_TYPE, "application/json")], body).into_response()
			}
			InviteError::Unauthorized => error_body(status, code, "Not authorized"),
			InviteError::NotFound => error_body(status, code, "Invite not found"),
			InviteError::BadRequest(message) => error_body(status, code, message),
			InviteError::FindingClinicFailed(e) => {
				tracing::error!(error = %e, "error finding clinic");
				error_body(status, code, "Error finding clinic")
			}
			InviteError::LookupFailed(e) => {
				tracing::error!(error = %e, "error finding user");
				error_body(status, code, "Error finding user")
			}
			InviteError::Transport(e) => {
				tracing::error!(error = %e, "upstream call failed");
				error_body(status, code, "Internal server error")
			}
			InviteError::Persistence(e) => {
				tracing::error!(error = %e, "error saving confirmation");
				error_body(status, code, "Error saving confirmation")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn body_string(response: Response) -> String {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	#[tokio::test]
	async fn relay_forwards_status_and_body() {
		let response = ServerError::from(InviteError::UpstreamRelay {
			status: StatusCode::CONFLICT,
			body: r#"{"code":409}"#.to_string(),
		})
		.into_response();

		assert_eq!(response.status(), StatusCode::CONFLICT);
		assert_eq!(
			response.headers().get(CONTENT_TYPE).unwrap(),
			"application/json"
		);
		assert_eq!(body_string(response).await, r#"{"code":409}"#);
	}

	#[tokio::test]
	async fn internal_errors_do_not_leak_details() {
		let response =
			ServerError::from(InviteError::Persistence("disk I/O error".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
		assert_eq!(body["error"], "error_saving_confirmation");
		assert!(!body["message"].as_str().unwrap().contains("disk"));
	}

	#[tokio::test]
	async fn bad_request_uses_decoding_code() {
		let response =
			ServerError::from(InviteError::BadRequest("missing field `email`".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
		assert_eq!(body["error"], "error_decoding_confirmation");
	}
}
