// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the identity service client.

use roster_server_auth::CredentialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// Roster could not obtain its own server token.
	#[error(transparent)]
	Credential(#[from] CredentialError),

	/// Invalid or unparseable response.
	#[error("Invalid response from identity service: {0}")]
	InvalidResponse(String),

	/// The identity service returned an unexpected status.
	#[error("Identity service error: {status} - {message}")]
	ApiError { status: u16, message: String },
}

impl IdentityError {
	/// Map a `reqwest` send error, logging it.
	pub(crate) fn from_send(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			tracing::error!("Identity service request timed out");
			return IdentityError::Timeout;
		}
		tracing::error!(error = %e, "Network error during identity service request");
		IdentityError::Network(e)
	}
}
