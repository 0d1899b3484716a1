// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the clinic service client.

use roster_server_auth::CredentialError;
use thiserror::Error;

/// Failures reaching the clinic service. A non-success HTTP status is not an
/// error here; it comes back as a [`crate::RemoteResponse`].
#[derive(Debug, Error)]
pub enum ClinicError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// Roster could not obtain its own server token.
	#[error(transparent)]
	Credential(#[from] CredentialError),

	/// A success response whose body did not match the expected shape.
	#[error("Invalid response from clinic service: {0}")]
	InvalidResponse(String),
}
