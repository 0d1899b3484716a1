// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use thiserror::Error;

/// Outcome of a failed invite operation.
#[derive(Debug, Error)]
pub enum InviteError {
	/// The caller failed the admin or recipient check.
	#[error("unauthorized")]
	Unauthorized,

	/// No pending confirmation matched.
	#[error("invite not found")]
	NotFound,

	/// The clinic service answered with a non-success status. Forwarded as is.
	#[error("clinic service returned {status}")]
	UpstreamRelay { status: StatusCode, body: String },

	#[error("error finding clinic: {0}")]
	FindingClinicFailed(String),

	#[error("error finding user: {0}")]
	LookupFailed(String),

	/// A remote call or store query failed outright.
	#[error("transport failure: {0}")]
	Transport(String),

	/// The local mirror could not be written after the remote side changed.
	#[error("error saving confirmation: {0}")]
	Persistence(String),

	#[error("bad request: {0}")]
	BadRequest(String),
}

impl InviteError {
	/// Stable machine-readable code reported to callers.
	pub fn error_code(&self) -> &'static str {
		match self {
			InviteError::Unauthorized => "unauthorized",
			InviteError::NotFound => "invite_not_found",
			InviteError::UpstreamRelay { .. } => "upstream_relay",
			InviteError::FindingClinicFailed(_) => "error_finding_clinic",
			InviteError::LookupFailed(_) => "error_finding_user",
			InviteError::Transport(_) => "internal_error",
			InviteError::Persistence(_) => "error_saving_confirmation",
			InviteError::BadRequest(_) => "error_decoding_confirmation",
		}
	}

	/// HTTP status the error maps to.
	pub fn status_code(&self) -> StatusCode {
		match self {
			InviteError::Unauthorized => StatusCode::UNAUTHORIZED,
			InviteError::NotFound => StatusCode::NOT_FOUND,
			InviteError::UpstreamRelay { status, .. } => *status,
			InviteError::BadRequest(_) => StatusCode::BAD_REQUEST,
			InviteError::FindingClinicFailed(_)
			| InviteError::LookupFailed(_)
			| InviteError::Transport(_)
			| InviteError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}
