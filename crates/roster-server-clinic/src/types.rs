// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clinic service wire types.

use http::StatusCode;
use roster_confirmation_core::{ClinicId, ConfirmationKey, UserId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ClinicError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinic {
	pub id: ClinicId,
	pub name: String,
}

/// A clinician's membership record at one clinic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clinician {
	#[serde(default)]
	pub roles: Vec<String>,
}

impl Clinician {
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r == role)
	}
}

/// A pending clinician invite as the clinic service knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedClinician {
	pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClinicianInvite {
	/// The local confirmation key, so both sides share one identifier.
	pub invite_id: ConfirmationKey,
	pub email: String,
	pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateClinician {
	pub user_id: UserId,
}

/// Raw status and body of a clinic service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
	pub status: StatusCode,
	pub body: String,
}

impl RemoteResponse {
	pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// A 200 response with `value` serialized as its body.
	pub fn ok_json<T: Serialize>(value: &T) -> Self {
		Self::new(
			StatusCode::OK,
			serde_json::to_string(value).unwrap_or_default(),
		)
	}

	pub fn is_ok(&self) -> bool {
		self.status == StatusCode::OK
	}

	pub fn is_not_found(&self) -> bool {
		self.status == StatusCode::NOT_FOUND
	}

	/// Decode the body.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClinicError> {
		serde_json::from_str(&self.body)
			.map_err(|e| ClinicError::InvalidResponse(format!("JSON parse error: {e}")))
	}
}
