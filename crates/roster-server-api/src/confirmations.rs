// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use roster_confirmation_core::Confirmation;
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Body of `POST /confirm/send/invite/clinic/{clinic_id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ClinicianInviteRequest {
	pub email: String,
	#[serde(default)]
	pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreatorResponse {
	pub user_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clinic_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clinic_name: Option<String>,
}

/// A confirmation as returned to callers. `id` always echoes `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
	pub id: String,
	pub key: String,
	#[serde(rename = "type")]
	pub confirmation_type: String,
	pub status: String,
	pub email: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clinic_id: Option<String>,
	pub creator_id: String,
	pub creator: CreatorResponse,
	pub template_name: String,
	pub created: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modified: Option<DateTime<Utc>>,
}

impl From<Confirmation> for ConfirmationResponse {
	fn from(confirmation: Confirmation) -> Self {
		let clinic = confirmation.clinic().cloned();
		Self {
			id: confirmation.key.to_string(),
			key: confirmation.key.into_inner(),
			confirmation_type: confirmation.kind.confirmation_type().to_string(),
			status: confirmation.status.to_string(),
			email: confirmation.email,
			user_id: confirmation.user_id.map(|id| id.into_inner()),
			clinic_id: clinic.as_ref().map(|c| c.clinic_id.to_string()),
			creator_id: confirmation.creator_id.into_inner(),
			creator: CreatorResponse {
				user_id: confirmation.creator.user_id.into_inner(),
				full_name: confirmation.creator.full_name,
				clinic_id: clinic.as_ref().map(|c| c.clinic_id.to_string()),
				clinic_name: clinic.map(|c| c.clinic_name),
			},
			template_name: confirmation.template_name.to_string(),
			created: confirmation.created_at,
			modified: confirmation.modified_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InviteErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StatusResponse {
	pub status: String,
}
