// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document for the Roster HTTP API.

use roster_server_api::{
	ClinicianInviteRequest, ConfirmationResponse, CreatorResponse, InviteErrorResponse,
	StatusResponse,
};
use utoipa::OpenApi;

use crate::routes::{health, invitations};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Roster",
		description = "Clinician invite confirmations"
	),
	paths(
		health::status,
		invitations::send_clinician_invite,
		invitations::resend_clinician_invite,
		invitations::get_clinician_invitations,
		invitations::accept_clinician_invite,
		invitations::dismiss_clinician_invite,
		invitations::cancel_clinician_invite,
	),
	components(schemas(
		ClinicianInviteRequest,
		ConfirmationResponse,
		CreatorResponse,
		InviteErrorResponse,
		StatusResponse,
	)),
	tags(
		(name = "health", description = "Service health"),
		(name = "invitations", description = "Clinician invite lifecycle")
	)
)]
pub struct ApiDoc;
