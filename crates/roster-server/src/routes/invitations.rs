// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clinician invite HTTP handlers.
//!
//! # Authorization Matrix
//!
//! | Endpoint                     | Required caller                          |
//! |-----------------------------|------------------------------------------|
//! | `send_clinician_invite`      | clinic admin or server token             |
//! | `resend_clinician_invite`    | clinic admin or server token             |
//! | `cancel_clinician_invite`    | clinic admin or server token             |
//! | `get_clinician_invitations`  | the user named in the path               |
//! | `accept_clinician_invite`    | the user named in the path, owning email |
//! | `dismiss_clinician_invite`   | the user named in the path, owning email |
//!
//! Server tokens never act for the user-scoped endpoints.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	Json,
};
use roster_confirmation_core::{ClinicId, ConfirmationKey, UserId};
use roster_server_api::{ClinicianInviteRequest, ConfirmationResponse, InviteErrorResponse};
use roster_server_invites::{InviteError, SendInvite};

use crate::{api::AppState, auth_middleware::RequireCaller, error::ServerError};

#[utoipa::path(
    post,
    path = "/confirm/send/invite/clinic/{clinic_id}",
    params(
        ("clinic_id" = String, Path, description = "Clinic ID")
    ),
    request_body = ClinicianInviteRequest,
    responses(
        (status = 200, description = "Invite created", body = ConfirmationResponse),
        (status = 400, description = "Malformed body", body = InviteErrorResponse),
        (status = 401, description = "Not a clinic admin", body = InviteErrorResponse),
        (status = 500, description = "Clinic or store failure", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// Invite a clinician to a clinic.
///
/// Relays the clinic service's status and body when it rejects the invite.
#[tracing::instrument(skip(state, caller, payload), fields(clinic_id = %clinic_id))]
pub async fn send_clinician_invite(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path(clinic_id): Path<String>,
	payload: Result<Json<ClinicianInviteRequest>, JsonRejection>,
) -> Result<Json<ConfirmationResponse>, ServerError> {
	// A body that fails to decode is reported only after authorization.
	let invite = payload
		.map(|Json(request)| SendInvite {
			email: request.email,
			roles: request.roles,
		})
		.map_err(|e| InviteError::BadRequest(e.body_text()));

	let confirmation = state
		.invites
		.send(&caller, &ClinicId::new(clinic_id), invite)
		.await?;
	Ok(Json(confirmation.into()))
}

#[utoipa::path(
    patch,
    path = "/confirm/resend/invite/clinic/{clinic_id}/{invite_id}",
    params(
        ("clinic_id" = String, Path, description = "Clinic ID"),
        ("invite_id" = String, Path, description = "Invite key")
    ),
    responses(
        (status = 200, description = "Invite re-sent", body = ConfirmationResponse),
        (status = 401, description = "Not a clinic admin", body = InviteErrorResponse),
        (status = 500, description = "Clinic or store failure", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// Re-send the notification for a pending invite.
#[tracing::instrument(skip(state, caller), fields(clinic_id = %clinic_id, invite_key = %invite_id))]
pub async fn resend_clinician_invite(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path((clinic_id, invite_id)): Path<(String, String)>,
) -> Result<Json<ConfirmationResponse>, ServerError> {
	let confirmation = state
		.invites
		.resend(
			&caller,
			&ClinicId::new(clinic_id),
			&ConfirmationKey::new(invite_id),
		)
		.await?;
	Ok(Json(confirmation.into()))
}

#[utoipa::path(
    get,
    path = "/confirm/invitations/clinician/{user_id}",
    params(
        ("user_id" = String, Path, description = "Caller's user ID")
    ),
    responses(
        (status = 200, description = "Pending invites", body = [ConfirmationResponse]),
        (status = 401, description = "Not the named user", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// List pending invites addressed to the caller.
#[tracing::instrument(skip(state, caller), fields(user_id = %user_id))]
pub async fn get_clinician_invitations(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path(user_id): Path<String>,
) -> Result<Json<Vec<ConfirmationResponse>>, ServerError> {
	let invites = state.invites.list(&caller, &UserId::new(user_id)).await?;
	Ok(Json(invites.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/confirm/accept/invite/clinician/{user_id}/{invite_id}",
    params(
        ("user_id" = String, Path, description = "Caller's user ID"),
        ("invite_id" = String, Path, description = "Invite key")
    ),
    responses(
        (status = 200, description = "Invite accepted", body = ConfirmationResponse),
        (status = 401, description = "Not the recipient", body = InviteErrorResponse),
        (status = 404, description = "No pending invite", body = InviteErrorResponse),
        (status = 500, description = "Clinic or store failure", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// Accept an invite and join the clinic.
#[tracing::instrument(skip(state, caller), fields(user_id = %user_id, invite_key = %invite_id))]
pub async fn accept_clinician_invite(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path((user_id, invite_id)): Path<(String, String)>,
) -> Result<Json<ConfirmationResponse>, ServerError> {
	let confirmation = state
		.invites
		.accept(
			&caller,
			&UserId::new(user_id),
			&ConfirmationKey::new(invite_id),
		)
		.await?;
	Ok(Json(confirmation.into()))
}

#[utoipa::path(
    put,
    path = "/confirm/dismiss/invite/clinician/{user_id}/{invite_id}",
    params(
        ("user_id" = String, Path, description = "Caller's user ID"),
        ("invite_id" = String, Path, description = "Invite key")
    ),
    responses(
        (status = 200, description = "Invite declined", body = ConfirmationResponse),
        (status = 401, description = "Not the recipient", body = InviteErrorResponse),
        (status = 404, description = "No pending invite", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// Decline an invite.
#[tracing::instrument(skip(state, caller), fields(user_id = %user_id, invite_key = %invite_id))]
pub async fn dismiss_clinician_invite(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path((user_id, invite_id)): Path<(String, String)>,
) -> Result<Json<ConfirmationResponse>, ServerError> {
	let confirmation = state
		.invites
		.dismiss(
			&caller,
			&UserId::new(user_id),
			&ConfirmationKey::new(invite_id),
		)
		.await?;
	Ok(Json(confirmation.into()))
}

#[utoipa::path(
    put,
    path = "/confirm/cancel/invite/clinic/{clinic_id}/{invite_id}",
    params(
        ("clinic_id" = String, Path, description = "Clinic ID"),
        ("invite_id" = String, Path, description = "Invite key")
    ),
    responses(
        (status = 200, description = "Invite canceled", body = ConfirmationResponse),
        (status = 401, description = "Not a clinic admin", body = InviteErrorResponse),
        (status = 404, description = "No pending invite", body = InviteErrorResponse)
    ),
    tag = "invitations"
)]
/// Revoke a pending invite.
#[tracing::instrument(skip(state, caller), fields(clinic_id = %clinic_id, invite_key = %invite_id))]
pub async fn cancel_clinician_invite(
	RequireCaller(caller): RequireCaller,
	State(state): State<AppState>,
	Path((clinic_id, invite_id)): Path<(String, String)>,
) -> Result<Json<ConfirmationResponse>, ServerError> {
	let confirmation = state
		.invites
		.cancel(
			&caller,
			&ClinicId::new(clinic_id),
			&ConfirmationKey::new(invite_id),
		)
		.await?;
	Ok(Json(confirmation.into()))
}
