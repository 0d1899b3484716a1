// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The two authorization predicates every invite operation goes through.

use std::sync::Arc;

use roster_confirmation_core::{ClinicId, Confirmation};
use roster_server_auth::CallerToken;
use roster_server_clinic::{ClinicService, Clinician};
use roster_server_identity::IdentityLookup;
use tracing::{debug, error, instrument, warn};

use crate::error::InviteError;

pub struct AuthorizationGuard {
	clinic: Arc<dyn ClinicService>,
	identity: Arc<dyn IdentityLookup>,
	admin_role: String,
}

impl AuthorizationGuard {
	pub fn new(
		clinic: Arc<dyn ClinicService>,
		identity: Arc<dyn IdentityLookup>,
		admin_role: impl Into<String>,
	) -> Self {
		Self {
			clinic,
			identity,
			admin_role: admin_role.into(),
		}
	}

	/// Server tokens pass. Users must hold the admin role at `clinic_id`.
	///
	/// A transport failure or 5xx from the clinic service is
	/// [`InviteError::LookupFailed`]; any other non-OK status is
	/// [`InviteError::Unauthorized`].
	#[instrument(skip(self, caller), fields(clinic_id = %clinic_id, user_id = %caller.user_id()))]
	pub async fn assert_clinic_admin(
		&self,
		clinic_id: &ClinicId,
		caller: &CallerToken,
	) -> Result<(), InviteError> {
		if caller.is_server() {
			debug!("Server token bypasses clinic admin check");
			return Ok(());
		}

		let response = self
			.clinic
			.get_clinician(clinic_id, caller.user_id())
			.await
			.map_err(|e| {
				error!(error = %e, "Failed to look up clinician");
				InviteError::LookupFailed(e.to_string())
			})?;

		if response.status.is_server_error() {
			error!(status = %response.status, "Clinic service failed clinician lookup");
			return Err(InviteError::LookupFailed(format!(
				"clinic service returned {}",
				response.status
			)));
		}
		if !response.is_ok() {
			debug!(status = %response.status, "Caller is not a clinician at this clinic");
			return Err(InviteError::Unauthorized);
		}

		let clinician: Clinician = response
			.json()
			.map_err(|e| InviteError::LookupFailed(e.to_string()))?;
		if !clinician.has_role(&self.admin_role) {
			warn!(admin_role = %self.admin_role, "Caller lacks clinic admin role");
			return Err(InviteError::Unauthorized);
		}
		Ok(())
	}

	/// The caller must be an end user whose primary email is the invite's email.
	///
	/// The account is resolved with the caller's own session token; a failed
	/// lookup is treated as not authorized.
	#[instrument(skip(self, caller, confirmation), fields(user_id = %caller.user_id(), invite_key = %confirmation.key))]
	pub async fn assert_recipient_authorized(
		&self,
		caller: &CallerToken,
		confirmation: &Confirmation,
	) -> Result<(), InviteError> {
		if caller.is_server() {
			warn!("Server token cannot act as an invite recipient");
			return Err(InviteError::Unauthorized);
		}

		let account = match self
			.identity
			.resolve_user(caller.user_id().as_str(), caller.session_token())
			.await
		{
			Ok(account) => account,
			Err(e) => {
				warn!(error = %e, "Failed to resolve caller account");
				None
			}
		};

		match account {
			Some(account) if account.primary_email() == Some(confirmation.email.as_str()) => Ok(()),
			_ => {
				warn!("Caller is not the invite recipient");
				Err(InviteError::Unauthorized)
			}
		}
	}
}
