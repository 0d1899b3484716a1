// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The confirmation record and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
	ClinicId, ConfirmationKey, ConfirmationStatus, ConfirmationType, TemplateName, UserId,
};

/// Clinic scope carried by clinician invites only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicianInvite {
	pub clinic_id: ClinicId,
	/// Snapshot of the clinic name at send/resend time.
	pub clinic_name: String,
}

/// Kind-specific data. The variant decides the stored `type` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InviteKind {
	#[serde(rename = "clinician_invitation")]
	ClinicianInvite(ClinicianInvite),
	#[serde(rename = "careteam_invitation")]
	CareteamInvite,
	#[serde(rename = "password_reset")]
	PasswordReset,
	#[serde(rename = "signup_confirmation")]
	Signup,
}

impl InviteKind {
	pub fn confirmation_type(&self) -> ConfirmationType {
		match self {
			InviteKind::ClinicianInvite(_) => ConfirmationType::ClinicianInvite,
			InviteKind::CareteamInvite => ConfirmationType::CareteamInvite,
			InviteKind::PasswordReset => ConfirmationType::PasswordReset,
			InviteKind::Signup => ConfirmationType::Signup,
		}
	}

	pub fn clinic(&self) -> Option<&ClinicianInvite> {
		match self {
			InviteKind::ClinicianInvite(clinic) => Some(clinic),
			_ => None,
		}
	}
}

/// Denormalized snapshot of who sent the invite, used for notification content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
	pub user_id: UserId,
	/// Filled in from the profile service just before dispatch.
	pub full_name: Option<String>,
}

/// Error returned when a status change would move a confirmation backwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("confirmation {key} cannot move from {from} to {to}")]
pub struct TransitionError {
	pub key: ConfirmationKey,
	pub from: ConfirmationStatus,
	pub to: ConfirmationStatus,
}

/// A pending (or settled) invite as mirrored in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
	pub key: ConfirmationKey,
	pub status: ConfirmationStatus,
	pub email: String,
	pub user_id: Option<UserId>,
	pub creator_id: UserId,
	pub creator: Creator,
	pub template_name: TemplateName,
	pub kind: InviteKind,
	pub created_at: DateTime<Utc>,
	pub modified_at: Option<DateTime<Utc>>,
}

impl Confirmation {
	/// Build a new pending clinician invite with a freshly generated key.
	pub fn new_clinician_invite(
		creator_id: UserId,
		email: impl Into<String>,
		clinic: ClinicianInvite,
	) -> Self {
		Self::clinician_invite_with_key(ConfirmationKey::generate(), creator_id, email, clinic)
	}

	/// Build a pending clinician invite around a key the clinic service already knows.
	pub fn clinician_invite_with_key(
		key: ConfirmationKey,
		creator_id: UserId,
		email: impl Into<String>,
		clinic: ClinicianInvite,
	) -> Self {
		Self {
			key,
			status: ConfirmationStatus::Pending,
			email: email.into(),
			user_id: None,
			creator: Creator {
				user_id: creator_id.clone(),
				full_name: None,
			},
			creator_id,
			template_name: TemplateName::ClinicianInvite,
			kind: InviteKind::ClinicianInvite(clinic),
			created_at: Utc::now(),
			modified_at: None,
		}
	}

	pub fn confirmation_type(&self) -> ConfirmationType {
		self.kind.confirmation_type()
	}

	pub fn clinic(&self) -> Option<&ClinicianInvite> {
		self.kind.clinic()
	}

	pub fn clinic_id(&self) -> Option<&ClinicId> {
		self.clinic().map(|c| &c.clinic_id)
	}

	pub fn is_pending(&self) -> bool {
		self.status == ConfirmationStatus::Pending
	}

	/// Record the recipient's account id. `None` never clears an existing id.
	pub fn attach_user(&mut self, user_id: Option<UserId>) {
		if let Some(user_id) = user_id {
			self.user_id = Some(user_id);
		}
	}

	/// Refresh the clinic name on a clinician invite. The clinic id never
	/// changes once set; other kinds are untouched.
	pub fn refresh_clinic_name(&mut self, clinic_name: impl Into<String>) {
		if let InviteKind::ClinicianInvite(current) = &mut self.kind {
			current.clinic_name = clinic_name.into();
		}
	}

	/// Move the confirmation to `next`, stamping `modified_at`.
	pub fn transition(&mut self, next: ConfirmationStatus) -> Result<(), TransitionError> {
		if !self.status.can_transition_to(next) {
			return Err(TransitionError {
				key: self.key.clone(),
				from: self.status,
				to: next,
			});
		}
		self.status = next;
		self.modified_at = Some(Utc::now());
		Ok(())
	}

	/// Which web flow the notification should point at.
	pub fn web_path(&self) -> &'static str {
		if self.user_id.is_some() {
			"login"
		} else {
			"signup"
		}
	}
}
