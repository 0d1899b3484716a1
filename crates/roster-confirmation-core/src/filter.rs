// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store query filter.
//!
//! The type is mandatory: the store is shared between invite kinds and a
//! query without a type would leak other workflows' records.

use crate::confirmation::Confirmation;
use crate::types::{ClinicId, ConfirmationKey, ConfirmationStatus, ConfirmationType, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationFilter {
	pub confirmation_type: ConfirmationType,
	pub key: Option<ConfirmationKey>,
	pub email: Option<String>,
	pub clinic_id: Option<ClinicId>,
	pub user_id: Option<UserId>,
	pub status: Option<ConfirmationStatus>,
}

impl ConfirmationFilter {
	pub fn new(confirmation_type: ConfirmationType) -> Self {
		Self {
			confirmation_type,
			key: None,
			email: None,
			clinic_id: None,
			user_id: None,
			status: None,
		}
	}

	/// Pending clinician invites, the starting point of every invite query.
	pub fn pending_clinician_invites() -> Self {
		Self::new(ConfirmationType::ClinicianInvite).status(ConfirmationStatus::Pending)
	}

	pub fn key(mut self, key: ConfirmationKey) -> Self {
		self.key = Some(key);
		self
	}

	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn clinic_id(mut self, clinic_id: ClinicId) -> Self {
		self.clinic_id = Some(clinic_id);
		self
	}

	pub fn user_id(mut self, user_id: UserId) -> Self {
		self.user_id = Some(user_id);
		self
	}

	pub fn status(mut self, status: ConfirmationStatus) -> Self {
		self.status = Some(status);
		self
	}

	/// Evaluate the filter in memory. Stores that cannot push the filter down use this.
	pub fn matches(&self, confirmation: &Confirmation) -> bool {
		if confirmation.confirmation_type() != self.confirmation_type {
			return false;
		}
		if let Some(key) = &self.key {
			if &confirmation.key != key {
				return false;
			}
		}
		if let Some(email) = &self.email {
			if &confirmation.email != email {
				return false;
			}
		}
		if let Some(clinic_id) = &self.clinic_id {
			if confirmation.clinic_id() != Some(clinic_id) {
				return false;
			}
		}
		if let Some(user_id) = &self.user_id {
			if confirmation.user_id.as_ref() != Some(user_id) {
				return false;
			}
		}
		if let Some(status) = self.status {
			if confirmation.status != status {
				return false;
			}
		}
		true
	}
}
