// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_confirmation_core::Confirmation;

/// Values substituted into an invite email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
	pub clinic_name: String,
	pub creator_name: String,
	pub email: String,
	/// `login` when the recipient already has an account, else `signup`.
	pub web_path: String,
}

impl NotificationContent {
	/// Build content for a clinician invite whose creator profile has been filled in.
	///
	/// Returns `None` for other invite kinds.
	pub fn for_clinician_invite(confirmation: &Confirmation) -> Option<Self> {
		let clinic = confirmation.clinic()?;
		Some(Self {
			clinic_name: clinic.clinic_name.clone(),
			creator_name: confirmation.creator.full_name.clone().unwrap_or_default(),
			email: confirmation.email.clone(),
			web_path: confirmation.web_path().to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_confirmation_core::{ClinicId, ClinicianInvite, UserId};

	#[test]
	fn content_follows_account_state() {
		let mut conf = Confirmation::new_clinician_invite(
			UserId::from("admin"),
			"new@clinic.org",
			ClinicianInvite {
				clinic_id: ClinicId::from("c1"),
				clinic_name: "Clinic One".to_string(),
			},
		);
		conf.creator.full_name = Some("Dr Admin".to_string());

		let content = NotificationContent::for_clinician_invite(&conf).unwrap();
		assert_eq!(content.clinic_name, "Clinic One");
		assert_eq!(content.creator_name, "Dr Admin");
		assert_eq!(content.email, "new@clinic.org");
		assert_eq!(content.web_path, "signup");

		conf.attach_user(Some(UserId::from("u1")));
		let content = NotificationContent::for_clinician_invite(&conf).unwrap();
		assert_eq!(content.web_path, "login");
	}
}
