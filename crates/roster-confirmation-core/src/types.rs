// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes and the enums stored alongside every confirmation.
//!
//! Ids issued by the identity and clinic services are opaque strings, so the
//! newtypes here wrap `String` rather than `Uuid`. They still keep user ids,
//! clinic ids and invite keys from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wrap an id issued elsewhere.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Borrow the id as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Take the inner string.
			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
	};
}

define_id_type!(UserId, "Account id issued by the identity service.");
define_id_type!(ClinicId, "Clinic id issued by the clinic service.");
define_id_type!(
	ConfirmationKey,
	"Invite key shared by the local confirmation and the remote clinic invite."
);

impl ConfirmationKey {
	/// Number of random bytes behind a generated key.
	pub const BYTES: usize = 24;

	/// Generate a fresh random key (hex encoded).
	pub fn generate() -> Self {
		let bytes: [u8; Self::BYTES] = rand::random();
		Self(hex::encode(bytes))
	}
}

// =============================================================================
// Confirmation Type
// =============================================================================

/// Error returned when a stored enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
	pub kind: &'static str,
	pub value: String,
}

/// Discriminator shared by every record in the confirmation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationType {
	#[serde(rename = "clinician_invitation")]
	ClinicianInvite,
	#[serde(rename = "careteam_invitation")]
	CareteamInvite,
	#[serde(rename = "password_reset")]
	PasswordReset,
	#[serde(rename = "signup_confirmation")]
	Signup,
}

impl ConfirmationType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ConfirmationType::ClinicianInvite => "clinician_invitation",
			ConfirmationType::CareteamInvite => "careteam_invitation",
			ConfirmationType::PasswordReset => "password_reset",
			ConfirmationType::Signup => "signup_confirmation",
		}
	}
}

impl fmt::Display for ConfirmationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ConfirmationType {
	type Err = ParseEnumError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"clinician_invitation" => Ok(ConfirmationType::ClinicianInvite),
			"careteam_invitation" => Ok(ConfirmationType::CareteamInvite),
			"password_reset" => Ok(ConfirmationType::PasswordReset),
			"signup_confirmation" => Ok(ConfirmationType::Signup),
			other => Err(ParseEnumError {
				kind: "confirmation type",
				value: other.to_string(),
			}),
		}
	}
}

// =============================================================================
// Confirmation Status
// =============================================================================

/// Lifecycle state of a confirmation.
///
/// There is no persisted "created" state: creation yields `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
	Pending,
	Completed,
	Declined,
	Canceled,
}

impl ConfirmationStatus {
	pub fn all() -> &'static [ConfirmationStatus] {
		&[
			ConfirmationStatus::Pending,
			ConfirmationStatus::Completed,
			ConfirmationStatus::Declined,
			ConfirmationStatus::Canceled,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ConfirmationStatus::Pending => "pending",
			ConfirmationStatus::Completed => "completed",
			ConfirmationStatus::Declined => "declined",
			ConfirmationStatus::Canceled => "canceled",
		}
	}

	/// Terminal states are never re-opened.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, ConfirmationStatus::Pending)
	}

	/// Returns true if a confirmation in `self` may move to `next`.
	pub fn can_transition_to(&self, next: ConfirmationStatus) -> bool {
		matches!(
			(self, next),
			(
				ConfirmationStatus::Pending,
				ConfirmationStatus::Completed
					| ConfirmationStatus::Declined
					| ConfirmationStatus::Canceled
			)
		)
	}
}

impl fmt::Display for ConfirmationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ConfirmationStatus {
	type Err = ParseEnumError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(ConfirmationStatus::Pending),
			"completed" => Ok(ConfirmationStatus::Completed),
			"declined" => Ok(ConfirmationStatus::Declined),
			"canceled" => Ok(ConfirmationStatus::Canceled),
			other => Err(ParseEnumError {
				kind: "confirmation status",
				value: other.to_string(),
			}),
		}
	}
}

// =============================================================================
// Template Name
// =============================================================================

/// Email template a confirmation is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateName {
	ClinicianInvite,
}

impl TemplateName {
	pub fn as_str(&self) -> &'static str {
		match self {
			TemplateName::ClinicianInvite => "clinician_invite",
		}
	}
}

impl fmt::Display for TemplateName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TemplateName {
	type Err = ParseEnumError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"clinician_invite" => Ok(TemplateName::ClinicianInvite),
			other => Err(ParseEnumError {
				kind: "template name",
				value: other.to_string(),
			}),
		}
	}
}
