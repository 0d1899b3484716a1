// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Roster confirmations.
//!
//! A [`Confirmation`] is the locally owned mirror of a pending invite. The
//! store holding confirmations is shared by every invite kind, so each record
//! is tagged with an [`InviteKind`]; clinic-scoped data only exists on the
//! [`InviteKind::ClinicianInvite`] variant.
//!
//! Status only moves forward: `Pending` to one of `Completed`, `Declined` or
//! `Canceled`. See [`Confirmation::transition`].

pub mod confirmation;
pub mod filter;
pub mod types;

pub use confirmation::{ClinicianInvite, Confirmation, Creator, InviteKind, TransitionError};
pub use filter::ConfirmationFilter;
pub use types::{
	ClinicId, ConfirmationKey, ConfirmationStatus, ConfirmationType, ParseEnumError, TemplateName,
	UserId,
};
