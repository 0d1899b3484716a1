// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clinician invite workflow.
//!
//! [`InviteService`] sequences every invite operation the same way: authorize
//! through the [`AuthorizationGuard`], mutate the clinic service, then mirror
//! the outcome into the local confirmation store. The remote call always
//! lands first; a local save failure after a successful remote call is
//! reported as [`InviteError::Persistence`] and is not rolled back.
//!
//! Notification dispatch on send/resend is best effort. Failures are logged
//! and resend is the recovery path.

mod error;
mod guard;
mod orchestrator;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::InviteError;
pub use guard::AuthorizationGuard;
pub use orchestrator::{InviteService, SendInvite};
