// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client for the clinic membership service.
//!
//! The clinic service is the source of truth for clinics, clinician roles and
//! pending clinician invites. Responses are returned with their raw status
//! and body so non-success outcomes can be relayed to Roster's own callers
//! unchanged.

mod client;
mod error;
mod types;

pub use client::{ClinicService, HttpClinicClient};
pub use error::ClinicError;
pub use types::{
	AssociateClinician, Clinic, Clinician, CreateClinicianInvite, InvitedClinician, RemoteResponse,
};
