// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity service client for Roster.
//!
//! - [`IdentityLookup`] resolves accounts and validates session tokens.
//! - [`ProfileLookup`] fetches display profiles for notification content.
//! - [`ServerLogin`] obtains and caches Roster's own server token.

mod client;
mod error;
mod login;
mod profile;
mod types;

pub use client::{HttpIdentityClient, IdentityLookup};
pub use error::IdentityError;
pub use login::ServerLogin;
pub use profile::{HttpProfileClient, ProfileLookup};
pub use types::{Account, Profile, TokenData};
