// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller identity for Roster.
//!
//! Every inbound request carries a session token issued by the identity
//! service. Once the token is validated the request runs as a
//! [`CallerToken`]: either an end user or another backend service (a
//! "server" token). Server tokens are trusted for clinic administration but
//! never stand in for an end user.

pub mod caller;
pub mod middleware;
pub mod server;

pub use caller::{AuthContext, AuthRequired, CallerToken};
pub use middleware::{
	extract_session_token, SERVER_NAME_HEADER, SERVER_SECRET_HEADER, SESSION_TOKEN_HEADER,
};
pub use server::{CredentialError, ServerTokenSource, StaticServerToken};
