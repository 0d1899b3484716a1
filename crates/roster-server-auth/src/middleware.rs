// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Header names and token extraction.
//!
//! Token values are never logged; they travel as [`SecretString`].

use http::HeaderMap;
use roster_common_secret::SecretString;
use tracing::instrument;

/// Header carrying a session token, inbound and outbound.
pub const SESSION_TOKEN_HEADER: &str = "x-tidepool-session-token";

/// Headers used for server login against the identity service.
pub const SERVER_NAME_HEADER: &str = "x-tidepool-server-name";
pub const SERVER_SECRET_HEADER: &str = "x-tidepool-server-secret";

/// Extract the session token from `header_name`.
///
/// Returns `None` if the header is missing, not valid ASCII, or blank.
#[instrument(level = "trace", skip_all, fields(header = %header_name))]
pub fn extract_session_token(headers: &HeaderMap, header_name: &str) -> Option<SecretString> {
	let value = headers.get(header_name)?.to_str().ok()?.trim();
	if value.is_empty() {
		return None;
	}
	Some(SecretString::new(value.to_string()))
}
