// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Roster clinician invite server.
//!
//! Serves the clinician invite confirmation endpoints. Callers authenticate
//! with an identity service session token; clinic membership lives in the
//! clinic service and Roster keeps a local mirror of each pending invite.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod routes;

pub use api::{create_router, AppState};
pub use api_docs::ApiDoc;
pub use error::ServerError;
pub use roster_server_config::ServerConfig;
