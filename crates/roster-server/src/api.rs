// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router and shared application state.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, patch, post, put},
	Router,
};
use roster_server_db::ConfirmationStore;
use roster_server_identity::IdentityLookup;
use roster_server_invites::InviteService;

use crate::auth_middleware::auth_layer;
use crate::routes::{docs, health, invitations};

#[derive(Clone)]
pub struct AppState {
	pub invites: Arc<InviteService>,
	pub store: Arc<dyn ConfirmationStore>,
	/// Validates inbound session tokens.
	pub identity: Arc<dyn IdentityLookup>,
	/// Header carrying the caller's session token.
	pub session_header: String,
}

impl AppState {
	pub fn new(
		invites: Arc<InviteService>,
		store: Arc<dyn ConfirmationStore>,
		identity: Arc<dyn IdentityLookup>,
		session_header: impl Into<String>,
	) -> Self {
		Self {
			invites,
			store,
			identity,
			session_header: session_header.into(),
		}
	}
}

pub fn create_router(state: AppState) -> Router {
	let confirm_routes = Router::new()
		.route(
			"/confirm/send/invite/clinic/{clinic_id}",
			post(invitations::send_clinician_invite),
		)
		.route(
			"/confirm/resend/invite/clinic/{clinic_id}/{invite_id}",
			patch(invitations::resend_clinician_invite),
		)
		.route(
			"/confirm/invitations/clinician/{user_id}",
			get(invitations::get_clinician_invitations),
		)
		.route(
			"/confirm/accept/invite/clinician/{user_id}/{invite_id}",
			put(invitations::accept_clinician_invite),
		)
		.route(
			"/confirm/dismiss/invite/clinician/{user_id}/{invite_id}",
			put(invitations::dismiss_clinician_invite),
		)
		.route(
			"/confirm/cancel/invite/clinic/{clinic_id}/{invite_id}",
			put(invitations::cancel_clinician_invite),
		)
		.route_layer(middleware::from_fn_with_state(state.clone(), auth_layer));

	Router::new()
		.route("/status", get(health::status))
		.route("/api-docs/openapi.json", get(docs::openapi_json))
		.merge(confirm_routes)
		.with_state(state)
}
