// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use roster_server_api::StatusResponse;

use crate::api::AppState;

#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Store is reachable", body = StatusResponse),
        (status = 500, description = "Store is unreachable", body = StatusResponse)
    ),
    tag = "health"
)]
/// GET /status - Liveness check backed by a trivial store query.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
	match state.store.ping().await {
		Ok(()) => (
			StatusCode::OK,
			Json(StatusResponse {
				status: "ok".to_string(),
			}),
		),
		Err(e) => {
			tracing::error!(error = %e, "Store health check failed");
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				Json(StatusResponse {
					status: "store unavailable".to_string(),
				}),
			)
		}
	}
}
