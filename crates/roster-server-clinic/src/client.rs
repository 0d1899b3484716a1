// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Clinic service client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use roster_confirmation_core::{ClinicId, ConfirmationKey, UserId};
use roster_server_auth::{ServerTokenSource, SESSION_TOKEN_HEADER};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::error::ClinicError;
use crate::types::{AssociateClinician, CreateClinicianInvite, RemoteResponse};

/// Operations Roster needs from the clinic service.
///
/// Every call authenticates as Roster itself; the caller's authority is
/// checked separately (see `get_clinician`).
#[async_trait]
pub trait ClinicService: Send + Sync {
	/// `GET /v1/clinics/{clinic_id}` → `Clinic`
	async fn get_clinic(&self, clinic_id: &ClinicId) -> Result<RemoteResponse, ClinicError>;

	/// `GET /v1/clinics/{clinic_id}/clinicians/{user_id}` → `Clinician`
	async fn get_clinician(
		&self,
		clinic_id: &ClinicId,
		user_id: &UserId,
	) -> Result<RemoteResponse, ClinicError>;

	/// `POST /v1/clinics/{clinic_id}/clinicians`
	async fn create_clinician_invite(
		&self,
		clinic_id: &ClinicId,
		invite: &CreateClinicianInvite,
	) -> Result<RemoteResponse, ClinicError>;

	/// `GET /v1/clinics/{clinic_id}/invites/clinicians/{invite_id}/clinician` → `InvitedClinician`
	async fn get_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError>;

	/// `DELETE /v1/clinics/{clinic_id}/invites/clinicians/{invite_id}/clinician`
	async fn delete_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError>;

	/// `PATCH /v1/clinics/{clinic_id}/invites/clinicians/{invite_id}/clinician`
	async fn associate_clinician_to_user(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
		association: &AssociateClinician,
	) -> Result<RemoteResponse, ClinicError>;
}

/// HTTP implementation of [`ClinicService`].
#[derive(Clone)]
pub struct HttpClinicClient {
	http_client: Client,
	base_url: String,
	credentials: Arc<dyn ServerTokenSource>,
}

impl HttpClinicClient {
	pub fn new(
		base_url: impl Into<String>,
		timeout: Duration,
		credentials: Arc<dyn ServerTokenSource>,
	) -> Self {
		Self {
			http_client: roster_common_http::new_client_with_timeout(timeout),
			base_url: base_url.into(),
			credentials,
		}
	}

	fn url(&self, segments: &[&str]) -> Result<Url, ClinicError> {
		let mut url = Url::parse(&self.base_url)
			.map_err(|e| ClinicError::InvalidResponse(format!("invalid base url: {e}")))?;
		url
			.path_segments_mut()
			.map_err(|_| ClinicError::InvalidResponse("base url cannot be a base".to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	fn invite_url(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<Url, ClinicError> {
		self.url(&[
			"v1",
			"clinics",
			clinic_id.as_str(),
			"invites",
			"clinicians",
			invite_id.as_str(),
			"clinician",
		])
	}

	async fn send<B: Serialize + Sync>(
		&self,
		method: Method,
		url: Url,
		body: Option<&B>,
	) -> Result<RemoteResponse, ClinicError> {
		let token = self.credentials.server_token().await?;

		debug!(method = %method, url = %url, "Sending request to clinic service");

		let mut request = self
			.http_client
			.request(method, url)
			.header(SESSION_TOKEN_HEADER, token.expose().as_str());
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("Clinic service request timed out");
				return ClinicError::Timeout;
			}
			error!(error = %e, "Network error during clinic service request");
			ClinicError::Network(e)
		})?;

		let status = response.status();
		let body = response.text().await.map_err(|e| {
			error!(error = %e, "Failed to read clinic service response body");
			ClinicError::Network(e)
		})?;

		if status == StatusCode::UNAUTHORIZED {
			warn!("Clinic service refused the server token");
			self.credentials.invalidate().await;
		}

		debug!(status = %status, "Received response from clinic service");
		Ok(RemoteResponse::new(status, body))
	}
}

#[async_trait]
impl ClinicService for HttpClinicClient {
	#[instrument(skip(self), fields(clinic_id = %clinic_id))]
	async fn get_clinic(&self, clinic_id: &ClinicId) -> Result<RemoteResponse, ClinicError> {
		let url = self.url(&["v1", "clinics", clinic_id.as_str()])?;
		self.send::<()>(Method::GET, url, None).await
	}

	#[instrument(skip(self), fields(clinic_id = %clinic_id, user_id = %user_id))]
	async fn get_clinician(
		&self,
		clinic_id: &ClinicId,
		user_id: &UserId,
	) -> Result<RemoteResponse, ClinicError> {
		let url = self.url(&[
			"v1",
			"clinics",
			clinic_id.as_str(),
			"clinicians",
			user_id.as_str(),
		])?;
		self.send::<()>(Method::GET, url, None).await
	}

	#[instrument(skip(self, invite), fields(clinic_id = %clinic_id, invite_key = %invite.invite_id))]
	async fn create_clinician_invite(
		&self,
		clinic_id: &ClinicId,
		invite: &CreateClinicianInvite,
	) -> Result<RemoteResponse, ClinicError> {
		let url = self.url(&["v1", "clinics", clinic_id.as_str(), "clinicians"])?;
		self.send(Method::POST, url, Some(invite)).await
	}

	#[instrument(skip(self), fields(clinic_id = %clinic_id, invite_key = %invite_id))]
	async fn get_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError> {
		let url = self.invite_url(clinic_id, invite_id)?;
		self.send::<()>(Method::GET, url, None).await
	}

	#[instrument(skip(self), fields(clinic_id = %clinic_id, invite_key = %invite_id))]
	async fn delete_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError> {
		let url = self.invite_url(clinic_id, invite_id)?;
		self.send::<()>(Method::DELETE, url, None).await
	}

	#[instrument(
		skip(self, association),
		fields(clinic_id = %clinic_id, invite_key = %invite_id, user_id = %association.user_id)
	)]
	async fn associate_clinician_to_user(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
		association: &AssociateClinician,
	) -> Result<RemoteResponse, ClinicError> {
		let url = self.invite_url(clinic_id, invite_id)?;
		self.send(Method::PATCH, url, Some(association)).await
	}
}
