// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Invite operations.
//!
//! Path-supplied user ids only shape the URL: every operation authorizes
//! against the caller's own token, and a path id that differs from the
//! caller is rejected.

use std::sync::Arc;

use roster_confirmation_core::{
	ClinicId, ClinicianInvite, Confirmation, ConfirmationFilter, ConfirmationKey,
	ConfirmationStatus, UserId,
};
use roster_server_auth::{CallerToken, ServerTokenSource};
use roster_server_clinic::{
	AssociateClinician, Clinic, ClinicService, CreateClinicianInvite, InvitedClinician,
};
use roster_server_db::ConfirmationStore;
use roster_server_email::{NotificationContent, NotificationSender};
use roster_server_identity::{IdentityLookup, ProfileLookup};
use tracing::{debug, error, info, instrument, warn};

use crate::error::InviteError;
use crate::guard::AuthorizationGuard;

/// Body of a send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInvite {
	pub email: String,
	pub roles: Vec<String>,
}

pub struct InviteService {
	store: Arc<dyn ConfirmationStore>,
	clinic: Arc<dyn ClinicService>,
	identity: Arc<dyn IdentityLookup>,
	profiles: Arc<dyn ProfileLookup>,
	notifier: Arc<dyn NotificationSender>,
	server_token: Arc<dyn ServerTokenSource>,
	guard: AuthorizationGuard,
}

impl InviteService {
	pub fn new(
		store: Arc<dyn ConfirmationStore>,
		clinic: Arc<dyn ClinicService>,
		identity: Arc<dyn IdentityLookup>,
		profiles: Arc<dyn ProfileLookup>,
		notifier: Arc<dyn NotificationSender>,
		server_token: Arc<dyn ServerTokenSource>,
		admin_role: impl Into<String>,
	) -> Self {
		let guard = AuthorizationGuard::new(clinic.clone(), identity.clone(), admin_role);
		Self {
			store,
			clinic,
			identity,
			profiles,
			notifier,
			server_token,
			guard,
		}
	}

	/// Create a remote pending invite and mirror it locally.
	///
	/// `invite` is the decoded request body; a decoding failure is only
	/// reported once the caller is known to be a clinic admin. Nothing is
	/// stored unless the clinic service accepts the invite.
	#[instrument(skip(self, caller, invite), fields(clinic_id = %clinic_id, user_id = %caller.user_id()))]
	pub async fn send(
		&self,
		caller: &CallerToken,
		clinic_id: &ClinicId,
		invite: Result<SendInvite, InviteError>,
	) -> Result<Confirmation, InviteError> {
		self.guard.assert_clinic_admin(clinic_id, caller).await?;
		let invite = invite?;
		let email = invite.email.trim().to_string();
		if email.is_empty() {
			return Err(InviteError::BadRequest("email is required".to_string()));
		}

		let clinic = self.fetch_clinic(clinic_id).await?;

		let mut confirmation = Confirmation::new_clinician_invite(
			caller.user_id().clone(),
			email.clone(),
			ClinicianInvite {
				clinic_id: clinic_id.clone(),
				clinic_name: clinic.name,
			},
		);
		confirmation.attach_user(self.existing_user_id(&email).await);

		let request = CreateClinicianInvite {
			invite_id: confirmation.key.clone(),
			email,
			roles: invite.roles,
		};
		let response = self
			.clinic
			.create_clinician_invite(clinic_id, &request)
			.await
			.map_err(|e| {
				error!(error = %e, invite_key = %confirmation.key, "Failed to create remote invite");
				InviteError::FindingClinicFailed(e.to_string())
			})?;
		if !response.is_ok() {
			warn!(status = %response.status, "Clinic service rejected invite");
			return Err(InviteError::UpstreamRelay {
				status: response.status,
				body: response.body,
			});
		}

		self.save_and_notify(&mut confirmation).await?;
		Ok(confirmation)
	}

	/// Re-send the notification for a remote pending invite.
	///
	/// A missing local record is recreated under the remote invite id. A
	/// missing remote invite is relayed, never recreated. A local record owned
	/// by another clinic is never moved.
	#[instrument(skip(self, caller), fields(clinic_id = %clinic_id, invite_key = %invite_id, user_id = %caller.user_id()))]
	pub async fn resend(
		&self,
		caller: &CallerToken,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<Confirmation, InviteError> {
		self.guard.assert_clinic_admin(clinic_id, caller).await?;
		let clinic = self.fetch_clinic(clinic_id).await?;

		let response = self
			.clinic
			.get_invited_clinician(clinic_id, invite_id)
			.await
			.map_err(|e| {
				error!(error = %e, "Failed to fetch remote invite");
				InviteError::FindingClinicFailed(e.to_string())
			})?;
		if !response.is_ok() {
			warn!(status = %response.status, "Remote invite unavailable");
			return Err(InviteError::UpstreamRelay {
				status: response.status,
				body: response.body,
			});
		}
		let invited: InvitedClinician = response
			.json()
			.map_err(|e| InviteError::FindingClinicFailed(e.to_string()))?;

		let snapshot = ClinicianInvite {
			clinic_id: clinic_id.clone(),
			clinic_name: clinic.name,
		};
		let filter = ConfirmationFilter::pending_clinician_invites().key(invite_id.clone());
		let mut confirmation = match self.find_first(&filter).await? {
			Some(existing) if existing.clinic_id() != Some(clinic_id) => {
				warn!(
					owner = ?existing.clinic_id(),
					"Invite key belongs to another clinic, refusing resend"
				);
				return Err(InviteError::Unauthorized);
			}
			Some(mut existing) => {
				if existing.email != invited.email {
					warn!("Remote invite email differs from local record, adopting remote");
					existing.email = invited.email;
				}
				existing.refresh_clinic_name(snapshot.clinic_name);
				existing
			}
			None => {
				info!("No local record for remote invite, recreating");
				Confirmation::clinician_invite_with_key(
					invite_id.clone(),
					caller.user_id().clone(),
					invited.email,
					snapshot,
				)
			}
		};
		let email = confirmation.email.clone();
		confirmation.attach_user(self.existing_user_id(&email).await);

		self.save_and_notify(&mut confirmation).await?;
		Ok(confirmation)
	}

	/// Pending invites addressed to the caller's primary email, oldest first.
	///
	/// Records created before the recipient had an account are stamped with
	/// the caller's id so accept and dismiss can find them.
	#[instrument(skip(self, caller), fields(user_id = %user_id))]
	pub async fn list(
		&self,
		caller: &CallerToken,
		user_id: &UserId,
	) -> Result<Vec<Confirmation>, InviteError> {
		if !caller.is_user(user_id) {
			warn!("Caller may only list their own invitations");
			return Err(InviteError::Unauthorized);
		}

		let account = self
			.identity
			.resolve_user(user_id.as_str(), caller.session_token())
			.await
			.map_err(|e| {
				error!(error = %e, "Failed to resolve caller account");
				InviteError::LookupFailed(e.to_string())
			})?
			.ok_or(InviteError::Unauthorized)?;
		let email = account.primary_email().ok_or(InviteError::Unauthorized)?;

		let filter = ConfirmationFilter::pending_clinician_invites().email(email);
		let mut invites = self.find(&filter).await?;
		for invite in invites.iter_mut().filter(|c| c.user_id.is_none()) {
			invite.attach_user(Some(user_id.clone()));
			if let Err(e) = self.store.save(invite).await {
				warn!(error = %e, invite_key = %invite.key, "Failed to stamp user id on invite");
			}
		}

		info!(
			metric = "get_clinician_invitations",
			count = invites.len(),
			"Listed clinician invitations"
		);
		Ok(invites)
	}

	/// Join the clinic named by the invite as the caller.
	#[instrument(skip(self, caller), fields(user_id = %user_id, invite_key = %invite_id))]
	pub async fn accept(
		&self,
		caller: &CallerToken,
		user_id: &UserId,
		invite_id: &ConfirmationKey,
	) -> Result<Confirmation, InviteError> {
		let mut confirmation = self.find_for_recipient(caller, user_id, invite_id).await?;
		self
			.guard
			.assert_recipient_authorized(caller, &confirmation)
			.await?;
		let clinic_id = confirmation
			.clinic_id()
			.cloned()
			.ok_or(InviteError::NotFound)?;

		let association = AssociateClinician {
			user_id: caller.user_id().clone(),
		};
		let response = self
			.clinic
			.associate_clinician_to_user(&clinic_id, invite_id, &association)
			.await
			.map_err(|e| {
				error!(error = %e, "Failed to associate clinician");
				InviteError::Transport(e.to_string())
			})?;
		if !response.is_ok() {
			error!(status = %response.status, "Clinic service refused association");
			return Err(InviteError::Transport(format!(
				"clinic service returned {} for association",
				response.status
			)));
		}

		confirmation.attach_user(Some(caller.user_id().clone()));
		confirmation
			.transition(ConfirmationStatus::Completed)
			.map_err(|e| InviteError::Persistence(e.to_string()))?;
		self.persist(&confirmation).await?;

		info!(metric = "accept_clinician_invite", "Clinician invite accepted");
		Ok(confirmation)
	}

	/// Recipient declines the invite.
	#[instrument(skip(self, caller), fields(user_id = %user_id, invite_key = %invite_id))]
	pub async fn dismiss(
		&self,
		caller: &CallerToken,
		user_id: &UserId,
		invite_id: &ConfirmationKey,
	) -> Result<Confirmation, InviteError> {
		let confirmation = self.find_for_recipient(caller, user_id, invite_id).await?;
		self
			.guard
			.assert_recipient_authorized(caller, &confirmation)
			.await?;

		self
			.cancel_with_status(
				confirmation,
				ConfirmationStatus::Declined,
				"dismiss_clinician_invite",
			)
			.await
	}

	/// Clinic admin revokes the invite.
	#[instrument(skip(self, caller), fields(clinic_id = %clinic_id, invite_key = %invite_id, user_id = %caller.user_id()))]
	pub async fn cancel(
		&self,
		caller: &CallerToken,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<Confirmation, InviteError> {
		self.guard.assert_clinic_admin(clinic_id, caller).await?;

		let filter = ConfirmationFilter::pending_clinician_invites()
			.key(invite_id.clone())
			.clinic_id(clinic_id.clone());
		let confirmation = self
			.find_first(&filter)
			.await?
			.ok_or(InviteError::NotFound)?;

		self
			.cancel_with_status(
				confirmation,
				ConfirmationStatus::Canceled,
				"cancel_clinician_invite",
			)
			.await
	}

	/// Delete the remote invite, then settle the local record as `status`.
	///
	/// A remote 404 counts as already deleted.
	async fn cancel_with_status(
		&self,
		mut confirmation: Confirmation,
		status: ConfirmationStatus,
		metric: &'static str,
	) -> Result<Confirmation, InviteError> {
		let clinic_id = confirmation
			.clinic_id()
			.cloned()
			.ok_or(InviteError::NotFound)?;

		let response = self
			.clinic
			.delete_invited_clinician(&clinic_id, &confirmation.key)
			.await
			.map_err(|e| {
				error!(error = %e, invite_key = %confirmation.key, "Failed to delete remote invite");
				InviteError::Transport(e.to_string())
			})?;
		if !response.is_ok() && !response.is_not_found() {
			error!(
				status = %response.status,
				invite_key = %confirmation.key,
				"Clinic service refused invite deletion"
			);
			return Err(InviteError::Transport(format!(
				"clinic service returned {} for deletion",
				response.status
			)));
		}
		if response.is_not_found() {
			debug!(invite_key = %confirmation.key, "Remote invite already gone");
		}

		confirmation
			.transition(status)
			.map_err(|e| InviteError::Persistence(e.to_string()))?;
		self.persist(&confirmation).await?;

		info!(metric = metric, invite_key = %confirmation.key, status = %status, "Clinician invite settled");
		Ok(confirmation)
	}

	/// Persist, then augment with the creator profile and notify.
	///
	/// Only the save can fail the operation.
	async fn save_and_notify(&self, confirmation: &mut Confirmation) -> Result<(), InviteError> {
		self.persist(confirmation).await?;
		info!(
			metric = "clinician_invite_created",
			invite_key = %confirmation.key,
			"Clinician invite saved"
		);

		match self.profiles.get_profile(&confirmation.creator_id).await {
			Ok(profile) => confirmation.creator.full_name = profile.full_name,
			Err(e) => {
				warn!(error = %e, invite_key = %confirmation.key, "Failed to fetch creator profile, notification skipped");
				return Ok(());
			}
		}

		let Some(content) = NotificationContent::for_clinician_invite(confirmation) else {
			warn!(invite_key = %confirmation.key, "Confirmation has no clinic, notification skipped");
			return Ok(());
		};
		match self.notifier.send(confirmation, &content).await {
			Ok(()) => info!(
				metric = "clinician_invite_sent",
				invite_key = %confirmation.key,
				"Clinician invite notification sent"
			),
			Err(e) => warn!(error = %e, invite_key = %confirmation.key, "Failed to send clinician invite notification"),
		}
		Ok(())
	}

	/// Pending invite `invite_id` that is unclaimed or already claimed by the caller.
	async fn find_for_recipient(
		&self,
		caller: &CallerToken,
		user_id: &UserId,
		invite_id: &ConfirmationKey,
	) -> Result<Confirmation, InviteError> {
		if !caller.is_user(user_id) {
			warn!("Path user id does not match caller");
			return Err(InviteError::Unauthorized);
		}

		let filter = ConfirmationFilter::pending_clinician_invites().key(invite_id.clone());
		self
			.find(&filter)
			.await?
			.into_iter()
			.find(|c| c.user_id.as_ref().map_or(true, |id| id == caller.user_id()))
			.ok_or(InviteError::NotFound)
	}

	async fn fetch_clinic(&self, clinic_id: &ClinicId) -> Result<Clinic, InviteError> {
		let response = self.clinic.get_clinic(clinic_id).await.map_err(|e| {
			error!(error = %e, clinic_id = %clinic_id, "Failed to fetch clinic");
			InviteError::FindingClinicFailed(e.to_string())
		})?;
		if !response.is_ok() {
			warn!(status = %response.status, clinic_id = %clinic_id, "Clinic lookup failed");
			return Err(InviteError::FindingClinicFailed(format!(
				"clinic service returned {}",
				response.status
			)));
		}
		response
			.json()
			.map_err(|e| InviteError::FindingClinicFailed(e.to_string()))
	}

	/// Account id for `email`, looked up as Roster. Failures mean "no account".
	async fn existing_user_id(&self, email: &str) -> Option<UserId> {
		let token = match self.server_token.server_token().await {
			Ok(token) => token,
			Err(e) => {
				warn!(error = %e, "No server token for account lookup");
				return None;
			}
		};
		match self.identity.resolve_user(email, &token).await {
			Ok(account) => account.map(|a| a.id),
			Err(e) => {
				warn!(error = %e, "Account lookup failed");
				None
			}
		}
	}

	async fn find(&self, filter: &ConfirmationFilter) -> Result<Vec<Confirmation>, InviteError> {
		self.store.find(filter).await.map_err(|e| {
			error!(error = %e, "Confirmation query failed");
			InviteError::Transport(e.to_string())
		})
	}

	async fn find_first(
		&self,
		filter: &ConfirmationFilter,
	) -> Result<Option<Confirmation>, InviteError> {
		Ok(self.find(filter).await?.into_iter().next())
	}

	async fn persist(&self, confirmation: &Confirmation) -> Result<(), InviteError> {
		self.store.save(confirmation).await.map_err(|e| {
			error!(error = %e, invite_key = %confirmation.key, "Failed to save confirmation");
			InviteError::Persistence(e.to_string())
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{InviteFixture, ADMIN_NAME, CLINIC_ID, CLINIC_NAME};
	use http::StatusCode;
	use proptest::prelude::*;
	use roster_server_clinic::RemoteResponse;

	fn invite(email: &str) -> Result<SendInvite, InviteError> {
		Ok(SendInvite {
			email: email.to_string(),
			roles: vec!["CLINIC_STAFF".to_string()],
		})
	}

	async fn send(fixture: &InviteFixture, email: &str) -> Confirmation {
		fixture
			.service()
			.send(&InviteFixture::admin(), &InviteFixture::clinic_id(), invite(email))
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn send_creates_remote_and_local_invite() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "new@clinic.org").await;

		assert_eq!(conf.status, ConfirmationStatus::Pending);
		assert_eq!(conf.email, "new@clinic.org");
		assert_eq!(conf.clinic_id(), Some(&InviteFixture::clinic_id()));
		assert_eq!(conf.clinic().unwrap().clinic_name, CLINIC_NAME);
		assert_eq!(conf.creator.full_name.as_deref(), Some(ADMIN_NAME));
		assert!(conf.user_id.is_none());

		let remote = fixture
			.clinic
			.invite(&InviteFixture::clinic_id(), &conf.key)
			.unwrap();
		assert_eq!(remote.email, "new@clinic.org");
		assert_eq!(fixture.store.get(&conf.key).unwrap().key, conf.key);

		let sent = fixture.notifier.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].0, conf.key);
		assert_eq!(sent[0].1.creator_name, ADMIN_NAME);
		assert_eq!(sent[0].1.web_path, "signup");
	}

	#[tokio::test]
	async fn send_to_existing_account_links_user() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "known@clinic.org");

		let conf = send(&fixture, "known@clinic.org").await;
		assert_eq!(conf.user_id, Some(UserId::from("u1")));
		assert_eq!(fixture.notifier.sent()[0].1.web_path, "login");
	}

	#[tokio::test]
	async fn send_relays_remote_rejection_without_local_record() {
		let fixture = InviteFixture::new();
		fixture.clinic.respond_to_create(RemoteResponse::new(
			StatusCode::CONFLICT,
			r#"{"code":409,"message":"already invited"}"#,
		));

		let result = fixture
			.service()
			.send(&InviteFixture::admin(), &InviteFixture::clinic_id(), invite("a@x.com"))
			.await;
		match result {
			Err(InviteError::UpstreamRelay { status, body }) => {
				assert_eq!(status, StatusCode::CONFLICT);
				assert!(body.contains("already invited"));
			}
			other => panic!("expected relay, got {other:?}"),
		}
		assert!(fixture.store.is_empty());
		assert!(fixture.notifier.sent().is_empty());
	}

	#[tokio::test]
	async fn send_to_unknown_clinic_fails_before_remote_create() {
		let fixture = InviteFixture::new();
		let result = fixture
			.service()
			.send(&InviteFixture::server(), &ClinicId::from("nope"), invite("a@x.com"))
			.await;
		assert!(matches!(result, Err(InviteError::FindingClinicFailed(_))));
		assert!(fixture.clinic.mutations().is_empty());
	}

	#[tokio::test]
	async fn send_requires_an_email() {
		let fixture = InviteFixture::new();
		let result = fixture
			.service()
			.send(&InviteFixture::admin(), &InviteFixture::clinic_id(), invite("  "))
			.await;
		assert!(matches!(result, Err(InviteError::BadRequest(_))));
	}

	#[tokio::test]
	async fn notification_failures_do_not_fail_send() {
		let fixture = InviteFixture::new();
		fixture.notifier.set_failing(true);
		let conf = send(&fixture, "a@x.com").await;
		assert!(fixture.store.get(&conf.key).is_some());

		let fixture = InviteFixture::new();
		fixture.clinic.add_clinician(CLINIC_ID, "nameless", &["CLINIC_ADMIN"]);
		let conf = fixture
			.service()
			.send(&InviteFixture::user("nameless"), &InviteFixture::clinic_id(), invite("b@x.com"))
			.await
			.unwrap();
		assert!(fixture.store.get(&conf.key).is_some());
		assert!(fixture.notifier.sent().is_empty());
	}

	#[tokio::test]
	async fn save_failure_after_remote_create_is_persistence_error() {
		let fixture = InviteFixture::new();
		fixture.store.set_failing_saves(true);

		let result = fixture
			.service()
			.send(&InviteFixture::admin(), &InviteFixture::clinic_id(), invite("a@x.com"))
			.await;
		assert!(matches!(result, Err(InviteError::Persistence(_))));
		assert_eq!(fixture.clinic.invite_count(), 1);
	}

	#[tokio::test]
	async fn send_then_list_returns_the_invite() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		let conf = send(&fixture, "a@x.com").await;

		let listed = fixture
			.service()
			.list(&InviteFixture::user("u1"), &UserId::from("u1"))
			.await
			.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].key, conf.key);
		assert_eq!(listed[0].email, "a@x.com");
		assert_eq!(listed[0].clinic_id(), Some(&InviteFixture::clinic_id()));
		assert_eq!(listed[0].status, ConfirmationStatus::Pending);
	}

	#[tokio::test]
	async fn list_stamps_missing_user_id() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "late@x.com").await;
		assert!(conf.user_id.is_none());

		fixture.identity.add_account("late", "late@x.com");
		let listed = fixture
			.service()
			.list(&InviteFixture::user("late"), &UserId::from("late"))
			.await
			.unwrap();
		assert_eq!(listed[0].user_id, Some(UserId::from("late")));
		assert_eq!(
			fixture.store.get(&conf.key).unwrap().user_id,
			Some(UserId::from("late"))
		);
	}

	#[tokio::test]
	async fn list_rejects_other_users_and_servers() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		fixture.identity.add_account("u2", "b@x.com");
		let service = fixture.service();

		let result = service
			.list(&InviteFixture::user("u2"), &UserId::from("u1"))
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));

		let result = service
			.list(&InviteFixture::server(), &UserId::from("svc"))
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));

		let result = service
			.list(&InviteFixture::user("ghost"), &UserId::from("ghost"))
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));
	}

	#[tokio::test]
	async fn accept_completes_once() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "new@clinic.org").await;
		fixture.identity.add_account("u-new", "new@clinic.org");
		let service = fixture.service();
		let recipient = InviteFixture::user("u-new");

		let accepted = service
			.accept(&recipient, &UserId::from("u-new"), &conf.key)
			.await
			.unwrap();
		assert_eq!(accepted.status, ConfirmationStatus::Completed);
		assert_eq!(accepted.user_id, Some(UserId::from("u-new")));
		assert!(accepted.modified_at.is_some());
		assert_eq!(
			fixture.clinic.associations(),
			vec![(InviteFixture::clinic_id(), conf.key.clone(), UserId::from("u-new"))]
		);
		assert_eq!(
			fixture.store.get(&conf.key).unwrap().status,
			ConfirmationStatus::Completed
		);

		let again = service
			.accept(&recipient, &UserId::from("u-new"), &conf.key)
			.await;
		assert!(matches!(again, Err(InviteError::NotFound)));
	}

	#[tokio::test]
	async fn accept_by_someone_else_is_unauthorized() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "new@clinic.org").await;
		fixture.identity.add_account("intruder", "intruder@x.com");

		let result = fixture
			.service()
			.accept(&InviteFixture::user("intruder"), &UserId::from("intruder"), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));
		assert!(fixture.clinic.associations().is_empty());
	}

	#[tokio::test]
	async fn accept_with_spoofed_path_user_is_unauthorized() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		fixture.identity.add_account("u2", "b@x.com");
		let conf = send(&fixture, "a@x.com").await;

		let result = fixture
			.service()
			.accept(&InviteFixture::user("u2"), &UserId::from("u1"), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));
	}

	#[tokio::test]
	async fn failed_association_leaves_invite_pending() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		let conf = send(&fixture, "a@x.com").await;
		fixture.clinic.respond_to_associate(RemoteResponse::new(
			StatusCode::BAD_GATEWAY,
			"upstream",
		));

		let result = fixture
			.service()
			.accept(&InviteFixture::user("u1"), &UserId::from("u1"), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::Transport(_))));
		assert!(fixture.store.get(&conf.key).unwrap().is_pending());
	}

	#[tokio::test]
	async fn dismiss_declines_and_deletes_remote() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		let conf = send(&fixture, "a@x.com").await;

		let dismissed = fixture
			.service()
			.dismiss(&InviteFixture::user("u1"), &UserId::from("u1"), &conf.key)
			.await
			.unwrap();
		assert_eq!(dismissed.status, ConfirmationStatus::Declined);
		assert!(fixture
			.clinic
			.invite(&InviteFixture::clinic_id(), &conf.key)
			.is_none());
	}

	#[tokio::test]
	async fn cancel_tolerates_missing_remote_invite() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "a@x.com").await;
		fixture.clinic.respond_to_delete(RemoteResponse::new(StatusCode::NOT_FOUND, ""));

		let canceled = fixture
			.service()
			.cancel(&InviteFixture::admin(), &InviteFixture::clinic_id(), &conf.key)
			.await
			.unwrap();
		assert_eq!(canceled.status, ConfirmationStatus::Canceled);
		assert_eq!(
			fixture.store.get(&conf.key).unwrap().status,
			ConfirmationStatus::Canceled
		);
	}

	#[tokio::test]
	async fn cancel_on_remote_failure_leaves_local_state() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "a@x.com").await;
		fixture.clinic.respond_to_delete(RemoteResponse::new(
			StatusCode::INTERNAL_SERVER_ERROR,
			"boom",
		));

		let result = fixture
			.service()
			.cancel(&InviteFixture::admin(), &InviteFixture::clinic_id(), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::Transport(_))));
		assert!(fixture.store.get(&conf.key).unwrap().is_pending());
	}

	#[tokio::test]
	async fn settled_invites_cannot_be_canceled_or_dismissed() {
		let fixture = InviteFixture::new();
		fixture.identity.add_account("u1", "a@x.com");
		let conf = send(&fixture, "a@x.com").await;
		let service = fixture.service();

		service
			.cancel(&InviteFixture::admin(), &InviteFixture::clinic_id(), &conf.key)
			.await
			.unwrap();

		let again = service
			.cancel(&InviteFixture::admin(), &InviteFixture::clinic_id(), &conf.key)
			.await;
		assert!(matches!(again, Err(InviteError::NotFound)));

		let dismissed = service
			.dismiss(&InviteFixture::user("u1"), &UserId::from("u1"), &conf.key)
			.await;
		assert!(matches!(dismissed, Err(InviteError::NotFound)));
		assert_eq!(
			fixture.store.get(&conf.key).unwrap().status,
			ConfirmationStatus::Canceled
		);
	}

	#[tokio::test]
	async fn cancel_is_scoped_to_clinic() {
		let fixture = InviteFixture::new();
		fixture.clinic.add_clinic("c2", "Clinic Two");
		let conf = send(&fixture, "a@x.com").await;

		let result = fixture
			.service()
			.cancel(&InviteFixture::server(), &ClinicId::from("c2"), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::NotFound)));
	}

	#[tokio::test]
	async fn resend_recreates_missing_local_record() {
		let fixture = InviteFixture::new();
		fixture.clinic.add_invite(CLINIC_ID, "inv-1", "a@x.com");

		let conf = fixture
			.service()
			.resend(
				&InviteFixture::admin(),
				&InviteFixture::clinic_id(),
				&ConfirmationKey::from("inv-1"),
			)
			.await
			.unwrap();
		assert_eq!(conf.key, ConfirmationKey::from("inv-1"));
		assert_eq!(conf.email, "a@x.com");
		assert_eq!(conf.status, ConfirmationStatus::Pending);
		assert_eq!(conf.creator_id, UserId::from("admin"));
		assert!(fixture.store.get(&conf.key).is_some());
		assert_eq!(fixture.notifier.sent().len(), 1);
		assert!(!fixture.clinic.mutations().contains(&"create"));
	}

	#[tokio::test]
	async fn resend_refreshes_existing_record() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "a@x.com").await;
		fixture.clinic.add_clinic(CLINIC_ID, "Clinic Renamed");
		fixture.identity.add_account("u1", "a@x.com");

		let resent = fixture
			.service()
			.resend(&InviteFixture::admin(), &InviteFixture::clinic_id(), &conf.key)
			.await
			.unwrap();
		assert_eq!(resent.key, conf.key);
		assert_eq!(resent.created_at, conf.created_at);
		assert_eq!(resent.clinic().unwrap().clinic_name, "Clinic Renamed");
		assert_eq!(resent.user_id, Some(UserId::from("u1")));
		assert_eq!(fixture.store.len(), 1);
		assert_eq!(fixture.notifier.sent().len(), 2);
	}

	#[tokio::test]
	async fn resend_never_moves_invite_between_clinics() {
		let fixture = InviteFixture::new();
		let conf = send(&fixture, "a@x.com").await;
		fixture.clinic.add_clinic("c2", "Other Clinic");
		fixture.clinic.add_invite("c2", conf.key.as_str(), "a@x.com");

		let result = fixture
			.service()
			.resend(&InviteFixture::server(), &ClinicId::from("c2"), &conf.key)
			.await;
		assert!(matches!(result, Err(InviteError::Unauthorized)));
		let stored = fixture.store.get(&conf.key).unwrap();
		assert_eq!(stored.clinic_id(), Some(&InviteFixture::clinic_id()));
		assert_eq!(stored.clinic().unwrap().clinic_name, CLINIC_NAME);
		assert_eq!(fixture.notifier.sent().len(), 1);
	}

	#[tokio::test]
	async fn resend_relays_missing_remote_invite() {
		let fixture = InviteFixture::new();
		let result = fixture
			.service()
			.resend(
				&InviteFixture::admin(),
				&InviteFixture::clinic_id(),
				&ConfirmationKey::from("gone"),
			)
			.await;
		assert!(matches!(
			result,
			Err(InviteError::UpstreamRelay { status: StatusCode::NOT_FOUND, .. })
		));
		assert!(fixture.store.is_empty());
	}

	#[tokio::test]
	async fn admin_operations_surface_lookup_failures() {
		let fixture = InviteFixture::new();
		fixture.clinic.set_unreachable(true);
		let result = fixture
			.service()
			.send(&InviteFixture::admin(), &InviteFixture::clinic_id(), invite("a@x.com"))
			.await;
		assert!(matches!(result, Err(InviteError::LookupFailed(_))));
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(32))]

		#[test]
		fn non_admins_change_nothing(
			clinic in "[a-z0-9]{1,8}",
			caller in "[a-z]{1,8}",
			op in 0usize..5,
		) {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
			runtime.block_on(async {
				let fixture = InviteFixture::new();
				fixture.clinic.add_clinic(&clinic, "Some Clinic");
				fixture.clinic.add_clinician(&clinic, &caller, &["CLINIC_MEMBER"]);
				fixture.clinic.add_invite(&clinic, "inv-1", "a@x.com");
				let service = fixture.service();
				let token = InviteFixture::user(&caller);
				let clinic_id = ClinicId::from(clinic.as_str());
				let key = ConfirmationKey::from("inv-1");

				let result = match op {
					0 => service.send(&token, &clinic_id, invite("b@x.com")).await,
					1 => service.cancel(&token, &clinic_id, &key).await,
					2 => service.resend(&token, &clinic_id, &key).await,
					3 => service.send(&token, &clinic_id, invite("   ")).await,
					_ => {
						let undecodable = Err(InviteError::BadRequest("expected value".to_string()));
						service.send(&token, &clinic_id, undecodable).await
					}
				};
				prop_assert!(matches!(result, Err(InviteError::Unauthorized)));
				prop_assert!(fixture.store.is_empty());
				prop_assert!(fixture.clinic.mutations().is_empty());
				prop_assert_eq!(fixture.clinic.invite_count(), 1);
				Ok(())
			})?;
		}
	}
}
