// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators for exercising [`InviteService`] without a
//! database, clinic service, identity service or SMTP server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;
use roster_common_secret::SecretString;
use roster_confirmation_core::{
	ClinicId, Confirmation, ConfirmationFilter, ConfirmationKey, UserId,
};
use roster_server_auth::{CallerToken, StaticServerToken};
use roster_server_clinic::{
	AssociateClinician, Clinic, ClinicError, ClinicService, Clinician, CreateClinicianInvite,
	InvitedClinician, RemoteResponse,
};
use roster_server_db::{ConfirmationStore, DbError};
use roster_server_email::{EmailError, NotificationContent, NotificationSender};
use roster_server_identity::{Account, IdentityError, IdentityLookup, Profile, ProfileLookup, TokenData};

use crate::orchestrator::InviteService;

pub const ADMIN_ROLE: &str = "CLINIC_ADMIN";
pub const CLINIC_ID: &str = "c1";
pub const CLINIC_NAME: &str = "Clinic One";
pub const ADMIN_ID: &str = "admin";
pub const ADMIN_NAME: &str = "Dr Admin";
pub const SERVER_ID: &str = "svc";

/// Session token the fakes associate with `user_id`.
pub fn session_for(user_id: &str) -> String {
	format!("{user_id}-session")
}

fn not_found() -> RemoteResponse {
	RemoteResponse::new(StatusCode::NOT_FOUND, r#"{"code":404,"message":"not found"}"#)
}

// =============================================================================
// Confirmation store
// =============================================================================

/// Keyed by confirmation key, with the same upsert rules as the SQLite store.
#[derive(Default)]
pub struct InMemoryConfirmationStore {
	records: Mutex<HashMap<ConfirmationKey, Confirmation>>,
	fail_saves: AtomicBool,
}

impl InMemoryConfirmationStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed a record directly, bypassing the upsert rules.
	pub fn insert(&self, confirmation: Confirmation) {
		self
			.records
			.lock()
			.unwrap()
			.insert(confirmation.key.clone(), confirmation);
	}

	pub fn get(&self, key: &ConfirmationKey) -> Option<Confirmation> {
		self.records.lock().unwrap().get(key).cloned()
	}

	pub fn len(&self) -> usize {
		self.records.lock().unwrap().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn set_failing_saves(&self, fail: bool) {
		self.fail_saves.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl ConfirmationStore for InMemoryConfirmationStore {
	async fn find(&self, filter: &ConfirmationFilter) -> Result<Vec<Confirmation>, DbError> {
		let mut found: Vec<Confirmation> = self
			.records
			.lock()
			.unwrap()
			.values()
			.filter(|c| filter.matches(c))
			.cloned()
			.collect();
		found.sort_by(|a, b| {
			a.created_at
				.cmp(&b.created_at)
				.then_with(|| a.key.as_str().cmp(b.key.as_str()))
		});
		Ok(found)
	}

	async fn save(&self, confirmation: &Confirmation) -> Result<(), DbError> {
		if self.fail_saves.load(Ordering::SeqCst) {
			return Err(DbError::Internal("store unavailable".to_string()));
		}

		let mut records = self.records.lock().unwrap();
		let mut next = confirmation.clone();
		if let Some(existing) = records.get(&confirmation.key) {
			if !existing.is_pending()
				|| existing.confirmation_type() != confirmation.confirmation_type()
				|| existing.clinic_id() != confirmation.clinic_id()
			{
				return Err(DbError::Conflict(format!(
					"confirmation {} is settled or belongs to another clinic",
					confirmation.key
				)));
			}
			if next.user_id.is_none() {
				next.user_id = existing.user_id.clone();
			}
			next.created_at = existing.created_at;
		}
		records.insert(next.key.clone(), next);
		Ok(())
	}

	async fn ping(&self) -> Result<(), DbError> {
		Ok(())
	}
}

// =============================================================================
// Clinic service
// =============================================================================

#[derive(Default)]
struct Overrides {
	get_clinician: Option<RemoteResponse>,
	create: Option<RemoteResponse>,
	delete: Option<RemoteResponse>,
	associate: Option<RemoteResponse>,
}

/// Clinic service backed by maps. Every call counts as a remote call, even
/// when it fails.
#[derive(Default)]
pub struct FakeClinicService {
	clinics: Mutex<HashMap<ClinicId, Clinic>>,
	clinicians: Mutex<HashMap<(ClinicId, UserId), Clinician>>,
	invites: Mutex<HashMap<(ClinicId, ConfirmationKey), InvitedClinician>>,
	associations: Mutex<Vec<(ClinicId, ConfirmationKey, UserId)>>,
	mutations: Mutex<Vec<&'static str>>,
	overrides: Mutex<Overrides>,
	unreachable: AtomicBool,
}

impl FakeClinicService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_clinic(&self, id: &str, name: &str) {
		self.clinics.lock().unwrap().insert(
			ClinicId::from(id),
			Clinic {
				id: ClinicId::from(id),
				name: name.to_string(),
			},
		);
	}

	pub fn add_clinician(&self, clinic_id: &str, user_id: &str, roles: &[&str]) {
		self.clinicians.lock().unwrap().insert(
			(ClinicId::from(clinic_id), UserId::from(user_id)),
			Clinician {
				roles: roles.iter().map(|r| r.to_string()).collect(),
			},
		);
	}

	/// Register a pending invite the way a previous create would have.
	pub fn add_invite(&self, clinic_id: &str, invite_id: &str, email: &str) {
		self.invites.lock().unwrap().insert(
			(ClinicId::from(clinic_id), ConfirmationKey::from(invite_id)),
			InvitedClinician {
				email: email.to_string(),
			},
		);
	}

	pub fn invite(&self, clinic_id: &ClinicId, invite_id: &ConfirmationKey) -> Option<InvitedClinician> {
		self
			.invites
			.lock()
			.unwrap()
			.get(&(clinic_id.clone(), invite_id.clone()))
			.cloned()
	}

	pub fn invite_count(&self) -> usize {
		self.invites.lock().unwrap().len()
	}

	pub fn associations(&self) -> Vec<(ClinicId, ConfirmationKey, UserId)> {
		self.associations.lock().unwrap().clone()
	}

	/// Names of the mutating calls received, in order.
	pub fn mutations(&self) -> Vec<&'static str> {
		self.mutations.lock().unwrap().clone()
	}

	pub fn respond_to_get_clinician(&self, response: RemoteResponse) {
		self.overrides.lock().unwrap().get_clinician = Some(response);
	}

	pub fn respond_to_create(&self, response: RemoteResponse) {
		self.overrides.lock().unwrap().create = Some(response);
	}

	pub fn respond_to_delete(&self, response: RemoteResponse) {
		self.overrides.lock().unwrap().delete = Some(response);
	}

	pub fn respond_to_associate(&self, response: RemoteResponse) {
		self.overrides.lock().unwrap().associate = Some(response);
	}

	/// Make every call fail as if the service timed out.
	pub fn set_unreachable(&self, unreachable: bool) {
		self.unreachable.store(unreachable, Ordering::SeqCst);
	}

	fn check_reachable(&self) -> Result<(), ClinicError> {
		if self.unreachable.load(Ordering::SeqCst) {
			return Err(ClinicError::Timeout);
		}
		Ok(())
	}

	fn record(&self, call: &'static str) {
		self.mutations.lock().unwrap().push(call);
	}
}

#[async_trait]
impl ClinicService for FakeClinicService {
	async fn get_clinic(&self, clinic_id: &ClinicId) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		Ok(self
			.clinics
			.lock()
			.unwrap()
			.get(clinic_id)
			.map(RemoteResponse::ok_json)
			.unwrap_or_else(not_found))
	}

	async fn get_clinician(
		&self,
		clinic_id: &ClinicId,
		user_id: &UserId,
	) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		if let Some(response) = self.overrides.lock().unwrap().get_clinician.clone() {
			return Ok(response);
		}
		Ok(self
			.clinicians
			.lock()
			.unwrap()
			.get(&(clinic_id.clone(), user_id.clone()))
			.map(RemoteResponse::ok_json)
			.unwrap_or_else(not_found))
	}

	async fn create_clinician_invite(
		&self,
		clinic_id: &ClinicId,
		invite: &CreateClinicianInvite,
	) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		self.record("create");
		if let Some(response) = self.overrides.lock().unwrap().create.clone() {
			return Ok(response);
		}
		let invited = InvitedClinician {
			email: invite.email.clone(),
		};
		let response = RemoteResponse::ok_json(&invited);
		self
			.invites
			.lock()
			.unwrap()
			.insert((clinic_id.clone(), invite.invite_id.clone()), invited);
		Ok(response)
	}

	async fn get_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		Ok(self
			.invite(clinic_id, invite_id)
			.map(|invited| RemoteResponse::ok_json(&invited))
			.unwrap_or_else(not_found))
	}

	async fn delete_invited_clinician(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
	) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		self.record("delete");
		if let Some(response) = self.overrides.lock().unwrap().delete.clone() {
			return Ok(response);
		}
		let removed = self
			.invites
			.lock()
			.unwrap()
			.remove(&(clinic_id.clone(), invite_id.clone()));
		Ok(match removed {
			Some(_) => RemoteResponse::new(StatusCode::OK, ""),
			None => not_found(),
		})
	}

	async fn associate_clinician_to_user(
		&self,
		clinic_id: &ClinicId,
		invite_id: &ConfirmationKey,
		association: &AssociateClinician,
	) -> Result<RemoteResponse, ClinicError> {
		self.check_reachable()?;
		self.record("associate");
		if let Some(response) = self.overrides.lock().unwrap().associate.clone() {
			return Ok(response);
		}
		let removed = self
			.invites
			.lock()
			.unwrap()
			.remove(&(clinic_id.clone(), invite_id.clone()));
		if removed.is_none() {
			return Ok(not_found());
		}
		self.associations.lock().unwrap().push((
			clinic_id.clone(),
			invite_id.clone(),
			association.user_id.clone(),
		));
		Ok(RemoteResponse::new(StatusCode::OK, "{}"))
	}
}

// =============================================================================
// Identity service
// =============================================================================

/// Accounts are reachable by id and by primary email.
#[derive(Default)]
pub struct FakeIdentity {
	accounts: Mutex<HashMap<String, Account>>,
	sessions: Mutex<HashMap<String, TokenData>>,
	failing: AtomicBool,
}

impl FakeIdentity {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an account and a session token for it (see [`session_for`]).
	pub fn add_account(&self, user_id: &str, email: &str) {
		let account = Account {
			id: UserId::from(user_id),
			emails: vec![email.to_string()],
		};
		let mut accounts = self.accounts.lock().unwrap();
		accounts.insert(user_id.to_string(), account.clone());
		accounts.insert(email.to_string(), account);
		drop(accounts);
		self.add_session(&session_for(user_id), user_id, false);
	}

	pub fn add_session(&self, token: &str, user_id: &str, is_server: bool) {
		self.sessions.lock().unwrap().insert(
			token.to_string(),
			TokenData {
				user_id: UserId::from(user_id),
				is_server,
			},
		);
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	fn check_available(&self) -> Result<(), IdentityError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(IdentityError::ApiError {
				status: 503,
				message: "identity service unavailable".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl IdentityLookup for FakeIdentity {
	async fn resolve_user(
		&self,
		email_or_id: &str,
		_credential: &SecretString,
	) -> Result<Option<Account>, IdentityError> {
		self.check_available()?;
		Ok(self.accounts.lock().unwrap().get(email_or_id).cloned())
	}

	async fn check_token(&self, token: &SecretString) -> Result<Option<TokenData>, IdentityError> {
		self.check_available()?;
		Ok(self.sessions.lock().unwrap().get(token.expose()).cloned())
	}
}

#[derive(Default)]
pub struct FakeProfiles {
	profiles: Mutex<HashMap<UserId, Profile>>,
}

impl FakeProfiles {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_full_name(&self, user_id: &str, full_name: &str) {
		self.profiles.lock().unwrap().insert(
			UserId::from(user_id),
			Profile {
				full_name: Some(full_name.to_string()),
			},
		);
	}
}

#[async_trait]
impl ProfileLookup for FakeProfiles {
	async fn get_profile(&self, user_id: &UserId) -> Result<Profile, IdentityError> {
		self
			.profiles
			.lock()
			.unwrap()
			.get(user_id)
			.cloned()
			.ok_or_else(|| IdentityError::ApiError {
				status: 404,
				message: format!("no profile for {user_id}"),
			})
	}
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
	sent: Mutex<Vec<(ConfirmationKey, NotificationContent)>>,
	failing: AtomicBool,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sent(&self) -> Vec<(ConfirmationKey, NotificationContent)> {
		self.sent.lock().unwrap().clone()
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
	async fn send(
		&self,
		confirmation: &Confirmation,
		content: &NotificationContent,
	) -> Result<(), EmailError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(EmailError::NotConfigured);
		}
		self
			.sent
			.lock()
			.unwrap()
			.push((confirmation.key.clone(), content.clone()));
		Ok(())
	}
}

// =============================================================================
// Fixture
// =============================================================================

/// A full set of fakes seeded with clinic `c1` and its admin.
pub struct InviteFixture {
	pub store: Arc<InMemoryConfirmationStore>,
	pub clinic: Arc<FakeClinicService>,
	pub identity: Arc<FakeIdentity>,
	pub profiles: Arc<FakeProfiles>,
	pub notifier: Arc<RecordingNotifier>,
}

impl Default for InviteFixture {
	fn default() -> Self {
		Self::new()
	}
}

impl InviteFixture {
	pub fn new() -> Self {
		let fixture = Self {
			store: Arc::new(InMemoryConfirmationStore::new()),
			clinic: Arc::new(FakeClinicService::new()),
			identity: Arc::new(FakeIdentity::new()),
			profiles: Arc::new(FakeProfiles::new()),
			notifier: Arc::new(RecordingNotifier::new()),
		};
		fixture.clinic.add_clinic(CLINIC_ID, CLINIC_NAME);
		fixture.clinic.add_clinician(CLINIC_ID, ADMIN_ID, &[ADMIN_ROLE]);
		fixture.identity.add_account(ADMIN_ID, "admin@clinic.org");
		fixture
			.identity
			.add_session(&session_for(SERVER_ID), SERVER_ID, true);
		fixture.profiles.set_full_name(ADMIN_ID, ADMIN_NAME);
		fixture
	}

	pub fn service(&self) -> InviteService {
		InviteService::new(
			self.store.clone(),
			self.clinic.clone(),
			self.identity.clone(),
			self.profiles.clone(),
			self.notifier.clone(),
			Arc::new(StaticServerToken::new("server-token")),
			ADMIN_ROLE,
		)
	}

	pub fn admin() -> CallerToken {
		Self::user(ADMIN_ID)
	}

	pub fn user(user_id: &str) -> CallerToken {
		CallerToken::user(UserId::from(user_id), SecretString::new(session_for(user_id)))
	}

	pub fn server() -> CallerToken {
		CallerToken::server(UserId::from(SERVER_ID), SecretString::new(session_for(SERVER_ID)))
	}

	pub fn clinic_id() -> ClinicId {
		ClinicId::from(CLINIC_ID)
	}
}
