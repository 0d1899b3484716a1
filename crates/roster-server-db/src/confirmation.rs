// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Confirmation repository for database operations.
//!
//! Confirmations are never physically deleted here; settled records keep
//! their terminal status. Retention is an operator concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_confirmation_core::{
	ClinicId, ClinicianInvite, Confirmation, ConfirmationFilter, ConfirmationKey,
	ConfirmationStatus, ConfirmationType, Creator, InviteKind, TemplateName, UserId,
};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Row, Sqlite};

use crate::error::DbError;

#[async_trait]
pub trait ConfirmationStore: Send + Sync {
	async fn find(&self, filter: &ConfirmationFilter) -> Result<Vec<Confirmation>, DbError>;
	async fn save(&self, confirmation: &Confirmation) -> Result<(), DbError>;
	async fn ping(&self) -> Result<(), DbError>;
}

/// Repository for confirmation database operations.
#[derive(Clone)]
pub struct ConfirmationRepository {
	pool: SqlitePool,
}

impl ConfirmationRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Find confirmations matching a filter, oldest first.
	///
	/// # Arguments
	/// * `filter` - Type is always applied; every other field only when set
	#[tracing::instrument(
		skip(self, filter),
		fields(confirmation_type = %filter.confirmation_type, key = ?filter.key, status = ?filter.status)
	)]
	pub async fn find(&self, filter: &ConfirmationFilter) -> Result<Vec<Confirmation>, DbError> {
		let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
			r#"
			SELECT key, type, status, email, user_id, creator_id, creator_full_name,
			       template_name, clinic_id, clinic_name, created_at, modified_at
			FROM confirmations
			WHERE type = "#,
		);
		query.push_bind(filter.confirmation_type.as_str());

		if let Some(key) = &filter.key {
			query.push(" AND key = ").push_bind(key.as_str());
		}
		if let Some(email) = &filter.email {
			query.push(" AND email = ").push_bind(email.as_str());
		}
		if let Some(clinic_id) = &filter.clinic_id {
			query.push(" AND clinic_id = ").push_bind(clinic_id.as_str());
		}
		if let Some(user_id) = &filter.user_id {
			query.push(" AND user_id = ").push_bind(user_id.as_str());
		}
		if let Some(status) = filter.status {
			query.push(" AND status = ").push_bind(status.as_str());
		}
		query.push(" ORDER BY created_at ASC, key ASC");

		let rows = query.build().fetch_all(&self.pool).await?;
		let confirmations = rows
			.iter()
			.map(row_to_confirmation)
			.collect::<Result<Vec<_>, _>>()?;

		tracing::debug!(count = confirmations.len(), "confirmations found");
		Ok(confirmations)
	}

	/// Insert a confirmation or update the existing row with the same key.
	///
	/// A row that already reached a terminal status is never overwritten, and
	/// an existing row keeps its clinic.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the key belongs to a settled confirmation
	/// or to another clinic.
	#[tracing::instrument(skip(self, confirmation), fields(key = %confirmation.key, status = %confirmation.status))]
	pub async fn save(&self, confirmation: &Confirmation) -> Result<(), DbError> {
		let clinic = confirmation.clinic();
		let result = sqlx::query(
			r#"
			INSERT INTO confirmations (
				key, type, status, email, user_id, creator_id, creator_full_name,
				template_name, clinic_id, clinic_name, created_at, modified_at
			)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(key) DO UPDATE SET
				status = excluded.status,
				email = excluded.email,
				user_id = COALESCE(excluded.user_id, confirmations.user_id),
				creator_id = excluded.creator_id,
				creator_full_name = excluded.creator_full_name,
				template_name = excluded.template_name,
				clinic_id = excluded.clinic_id,
				clinic_name = excluded.clinic_name,
				modified_at = excluded.modified_at
			WHERE confirmations.status = 'pending'
				AND confirmations.type = excluded.type
				AND confirmations.clinic_id IS excluded.clinic_id
			"#,
		)
		.bind(confirmation.key.as_str())
		.bind(confirmation.confirmation_type().as_str())
		.bind(confirmation.status.as_str())
		.bind(&confirmation.email)
		.bind(confirmation.user_id.as_ref().map(|u| u.as_str()))
		.bind(confirmation.creator_id.as_str())
		.bind(confirmation.creator.full_name.as_deref())
		.bind(confirmation.template_name.as_str())
		.bind(clinic.map(|c| c.clinic_id.as_str()))
		.bind(clinic.map(|c| c.clinic_name.as_str()))
		.bind(confirmation.created_at.to_rfc3339())
		.bind(confirmation.modified_at.map(|d| d.to_rfc3339()))
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::Conflict(format!(
				"confirmation {} is settled or belongs to another clinic",
				confirmation.key
			)));
		}

		tracing::debug!(key = %confirmation.key, "confirmation saved");
		Ok(())
	}

	/// Cheap liveness query for health checks.
	#[tracing::instrument(skip(self))]
	pub async fn ping(&self) -> Result<(), DbError> {
		sqlx::query("SELECT 1").execute(&self.pool).await?;
		Ok(())
	}
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|d| d.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

fn row_to_confirmation(row: &sqlx::sqlite::SqliteRow) -> Result<Confirmation, DbError> {
	let type_str: String = row.get("type");
	let status_str: String = row.get("status");
	let template_str: String = row.get("template_name");
	let created_at: String = row.get("created_at");
	let modified_at: Option<String> = row.get("modified_at");
	let clinic_id: Option<String> = row.get("clinic_id");
	let clinic_name: Option<String> = row.get("clinic_name");
	let creator_id = UserId::new(row.get::<String, _>("creator_id"));

	let confirmation_type: ConfirmationType = type_str
		.parse()
		.map_err(|e| DbError::Internal(format!("{e}")))?;
	let status: ConfirmationStatus = status_str
		.parse()
		.map_err(|e| DbError::Internal(format!("{e}")))?;
	let template_name: TemplateName = template_str
		.parse()
		.map_err(|e| DbError::Internal(format!("{e}")))?;

	let kind = match confirmation_type {
		ConfirmationType::ClinicianInvite => {
			let clinic_id = clinic_id.ok_or_else(|| {
				DbError::Internal("clinician invite without clinic_id".to_string())
			})?;
			InviteKind::ClinicianInvite(ClinicianInvite {
				clinic_id: ClinicId::new(clinic_id),
				clinic_name: clinic_name.unwrap_or_default(),
			})
		}
		ConfirmationType::CareteamInvite => InviteKind::CareteamInvite,
		ConfirmationType::PasswordReset => InviteKind::PasswordReset,
		ConfirmationType::Signup => InviteKind::Signup,
	};

	Ok(Confirmation {
		key: ConfirmationKey::new(row.get::<String, _>("key")),
		status,
		email: row.get("email"),
		user_id: row.get::<Option<String>, _>("user_id").map(UserId::new),
		creator: Creator {
			user_id: creator_id.clone(),
			full_name: row.get("creator_full_name"),
		},
		creator_id,
		template_name,
		kind,
		created_at: parse_timestamp(&created_at, "created_at")?,
		modified_at: modified_at
			.map(|d| parse_timestamp(&d, "modified_at"))
			.transpose()?,
	})
}

#[async_trait]
impl ConfirmationStore for ConfirmationRepository {
	async fn find(&self, filter: &ConfirmationFilter) -> Result<Vec<Confirmation>, DbError> {
		self.find(filter).await
	}

	async fn save(&self, confirmation: &Confirmation) -> Result<(), DbError> {
		self.save(confirmation).await
	}

	async fn ping(&self) -> Result<(), DbError> {
		self.ping().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_confirmation_test_pool;

	async fn make_repo() -> ConfirmationRepository {
		ConfirmationRepository::new(create_confirmation_test_pool().await)
	}

	fn make_invite(email: &str, clinic: &str) -> Confirmation {
		Confirmation::new_clinician_invite(
			UserId::from("admin-1"),
			email,
			ClinicianInvite {
				clinic_id: ClinicId::from(clinic),
				clinic_name: format!("Clinic {clinic}"),
			},
		)
	}

	#[tokio::test]
	async fn test_save_and_find_by_key() {
		let repo = make_repo().await;
		let mut conf = make_invite("new@clinic.org", "c1");
		conf.creator.full_name = Some("Dr Admin".to_string());
		repo.save(&conf).await.unwrap();

		let found = repo
			.find(&ConfirmationFilter::pending_clinician_invites().key(conf.key.clone()))
			.await
			.unwrap();
		assert_eq!(found.len(), 1);
		let fetched = &found[0];
		assert_eq!(fetched.key, conf.key);
		assert_eq!(fetched.email, "new@clinic.org");
		assert_eq!(fetched.status, ConfirmationStatus::Pending);
		assert_eq!(fetched.clinic_id(), Some(&ClinicId::from("c1")));
		assert_eq!(fetched.clinic().unwrap().clinic_name, "Clinic c1");
		assert_eq!(fetched.creator.full_name.as_deref(), Some("Dr Admin"));
		assert!(fetched.user_id.is_none());
	}

	#[tokio::test]
	async fn test_find_filters_by_email_clinic_and_status() {
		let repo = make_repo().await;
		let a = make_invite("a@x.com", "c1");
		let b = make_invite("a@x.com", "c2");
		let mut c = make_invite("a@x.com", "c1");
		c.transition(ConfirmationStatus::Canceled).unwrap();
		for conf in [&a, &b, &c] {
			repo.save(conf).await.unwrap();
		}

		let pending_for_email = repo
			.find(&ConfirmationFilter::pending_clinician_invites().email("a@x.com"))
			.await
			.unwrap();
		assert_eq!(pending_for_email.len(), 2);

		let pending_for_clinic = repo
			.find(
				&ConfirmationFilter::pending_clinician_invites()
					.clinic_id(ClinicId::from("c1")),
			)
			.await
			.unwrap();
		assert_eq!(pending_for_clinic.len(), 1);
		assert_eq!(pending_for_clinic[0].key, a.key);

		let any_status = repo
			.find(&ConfirmationFilter::new(ConfirmationType::ClinicianInvite).email("a@x.com"))
			.await
			.unwrap();
		assert_eq!(any_status.len(), 3);
	}

	#[tokio::test]
	async fn test_find_never_crosses_types() {
		let repo = make_repo().await;
		repo.save(&make_invite("a@x.com", "c1")).await.unwrap();

		let found = repo
			.find(&ConfirmationFilter::new(ConfirmationType::CareteamInvite).email("a@x.com"))
			.await
			.unwrap();
		assert!(found.is_empty());
	}

	#[tokio::test]
	async fn test_save_updates_pending_record_in_place() {
		let repo = make_repo().await;
		let mut conf = make_invite("a@x.com", "c1");
		repo.save(&conf).await.unwrap();

		conf.attach_user(Some(UserId::from("u1")));
		conf.transition(ConfirmationStatus::Completed).unwrap();
		repo.save(&conf).await.unwrap();

		let found = repo
			.find(&ConfirmationFilter::new(ConfirmationType::ClinicianInvite).key(conf.key.clone()))
			.await
			.unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].status, ConfirmationStatus::Completed);
		assert_eq!(found[0].user_id, Some(UserId::from("u1")));
		assert!(found[0].modified_at.is_some());

		let by_user = repo
			.find(
				&ConfirmationFilter::new(ConfirmationType::ClinicianInvite)
					.user_id(UserId::from("u1")),
			)
			.await
			.unwrap();
		assert_eq!(by_user.len(), 1);
	}

	#[tokio::test]
	async fn test_save_never_reopens_settled_record() {
		let repo = make_repo().await;
		let mut conf = make_invite("a@x.com", "c1");
		conf.transition(ConfirmationStatus::Declined).unwrap();
		repo.save(&conf).await.unwrap();

		let reopened = Confirmation::clinician_invite_with_key(
			conf.key.clone(),
			UserId::from("admin-1"),
			"a@x.com",
			ClinicianInvite {
				clinic_id: ClinicId::from("c1"),
				clinic_name: "Clinic c1".to_string(),
			},
		);
		let result = repo.save(&reopened).await;
		assert!(matches!(result, Err(DbError::Conflict(_))));

		let found = repo
			.find(&ConfirmationFilter::new(ConfirmationType::ClinicianInvite).key(conf.key.clone()))
			.await
			.unwrap();
		assert_eq!(found[0].status, ConfirmationStatus::Declined);
	}

	#[tokio::test]
	async fn test_save_never_moves_invite_to_another_clinic() {
		let repo = make_repo().await;
		let conf = make_invite("a@x.com", "c1");
		repo.save(&conf).await.unwrap();

		let moved = Confirmation::clinician_invite_with_key(
			conf.key.clone(),
			UserId::from("admin-2"),
			"a@x.com",
			ClinicianInvite {
				clinic_id: ClinicId::from("c2"),
				clinic_name: "Clinic c2".to_string(),
			},
		);
		let result = repo.save(&moved).await;
		assert!(matches!(result, Err(DbError::Conflict(_))));

		let found = repo
			.find(&ConfirmationFilter::pending_clinician_invites().key(conf.key.clone()))
			.await
			.unwrap();
		assert_eq!(found[0].clinic_id(), Some(&ClinicId::from("c1")));
		assert_eq!(found[0].creator_id, UserId::from("admin-1"));
	}

	#[tokio::test]
	async fn test_save_keeps_user_id_when_new_value_missing() {
		let repo = make_repo().await;
		let mut conf = make_invite("a@x.com", "c1");
		conf.attach_user(Some(UserId::from("u1")));
		repo.save(&conf).await.unwrap();

		let mut stale = conf.clone();
		stale.user_id = None;
		repo.save(&stale).await.unwrap();

		let found = repo
			.find(&ConfirmationFilter::pending_clinician_invites().key(conf.key.clone()))
			.await
			.unwrap();
		assert_eq!(found[0].user_id, Some(UserId::from("u1")));
	}

	#[tokio::test]
	async fn test_ping() {
		let repo = make_repo().await;
		repo.ping().await.unwrap();
	}
}
