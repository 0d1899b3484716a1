// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::DbError;

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./roster.db")
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

const MIGRATIONS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS confirmations (
		key TEXT PRIMARY KEY NOT NULL,
		type TEXT NOT NULL,
		status TEXT NOT NULL,
		email TEXT NOT NULL,
		user_id TEXT,
		creator_id TEXT NOT NULL,
		creator_full_name TEXT,
		template_name TEXT NOT NULL,
		clinic_id TEXT,
		clinic_name TEXT,
		created_at TEXT NOT NULL,
		modified_at TEXT
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_confirmations_email ON confirmations(email, type, status)",
	"CREATE INDEX IF NOT EXISTS idx_confirmations_clinic ON confirmations(clinic_id, type, status)",
	"CREATE INDEX IF NOT EXISTS idx_confirmations_user ON confirmations(user_id, type, status)",
];

/// Create the confirmation schema if it does not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in MIGRATIONS {
		sqlx::query(statement).execute(pool).await?;
	}
	tracing::debug!(statements = MIGRATIONS.len(), "database migrations applied");
	Ok(())
}
