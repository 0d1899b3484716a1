// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Roster server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use roster_server::{create_router, AppState};
use roster_server_clinic::HttpClinicClient;
use roster_server_config::LogFormat;
use roster_server_db::ConfirmationRepository;
use roster_server_email::{DisabledNotificationSender, NotificationSender, SmtpNotificationSender};
use roster_server_identity::{HttpIdentityClient, HttpProfileClient, ServerLogin};
use roster_server_invites::InviteService;
use roster_server_smtp::SmtpClient;
use tower_http::{
	cors::{Any, CorsLayer},
	timeout::TimeoutLayer,
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Roster server - clinician invite confirmations.
#[derive(Parser, Debug)]
#[command(name = "roster-server", about = "Roster clinician invite server", version)]
struct Args {
	/// Config file to use instead of /etc/roster/server.toml
	#[arg(long, env = "ROSTER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("roster-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match args.config {
		Some(path) => roster_server_config::load_config_with_file(path)?,
		None => roster_server_config::load_config()?,
	};

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	match config.logging.format {
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer())
			.init(),
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting roster-server"
	);

	let pool = roster_server_db::create_pool(&config.database.url).await?;
	roster_server_db::run_migrations(&pool).await?;
	let store = Arc::new(ConfirmationRepository::new(pool));

	let identity_timeout = Duration::from_secs(config.identity.timeout_secs);
	let server_token = Arc::new(ServerLogin::new(
		config.identity.base_url.clone(),
		config.identity.server_name.clone(),
		config.identity.server_secret.clone(),
		identity_timeout,
	));
	let clinic = Arc::new(HttpClinicClient::new(
		config.clinic.base_url.clone(),
		Duration::from_secs(config.clinic.timeout_secs),
		server_token.clone(),
	));
	let identity = Arc::new(HttpIdentityClient::new(
		config.identity.base_url.clone(),
		identity_timeout,
		server_token.clone(),
	));
	let profiles = Arc::new(HttpProfileClient::new(
		config.identity.profile_base_url.clone(),
		identity_timeout,
		server_token.clone(),
	));

	let notifier: Arc<dyn NotificationSender> = match config.smtp.clone() {
		Some(smtp_config) => {
			let smtp = SmtpClient::new(smtp_config)?;
			if let Err(e) = smtp.check_health().await {
				tracing::warn!(error = %e, "SMTP server unreachable; invite emails may fail");
			}
			Arc::new(SmtpNotificationSender::new(
				smtp,
				config.notifications.web_url.clone(),
			))
		}
		None => {
			tracing::warn!("SMTP not configured; invite emails are disabled");
			Arc::new(DisabledNotificationSender)
		}
	};

	let invites = Arc::new(InviteService::new(
		store.clone(),
		clinic,
		identity.clone(),
		profiles,
		notifier,
		server_token,
		config.auth.admin_role.clone(),
	));
	let state = AppState::new(invites, store, identity, config.auth.session_header.clone());

	let app = create_router(state)
		.layer(TimeoutLayer::new(Duration::from_secs(
			config.http.request_timeout_secs,
		)))
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
