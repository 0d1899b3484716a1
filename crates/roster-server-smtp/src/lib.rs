// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP transport for Roster notifications.
//!
//! A thin async wrapper over [`lettre`] that sends multipart (HTML + text)
//! messages. Every message can carry a stable `Message-ID` derived from the
//! confirmation it belongs to, so a mail relay or recipient can correlate
//! resends of the same invite.

use lettre::{
	message::{header::ContentType, Mailbox, MultiPart, SinglePart},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use roster_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Authentication with the SMTP server failed.
	#[error("authentication failed: {0}")]
	Auth(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// Connection settings for the SMTP relay.
///
/// The password is a [`SecretString`], so `Debug` output never leaks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	pub from_address: String,
	pub from_name: String,
	/// Use STARTTLS. Defaults to `true`.
	#[serde(default = "default_use_tls")]
	pub use_tls: bool,
}

fn default_use_tls() -> bool {
	true
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
	pub to: String,
	pub subject: String,
	pub body_html: String,
	pub body_text: String,
	/// Correlation id placed in the `Message-ID` header, without angle brackets.
	pub message_id: Option<String>,
}

/// Async SMTP client. The connection is opened lazily on first send.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
	from_domain: String,
}

impl SmtpClient {
	/// Build the transport from configuration.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the from address is invalid.
	/// Returns [`SmtpError::Connection`] if the transport cannot be built.
	#[tracing::instrument(
		name = "smtp_client_new",
		skip(config),
		fields(host = %config.host, port = %config.port, use_tls = %config.use_tls)
	)]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		if config.host.is_empty() {
			return Err(SmtpError::Config("SMTP host is required".into()));
		}

		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;
		let from_domain = from_mailbox.email.domain().to_string();

		let builder = if config.use_tls {
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
		};

		let mut builder = builder.port(config.port);

		match (config.username, config.password) {
			(Some(username), Some(password)) => {
				builder = builder.credentials(Credentials::new(username, password.into_inner()));
			}
			(Some(_), None) | (None, Some(_)) => {
				return Err(SmtpError::Auth(
					"username and password must be configured together".into(),
				));
			}
			(None, None) => {}
		}

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport: builder.build(),
			from_mailbox,
			from_domain,
		})
	}

	/// Open a connection to the relay and issue `NOOP`.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}

	/// Send a multipart message.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the recipient address is invalid.
	/// Returns [`SmtpError::Send`] if the relay rejects the message.
	#[tracing::instrument(
		name = "smtp_send_email",
		skip(self, email),
		fields(to = %email.to, subject = %email.subject, message_id = ?email.message_id)
	)]
	pub async fn send_email(&self, email: &OutgoingEmail) -> Result<(), SmtpError> {
		let message = self.build_message(email)?;

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent successfully");
		Ok(())
	}

	fn build_message(&self, email: &OutgoingEmail) -> Result<Message, SmtpError> {
		let to_mailbox: Mailbox = email
			.to
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(email.subject.as_str())
			.message_id(
				email
					.message_id
					.as_ref()
					.map(|id| format!("<{id}@{}>", self.from_domain)),
			)
			.multipart(
				MultiPart::alternative()
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_PLAIN)
							.body(email.body_text.clone()),
					)
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_HTML)
							.body(email.body_html.clone()),
					),
			)
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))
	}
}

/// Returns true if `email` parses as a mailbox.
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> SmtpConfig {
		SmtpConfig {
			host: "smtp.example.com".to_string(),
			port: 587,
			username: Some("user".to_string()),
			password: Some(SecretString::new("super-secret-password".to_string())),
			from_address: "invites@clinic.example.com".to_string(),
			from_name: "Roster".to_string(),
			use_tls: false,
		}
	}

	fn outgoing(to: &str) -> OutgoingEmail {
		OutgoingEmail {
			to: to.to_string(),
			subject: "You're invited".to_string(),
			body_html: "<p>Join</p>".to_string(),
			body_text: "Join".to_string(),
			message_id: Some("abc123".to_string()),
		}
	}

	#[test]
	fn config_debug_does_not_leak_password() {
		let debug = format!("{:?}", config());
		assert!(!debug.contains("super-secret-password"));
		assert!(debug.contains("[REDACTED]"));
	}

	#[test]
	fn new_rejects_bad_from_address() {
		let mut cfg = config();
		cfg.from_address = "not-an-address".to_string();
		assert!(matches!(SmtpClient::new(cfg), Err(SmtpError::Address(_))));
	}

	#[test]
	fn new_rejects_half_configured_credentials() {
		let mut cfg = config();
		cfg.password = None;
		assert!(matches!(SmtpClient::new(cfg), Err(SmtpError::Auth(_))));
	}

	#[test]
	fn new_rejects_empty_host() {
		let mut cfg = config();
		cfg.host = String::new();
		assert!(matches!(SmtpClient::new(cfg), Err(SmtpError::Config(_))));
	}

	#[tokio::test]
	async fn message_carries_correlation_id() {
		let client = SmtpClient::new(config()).unwrap();
		let message = client.build_message(&outgoing("new@clinic.org")).unwrap();
		let raw = String::from_utf8(message.formatted()).unwrap();
		assert!(raw.contains("Message-ID: <abc123@clinic.example.com>"));
		assert!(raw.contains("To: new@clinic.org"));
	}

	#[tokio::test]
	async fn invalid_recipient_is_rejected_before_sending() {
		let client = SmtpClient::new(config()).unwrap();
		let result = client.send_email(&outgoing("not-an-email")).await;
		assert!(matches!(result, Err(SmtpError::Address(_))));
	}

	#[test]
	fn validates_addresses() {
		assert!(is_valid_email("user@example.com"));
		assert!(is_valid_email("User Name <user@example.com>"));
		assert!(!is_valid_email("user@"));
		assert!(!is_valid_email(""));
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn password_never_in_config_debug(password in "[a-zA-Z0-9!@#$%^&*]{8,32}") {
				prop_assume!(!password.contains("REDACTED"));
				let mut cfg = config();
				cfg.password = Some(SecretString::new(password.clone()));
				let debug = format!("{cfg:?}");
				prop_assert!(!debug.contains(&password));
			}

			#[test]
			fn simple_addresses_are_valid(
				local in "[a-zA-Z][a-zA-Z0-9]{0,30}",
				domain in "[a-zA-Z][a-zA-Z0-9]{0,20}",
				tld in "(com|org|net|io)"
			) {
				let email = format!("{local}@{domain}.{tld}");
				prop_assert!(is_valid_email(&email));
			}
		}
	}
}
