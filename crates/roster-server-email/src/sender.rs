// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification delivery.

use async_trait::async_trait;
use roster_confirmation_core::Confirmation;
use roster_server_smtp::{OutgoingEmail, SmtpClient};
use tracing::{info, instrument, warn};

use crate::content::NotificationContent;
use crate::error::EmailError;
use crate::template::{render_email, EmailTemplate};

#[async_trait]
pub trait NotificationSender: Send + Sync {
	/// Render and deliver the notification for `confirmation`.
	async fn send(
		&self,
		confirmation: &Confirmation,
		content: &NotificationContent,
	) -> Result<(), EmailError>;
}

/// Delivers notifications over SMTP.
pub struct SmtpNotificationSender {
	smtp: SmtpClient,
	web_url: String,
}

impl SmtpNotificationSender {
	pub fn new(smtp: SmtpClient, web_url: impl Into<String>) -> Self {
		Self {
			smtp,
			web_url: web_url.into(),
		}
	}
}

/// Build the outgoing message, tagged with the confirmation key.
pub(crate) fn build_outgoing(
	confirmation: &Confirmation,
	content: &NotificationContent,
	web_url: &str,
) -> OutgoingEmail {
	let template = EmailTemplate::new(confirmation.template_name, content);
	let rendered = render_email(&template, web_url);
	OutgoingEmail {
		to: confirmation.email.clone(),
		subject: rendered.subject,
		body_html: rendered.body_html,
		body_text: rendered.body_text,
		message_id: Some(format!("{}.{}", confirmation.template_name, confirmation.key)),
	}
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
	#[instrument(skip(self, confirmation, content), fields(invite_key = %confirmation.key, template = %confirmation.template_name))]
	async fn send(
		&self,
		confirmation: &Confirmation,
		content: &NotificationContent,
	) -> Result<(), EmailError> {
		let outgoing = build_outgoing(confirmation, content, &self.web_url);
		self.smtp.send_email(&outgoing).await?;
		info!("notification sent");
		Ok(())
	}
}

/// Used when SMTP is not configured: every send fails with [`EmailError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotificationSender;

#[async_trait]
impl NotificationSender for DisabledNotificationSender {
	async fn send(
		&self,
		confirmation: &Confirmation,
		_content: &NotificationContent,
	) -> Result<(), EmailError> {
		warn!(invite_key = %confirmation.key, "SMTP not configured, notification not sent");
		Err(EmailError::NotConfigured)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use roster_confirmation_core::{ClinicId, ClinicianInvite, UserId};

	fn confirmation() -> Confirmation {
		Confirmation::new_clinician_invite(
			UserId::from("admin"),
			"new@clinic.org",
			ClinicianInvite {
				clinic_id: ClinicId::from("c1"),
				clinic_name: "Clinic One".to_string(),
			},
		)
	}

	#[test]
	fn outgoing_is_tagged_with_key() {
		let conf = confirmation();
		let content = NotificationContent::for_clinician_invite(&conf).unwrap();
		let outgoing = build_outgoing(&conf, &content, "https://app");
		assert_eq!(outgoing.to, "new@clinic.org");
		assert_eq!(
			outgoing.message_id,
			Some(format!("clinician_invite.{}", conf.key))
		);
		assert!(outgoing.body_text.contains("https://app/signup"));
	}

	#[tokio::test]
	async fn disabled_sender_reports_not_configured() {
		let conf = confirmation();
		let content = NotificationContent::for_clinician_invite(&conf).unwrap();
		let result = DisabledNotificationSender.send(&conf, &content).await;
		assert!(matches!(result, Err(EmailError::NotConfigured)));
	}
}
