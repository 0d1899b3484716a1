// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email templates.

use roster_confirmation_core::TemplateName;

use crate::content::NotificationContent;

/// Email templates with their variable data.
#[derive(Debug, Clone)]
pub enum EmailTemplate {
	/// Invitation to join a clinic's staff.
	ClinicianInvite {
		clinic_name: String,
		creator_name: String,
		email: String,
		web_path: String,
	},
}

impl EmailTemplate {
	pub fn new(name: TemplateName, content: &NotificationContent) -> Self {
		match name {
			TemplateName::ClinicianInvite => EmailTemplate::ClinicianInvite {
				clinic_name: content.clinic_name.clone(),
				creator_name: content.creator_name.clone(),
				email: content.email.clone(),
				web_path: content.web_path.clone(),
			},
		}
	}
}

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
	pub subject: String,
	pub body_html: String,
	pub body_text: String,
}

/// Render a template. Links point at `{web_url}/{web_path}`.
pub fn render_email(template: &EmailTemplate, web_url: &str) -> RenderedEmail {
	match template {
		EmailTemplate::ClinicianInvite {
			clinic_name,
			creator_name,
			email,
			web_path,
		} => {
			let link = format!("{}/{}", web_url.trim_end_matches('/'), web_path);
			let inviter = if creator_name.is_empty() {
				"A clinic administrator".to_string()
			} else {
				creator_name.clone()
			};
			let action = if web_path == "login" {
				"Log in"
			} else {
				"Sign up"
			};

			let subject = format!("You've been invited to join {clinic_name}");
			let body_text = format!(
				"{inviter} has invited {email} to join the {clinic_name} team.\n\n\
				 {action} to accept the invitation:\n{link}\n"
			);
			let body_html = format!(
				"<p>{} has invited {} to join the <strong>{}</strong> team.</p>\
				 <p><a href=\"{}\">{} to accept the invitation</a></p>",
				escape_html(&inviter),
				escape_html(email),
				escape_html(clinic_name),
				escape_html(&link),
				action,
			);

			RenderedEmail {
				subject,
				body_html,
				body_text,
			}
		}
	}
}

fn escape_html(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}
