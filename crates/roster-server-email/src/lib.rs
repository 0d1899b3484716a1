// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Invite notifications for Roster.
//!
//! A confirmation plus its [`NotificationContent`] is rendered through the
//! template named by the confirmation and handed to a [`NotificationSender`].
//! Messages are tagged with the confirmation key; there is no dedupe, so a
//! resend produces another message for the same key.

mod content;
mod error;
mod sender;
mod template;

pub use content::NotificationContent;
pub use error::EmailError;
pub use sender::{DisabledNotificationSender, NotificationSender, SmtpNotificationSender};
pub use template::{render_email, EmailTemplate, RenderedEmail};
