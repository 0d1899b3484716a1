// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod auth;
mod clinic;
mod database;
mod http;
mod identity;
mod logging;
mod notifications;
mod smtp;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use clinic::{ClinicConfig, ClinicConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use identity::{IdentityConfig, IdentityConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use notifications::{NotificationsConfig, NotificationsConfigLayer};
pub use smtp::SmtpConfigLayer;
pub use roster_server_smtp::SmtpConfig;
