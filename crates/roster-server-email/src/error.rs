// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use roster_server_smtp::SmtpError;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
	#[error("email delivery is not configured")]
	NotConfigured,

	#[error(transparent)]
	Smtp(#[from] SmtpError),
}
