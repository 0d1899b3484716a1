// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for Roster server.
//!
//! Confirmations live in a single SQLite table shared by every invite kind.
//! The [`ConfirmationStore`] trait is the seam the invite orchestrator talks
//! to; [`ConfirmationRepository`] is the SQLite implementation.

pub mod confirmation;
pub mod error;
pub mod pool;
pub mod testing;

pub use confirmation::{ConfirmationRepository, ConfirmationStore};
pub use error::{DbError, Result};
pub use pool::{create_pool, run_migrations};
