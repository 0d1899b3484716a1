// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Roster.
//!
//! Every outbound client (clinic service, identity service, profile service)
//! is built from [`builder`] so they all carry the same User-Agent. Outbound
//! calls are single-attempt and failures surface to the caller immediately.

mod client;

pub use client::{builder, new_client_with_timeout, user_agent};
