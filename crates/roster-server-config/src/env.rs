// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading from the environment.
//!
//! A secret named `FOO` may be given inline as `FOO` or as a path in
//! `FOO_FILE` (for container secret mounts). Setting both is an error.

use std::path::PathBuf;

use roster_common_secret::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	#[error("both {name} and {name}_FILE are set; use only one")]
	Ambiguous { name: String },

	#[error("failed to read {name}_FILE at {path}: {source}")]
	FileRead {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load an optional secret from `name` or `name_FILE`.
///
/// File contents are trimmed of trailing whitespace. Empty values count as unset.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let inline = std::env::var(name).ok().filter(|v| !v.is_empty());
	let file = std::env::var(&file_var).ok().filter(|v| !v.is_empty());

	match (inline, file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Ambiguous {
			name: name.to_string(),
		}),
		(Some(value), None) => Ok(Some(SecretString::new(value))),
		(None, Some(path)) => {
			let path = PathBuf::from(path);
			let content = std::fs::read_to_string(&path).map_err(|e| SecretEnvError::FileRead {
				name: name.to_string(),
				path: path.clone(),
				source: e,
			})?;
			let trimmed = content.trim_end();
			if trimmed.is_empty() {
				Ok(None)
			} else {
				Ok(Some(SecretString::new(trimmed.to_string())))
			}
		}
		(None, None) => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	// Each test uses its own variable name so they can run in parallel.

	#[test]
	fn unset_secret_is_none() {
		assert!(load_secret_env("ROSTER_TEST_SECRET_UNSET").unwrap().is_none());
	}

	#[test]
	fn inline_secret_is_loaded() {
		std::env::set_var("ROSTER_TEST_SECRET_INLINE", "hunter2");
		let secret = load_secret_env("ROSTER_TEST_SECRET_INLINE").unwrap().unwrap();
		assert_eq!(secret.expose(), "hunter2");
		std::env::remove_var("ROSTER_TEST_SECRET_INLINE");
	}

	#[test]
	fn file_secret_is_trimmed() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		std::env::set_var("ROSTER_TEST_SECRET_VIA_FILE_FILE", file.path());
		let secret = load_secret_env("ROSTER_TEST_SECRET_VIA_FILE").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
		std::env::remove_var("ROSTER_TEST_SECRET_VIA_FILE_FILE");
	}

	#[test]
	fn both_forms_is_an_error() {
		std::env::set_var("ROSTER_TEST_SECRET_BOTH", "a");
		std::env::set_var("ROSTER_TEST_SECRET_BOTH_FILE", "/tmp/whatever");
		let result = load_secret_env("ROSTER_TEST_SECRET_BOTH");
		assert!(matches!(result, Err(SecretEnvError::Ambiguous { .. })));
		std::env::remove_var("ROSTER_TEST_SECRET_BOTH");
		std::env::remove_var("ROSTER_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn missing_file_is_an_error() {
		std::env::set_var("ROSTER_TEST_SECRET_MISSING_FILE", "/nonexistent/roster/secret");
		let result = load_secret_env("ROSTER_TEST_SECRET_MISSING");
		assert!(matches!(result, Err(SecretEnvError::FileRead { .. })));
		std::env::remove_var("ROSTER_TEST_SECRET_MISSING_FILE");
	}
}
