// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{error::diagnostic::Diagnostic, fragment::Fragment};

pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// Creates a detailed internal error diagnostic with source location and
/// context
pub fn internal_with_context(
	reason: impl Into<String>,
	file: &str,
	line: u32,
	column: u32,
	function: &str,
	module_path: &str,
) -> Diagnostic {
	let reason = reason.into();

	let error_id = format!(
		"ERR-{}-{}:{}",
		chrono::Utc::now().timestamp_millis(),
		file.rsplit('/').next().unwrap_or(file).trim_end_matches(".rs"),
		line
	);

	let location_info =
		format!("Location: {}:{}:{}\nFunction: {}\nModule: {}", file, line, column, function, module_path);

	let help = format!(
		"This is an internal error that should never occur in normal operation.\n\n\
		 Include the following information when reporting it:\n\
		 Error ID: {}\n\
		 {}\n\
		 Version: {}\n\
		 Platform: {} {}",
		error_id,
		location_info,
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	);

	Diagnostic {
		code: INTERNAL_ERROR_CODE.to_string(),
		statement: None,
		message: format!("Internal error [{}]: {}", error_id, reason),
		column: None,
		fragment: Fragment::None,
		label: Some(format!("Internal invariant violated at {}:{}:{}", file, line, column)),
		help: Some(help),
		notes: vec![
			format!("Error occurred in function: {}", function),
			"The catalog indexes may no longer agree with the object store.".to_string(),
			format!("Error tracking ID: {}", error_id),
		],
		cause: None,
	}
}

/// Simplified internal error without detailed context
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_context(reason, "unknown", 0, 0, "unknown", "unknown")
}
