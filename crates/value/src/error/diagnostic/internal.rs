// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
};

/// Creates an internal error diagnostic with source location and context
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
		file.split('/').next_back().unwrap_or(file).replace(".rs", ""),
		line
	);

	let help = format!(
		"This is an internal error that should never occur in normal operation.\n\n\
		 Please file a bug report including the following information:\n\
		 Error ID: {}\n\
		 Location: {}:{}:{}\n\
		 Function: {}\n\
		 Module: {}\n\
		 Version: {}",
		error_id,
		file,
		line,
		column,
		function,
		module_path,
		env!("CARGO_PKG_VERSION"),
	);

	Diagnostic {
		code: ErrorCode::Internal,
		message: format!("Internal error [{}]: {}", error_id, reason),
		fragment: Fragment::None,
		label: Some(format!("Internal invariant violated at {}:{}:{}", file, line, column)),
		help: Some(help),
		notes: vec![format!("Error occurred in function: {}", function), format!("Error tracking ID: {}", error_id)],
		cause: None,
	}
}

/// Internal error without call-site context
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_context(reason, "unknown", 0, 0, "unknown", "unknown")
}

#[cfg(test)]
mod tests {
	use crate::{ErrorCode, internal_err, internal_error};

	#[test]
	fn test_internal_error_captures_location() {
		let diagnostic = internal_error!("register {} missing", 3);
		assert_eq!(diagnostic.code, ErrorCode::Internal);
		assert!(diagnostic.message.contains("register 3 missing"));
		assert!(diagnostic.label.as_deref().unwrap().contains("internal.rs"));
		assert!(diagnostic.notes[0].contains("test_internal_error_captures_location"));
	}

	#[test]
	fn test_internal_err_is_internal() {
		let result: crate::Result<()> = internal_err!("broken");
		let err = result.unwrap_err();
		assert!(err.is_internal());
	}
}
