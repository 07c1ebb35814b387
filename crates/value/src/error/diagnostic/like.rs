// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
	value::Type,
};

/// LIKE value, pattern or escape is not text
pub fn invalid_inputs(role: &str, found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::LikeInvalidInputs,
		message: format!("LIKE {} must be text, found {}", role, found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Escape character is followed by something other than '_', '%' or itself
pub fn invalid_escape_sequence(pattern: &str, escape: char, position: usize) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::LikeInvalidEscapeSequence,
		message: format!("Invalid escape sequence in LIKE pattern '{}' at position {}", pattern, position),
		fragment: Fragment::None,
		label: None,
		help: Some(format!("'{}' may only precede '_', '%' or another '{}'", escape, escape)),
		notes: vec![],
		cause: None,
	}
}

pub fn escape_not_single_character(escape: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::LikeEscapeNotSingleCharacter,
		message: format!("LIKE escape must be exactly one character, found '{}'", escape),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
