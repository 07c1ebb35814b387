// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
	value::Type,
};

pub fn function_not_found(name: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::FunctionNotFound,
		message: format!("Function '{}' is not defined", name),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn incorrect_argument_count(name: &str, min: usize, max: usize, actual: usize) -> Diagnostic {
	let expected = if min == max {
		format!("{}", min)
	} else {
		format!("{} to {}", min, max)
	};
	Diagnostic {
		code: ErrorCode::IncorrectArgumentCount,
		message: format!("Function '{}' expects {} argument(s), got {}", name, expected, actual),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_argument_type(name: &str, position: usize, expected: &str, found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::InvalidArgumentType,
		message: format!("Argument {} of '{}' must be {}, found {}", position, name, expected, found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Function implementation failed with an error foreign to the engine
pub fn function_failed(name: &str, reason: &str) -> Diagnostic {
	super::internal::internal(format!("function '{}' failed: {}", name, reason))
}
