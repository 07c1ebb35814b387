// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
	value::Type,
};

pub fn non_int_limit(found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NonIntLimit,
		message: format!("LIMIT must be an INT, found {}", found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn negative_limit(value: i64) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NegativeLimit,
		message: format!("LIMIT must not be negative, found {}", value),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn non_int_offset(found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NonIntOffset,
		message: format!("OFFSET must be an INT, found {}", found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn negative_offset(value: i64) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NegativeOffset,
		message: format!("OFFSET must not be negative, found {}", value),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Feature recognised but not implemented by the evaluator
pub fn unsupported_feature(feature: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::UnsupportedFeature,
		message: format!("{} is not supported", feature),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
