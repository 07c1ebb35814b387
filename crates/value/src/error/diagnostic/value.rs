// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
};

pub fn date_field_out_of_range(year: i32, month: u32, day: u32) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::DateFieldOutOfRange,
		message: format!("Date {:04}-{:02}-{:02} is out of range", year, month, day),
		fragment: Fragment::None,
		label: None,
		help: Some("Years range from 0 to 9999 and days must exist in the given month".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn time_field_out_of_range(detail: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::TimeFieldOutOfRange,
		message: format!("Time is out of range: {}", detail),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Value cannot cross the external format boundary
pub fn invalid_external_value(detail: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::InvalidExternalValue,
		message: format!("Cannot convert value: {}", detail),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
