// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
	value::Type,
};

/// Path step cannot navigate into the given value with the given index
pub fn invalid_path_component(container: Type, index: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::InvalidPathComponent,
		message: format!("Cannot index a value of type {} with a value of type {}", container, index),
		fragment: Fragment::None,
		label: None,
		help: Some("Use an INT to index a LIST or SEXP and text to index a STRUCT".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn non_text_struct_field_key(found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NonTextStructFieldKey,
		message: format!("Struct field names must be text, found {}", found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
