// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
};

/// A case-insensitive lookup matched more than one distinct key
pub fn ambiguous_binding<S: AsRef<str>>(name: &str, candidates: &[S]) -> Diagnostic {
	let candidates = candidates.iter().map(|c| format!("'{}'", c.as_ref())).collect::<Vec<_>>().join(", ");
	Diagnostic {
		code: ErrorCode::AmbiguousBinding,
		message: format!("Binding '{}' is ambiguous", name),
		fragment: Fragment::None,
		label: Some(format!("matches {}", candidates)),
		help: Some(format!("Quote the name to look up '{}' case-sensitively", name)),
		notes: vec![],
		cause: None,
	}
}

/// Name is not bound in the current scope
pub fn binding_does_not_exist(name: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::BindingDoesNotExist,
		message: format!("Binding '{}' does not exist", name),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Positional parameters are numbered from 1
pub fn unbound_parameter(ordinal: usize, available: usize) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::UnboundParameter,
		message: format!("No value bound for parameter {}", ordinal),
		fragment: Fragment::None,
		label: None,
		help: Some(format!("The session provides {} positional parameter(s), numbered from 1", available)),
		notes: vec![],
		cause: None,
	}
}
