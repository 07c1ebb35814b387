// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
};

/// Cooperative cancellation was requested while `phase` was running
pub fn interrupted(phase: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::Interrupted,
		message: format!("Interrupted during {}", phase),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
