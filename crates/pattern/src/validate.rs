// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use quill_value::{
	Result,
	error::diagnostic::like::{escape_not_single_character, invalid_escape_sequence},
	return_error,
};

/// Resolves the `ESCAPE` operand to a single character.
pub fn escape_char(escape: Option<&str>) -> Result<Option<char>> {
	let Some(escape) = escape else {
		return Ok(None);
	};
	let mut chars = escape.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Ok(Some(c)),
		_ => return_error!(escape_not_single_character(escape)),
	}
}

/// Checks that every escape character is followed by `_`, `%` or the escape itself.
pub fn validate(pattern: &str, escape: Option<char>) -> Result<()> {
	let Some(escape) = escape else {
		return Ok(());
	};
	let mut chars = pattern.chars().enumerate();
	while let Some((position, c)) = chars.next() {
		if c != escape {
			continue;
		}
		match chars.next() {
			Some((_, next)) if next == '_' || next == '%' || next == escape => {}
			_ => return_error!(invalid_escape_sequence(pattern, escape, position)),
		}
	}
	Ok(())
}
