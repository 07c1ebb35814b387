// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! LIKE pattern matching.
//!
//! A pattern is validated, split into letters, turned into an NFA and determinized into a DFA that
//! matches text one code point at a time.

use quill_value::{CancellationToken, Result};
use tracing::instrument;

pub mod alphabet;
pub mod dfa;
pub mod nfa;
pub mod validate;

use alphabet::{letters, literals};
use dfa::Dfa;
use nfa::Nfa;

/// A compiled LIKE pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
	dfa: Dfa,
}

impl Pattern {
	/// Compiles `pattern`, where `escape` is the raw `ESCAPE` operand.
	#[instrument(name = "pattern::compile", level = "debug", skip(cancel))]
	pub fn compile(pattern: &str, escape: Option<&str>, cancel: &CancellationToken) -> Result<Self> {
		let escape = validate::escape_char(escape)?;
		validate::validate(pattern, escape)?;
		let letters = letters(pattern, escape);
		let nfa = Nfa::build(&letters);
		let dfa = Dfa::build(&nfa, literals(&letters), cancel)?;
		Ok(Self {
			dfa,
		})
	}

	pub fn matches(&self, text: &str) -> bool {
		self.dfa.matches(text)
	}
}

#[cfg(test)]
mod tests {
	use quill_value::ErrorCode;

	use super::*;

	fn like(text: &str, pattern: &str) -> bool {
		Pattern::compile(pattern, None, &CancellationToken::new()).unwrap().matches(text)
	}

	#[test]
	fn test_scenarios() {
		assert!(like("abc", "a%c"));
		assert!(!like("abc", "a_b"));
		assert!(like("", ""));
		assert!(!like("a", ""));
		assert!(like("", "%"));
		assert!(!like("", "_"));
	}

	#[test]
	fn test_escape() {
		let pattern = Pattern::compile(r"100\%", Some("\\"), &CancellationToken::new()).unwrap();
		assert!(pattern.matches("100%"));
		assert!(!pattern.matches("1000"));
	}

	#[test]
	fn test_code_points() {
		assert!(like("日本語", "日_語"));
		assert!(!like("日本語", "日__語"));
	}

	#[test]
	fn test_invalid_escape() {
		let err = Pattern::compile("a", Some("xy"), &CancellationToken::new()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::LikeEscapeNotSingleCharacter);
		let err = Pattern::compile("a!b", Some("!"), &CancellationToken::new()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::LikeInvalidEscapeSequence);
	}
}
