// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

pub mod code;
pub mod diagnostic;
mod r#macro;
mod render;

pub use code::{ErrorCategory, ErrorCode, PermissiveBehavior};
pub use diagnostic::Diagnostic;
pub use render::DefaultRenderer;

use crate::fragment::Fragment;

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn code(&self) -> ErrorCode {
		self.0.code
	}

	pub fn is_internal(&self) -> bool {
		self.0.is_internal()
	}

	/// Attaches `fragment` unless a deeper node already did.
	pub fn with_fragment_if_absent(mut self, fragment: &Fragment) -> Self {
		if self.0.fragment.is_none() {
			self.0.fragment = fragment.clone();
		}
		self
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Self(diagnostic)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::diagnostic::operator;

	#[test]
	fn test_fragment_is_not_overwritten() {
		let inner = Fragment::at(2, 4);
		let outer = Fragment::at(1, 1);
		let err = Error(operator::divide_by_zero()).with_fragment_if_absent(&inner).with_fragment_if_absent(&outer);
		assert_eq!(err.fragment, inner);
	}

	#[test]
	fn test_display_renders_code() {
		let err = Error(operator::modulo_by_zero());
		let rendered = err.to_string();
		assert!(rendered.starts_with("error[OPERATOR_004]"), "{rendered}");
	}
}
