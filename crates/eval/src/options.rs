// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

use quill_value::{Error, Fragment};

/// How type errors and other curated failures surface at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingMode {
	/// Errors raise.
	#[default]
	Strict,
	/// Errors whose code allows it evaluate to `MISSING`.
	Permissive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedVariableBehavior {
	#[default]
	Error,
	Missing,
}

/// Whether `MISSING` field values are kept in projected structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionIterationBehavior {
	#[default]
	FilterMissing,
	Unfiltered,
}

/// Translates a failure raised by function code outside the engine. Returning `None` leaves it an
/// internal error.
pub type ErrorHandler = Arc<dyn Fn(&(dyn std::error::Error + Send + Sync), &Fragment) -> Option<Error> + Send + Sync>;

/// Compile-time configuration, fixed for the lifetime of a compiled program.
#[derive(Clone, Default)]
pub struct CompileOptions {
	/// Default: strict
	pub typing_mode: TypingMode,
	/// Default: raise an error
	pub undefined_variable: UndefinedVariableBehavior,
	/// Default: filter missing values
	pub projection_iteration: ProjectionIterationBehavior,
	pub error_handler: Option<ErrorHandler>,
}

impl CompileOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn strict() -> Self {
		Self::new().typing_mode(TypingMode::Strict)
	}

	pub fn permissive() -> Self {
		Self::new().typing_mode(TypingMode::Permissive)
	}

	pub fn typing_mode(mut self, mode: TypingMode) -> Self {
		self.typing_mode = mode;
		self
	}

	pub fn undefined_variable(mut self, behavior: UndefinedVariableBehavior) -> Self {
		self.undefined_variable = behavior;
		self
	}

	pub fn projection_iteration(mut self, behavior: ProjectionIterationBehavior) -> Self {
		self.projection_iteration = behavior;
		self
	}

	pub fn error_handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&(dyn std::error::Error + Send + Sync), &Fragment) -> Option<Error> + Send + Sync + 'static,
	{
		self.error_handler = Some(Arc::new(handler));
		self
	}
}

impl Debug for CompileOptions {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompileOptions")
			.field("typing_mode", &self.typing_mode)
			.field("undefined_variable", &self.undefined_variable)
			.field("projection_iteration", &self.projection_iteration)
			.field("error_handler", &self.error_handler.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let options = CompileOptions::new();
		assert_eq!(options.typing_mode, TypingMode::Strict);
		assert_eq!(options.undefined_variable, UndefinedVariableBehavior::Error);
		assert_eq!(options.projection_iteration, ProjectionIterationBehavior::FilterMissing);
		assert!(options.error_handler.is_none());
	}

	#[test]
	fn test_chained_setters() {
		let options = CompileOptions::permissive()
			.undefined_variable(UndefinedVariableBehavior::Missing)
			.projection_iteration(ProjectionIterationBehavior::Unfiltered)
			.error_handler(|_, _| None);
		assert_eq!(options.typing_mode, TypingMode::Permissive);
		assert_eq!(options.undefined_variable, UndefinedVariableBehavior::Missing);
		assert_eq!(options.projection_iteration, ProjectionIterationBehavior::Unfiltered);
		assert!(format!("{:?}", options).contains("error_handler: true"));
	}
}
