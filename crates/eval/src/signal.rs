// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Error-versus-degrade decisions of a compiled program.

use quill_value::{
	Error, GetType, Result, Value,
	error::{
		PermissiveBehavior,
		diagnostic::{binding::binding_does_not_exist, operator::non_boolean_condition},
	},
	return_error,
};

use crate::options::{CompileOptions, TypingMode, UndefinedVariableBehavior};

#[derive(Debug, Clone, Copy)]
pub struct Signaler {
	mode: TypingMode,
	undefined_variable: UndefinedVariableBehavior,
}

impl Signaler {
	pub fn new(options: &CompileOptions) -> Self {
		Self {
			mode: options.typing_mode,
			undefined_variable: options.undefined_variable,
		}
	}

	pub fn mode(&self) -> TypingMode {
		self.mode
	}

	pub fn is_permissive(&self) -> bool {
		self.mode == TypingMode::Permissive
	}

	/// Applies the permissive policy table: codes marked `ReturnMissing` become `MISSING`; internal
	/// errors and everything in strict mode raise.
	pub fn recover(&self, err: Error) -> Result<Value> {
		if self.is_permissive()
			&& !err.is_internal()
			&& err.code().permissive_behavior() == PermissiveBehavior::ReturnMissing
		{
			return Ok(Value::missing());
		}
		Err(err)
	}

	/// The unknown an operator yields after seeing the unknown operand `seen`.
	pub fn unknown(&self, seen: &Value) -> Value {
		match self.mode {
			TypingMode::Strict => Value::null(),
			TypingMode::Permissive if seen.is_missing() => Value::missing(),
			TypingMode::Permissive => Value::null(),
		}
	}

	/// Whether `value` selects a branch, row or group. Only `true` does; unknowns never do; other
	/// values raise in strict mode.
	pub fn condition(&self, value: &Value, context: &str) -> Result<bool> {
		match value.as_bool() {
			Some(b) => Ok(b),
			None if value.is_unknown() || self.is_permissive() => Ok(false),
			None => return_error!(non_boolean_condition(context, value.get_type())),
		}
	}

	/// A struct without the requested field.
	pub fn missing_field(&self, name: &str) -> Result<Value> {
		match self.mode {
			TypingMode::Strict => return_error!(binding_does_not_exist(name)),
			TypingMode::Permissive => Ok(Value::missing()),
		}
	}

	pub fn undefined_variable(&self, name: &str) -> Result<Value> {
		match self.undefined_variable {
			UndefinedVariableBehavior::Error => return_error!(binding_does_not_exist(name)),
			UndefinedVariableBehavior::Missing => Ok(Value::missing()),
		}
	}
}
