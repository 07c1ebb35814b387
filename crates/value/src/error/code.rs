// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Separates a bad query from an engine bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	User,
	Internal,
}

/// What a permissive program does when an error of a given code is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissiveBehavior {
	Raise,
	ReturnMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
	AmbiguousBinding,
	BindingDoesNotExist,
	UnboundParameter,

	IncompatibleOperand,
	InvalidComparison,
	DivideByZero,
	ModuloByZero,
	IntegerOverflow,
	NonBooleanCondition,
	CollectionExpected,

	InvalidPathComponent,
	NonTextStructFieldKey,

	LikeInvalidInputs,
	LikeInvalidEscapeSequence,
	LikeEscapeNotSingleCharacter,

	FunctionNotFound,
	IncorrectArgumentCount,
	InvalidArgumentType,

	NonIntLimit,
	NegativeLimit,
	NonIntOffset,
	NegativeOffset,
	UnsupportedFeature,

	DateFieldOutOfRange,
	TimeFieldOutOfRange,
	InvalidExternalValue,

	Interrupted,
	Internal,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::AmbiguousBinding => "BINDING_001",
			ErrorCode::BindingDoesNotExist => "BINDING_002",
			ErrorCode::UnboundParameter => "BINDING_003",
			ErrorCode::IncompatibleOperand => "OPERATOR_001",
			ErrorCode::InvalidComparison => "OPERATOR_002",
			ErrorCode::DivideByZero => "OPERATOR_003",
			ErrorCode::ModuloByZero => "OPERATOR_004",
			ErrorCode::IntegerOverflow => "OPERATOR_005",
			ErrorCode::NonBooleanCondition => "OPERATOR_006",
			ErrorCode::CollectionExpected => "OPERATOR_007",
			ErrorCode::InvalidPathComponent => "PATH_001",
			ErrorCode::NonTextStructFieldKey => "PATH_002",
			ErrorCode::LikeInvalidInputs => "LIKE_001",
			ErrorCode::LikeInvalidEscapeSequence => "LIKE_002",
			ErrorCode::LikeEscapeNotSingleCharacter => "LIKE_003",
			ErrorCode::FunctionNotFound => "FUNCTION_001",
			ErrorCode::IncorrectArgumentCount => "FUNCTION_002",
			ErrorCode::InvalidArgumentType => "FUNCTION_003",
			ErrorCode::NonIntLimit => "QUERY_001",
			ErrorCode::NegativeLimit => "QUERY_002",
			ErrorCode::NonIntOffset => "QUERY_003",
			ErrorCode::NegativeOffset => "QUERY_004",
			ErrorCode::UnsupportedFeature => "QUERY_005",
			ErrorCode::DateFieldOutOfRange => "VALUE_001",
			ErrorCode::TimeFieldOutOfRange => "VALUE_002",
			ErrorCode::InvalidExternalValue => "VALUE_003",
			ErrorCode::Interrupted => "RUNTIME_001",
			ErrorCode::Internal => "INTERNAL_ERROR",
		}
	}

	pub fn category(&self) -> ErrorCategory {
		match self {
			ErrorCode::Internal => ErrorCategory::Internal,
			_ => ErrorCategory::User,
		}
	}

	/// The permissive policy table. Codes not listed raise in both typing modes.
	pub fn permissive_behavior(&self) -> PermissiveBehavior {
		match self {
			ErrorCode::IncompatibleOperand
			| ErrorCode::InvalidComparison
			| ErrorCode::DivideByZero
			| ErrorCode::ModuloByZero
			| ErrorCode::IntegerOverflow
			| ErrorCode::NonBooleanCondition
			| ErrorCode::CollectionExpected
			| ErrorCode::InvalidPathComponent
			| ErrorCode::NonTextStructFieldKey
			| ErrorCode::LikeInvalidInputs
			| ErrorCode::LikeInvalidEscapeSequence
			| ErrorCode::LikeEscapeNotSingleCharacter
			| ErrorCode::InvalidArgumentType
			| ErrorCode::DateFieldOutOfRange
			| ErrorCode::TimeFieldOutOfRange => PermissiveBehavior::ReturnMissing,
			_ => PermissiveBehavior::Raise,
		}
	}
}

impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_internal_is_the_only_internal_category() {
		assert_eq!(ErrorCode::Internal.category(), ErrorCategory::Internal);
		assert_eq!(ErrorCode::DivideByZero.category(), ErrorCategory::User);
	}

	#[test]
	fn test_binding_errors_always_raise() {
		for code in [
			ErrorCode::AmbiguousBinding,
			ErrorCode::BindingDoesNotExist,
			ErrorCode::UnboundParameter,
			ErrorCode::UnsupportedFeature,
			ErrorCode::IncorrectArgumentCount,
			ErrorCode::Interrupted,
			ErrorCode::Internal,
		] {
			assert_eq!(code.permissive_behavior(), PermissiveBehavior::Raise, "{code}");
		}
	}

	#[test]
	fn test_operator_errors_degrade() {
		assert_eq!(ErrorCode::DivideByZero.permissive_behavior(), PermissiveBehavior::ReturnMissing);
		assert_eq!(ErrorCode::IntegerOverflow.permissive_behavior(), PermissiveBehavior::ReturnMissing);
		assert_eq!(ErrorCode::LikeInvalidEscapeSequence.permissive_behavior(), PermissiveBehavior::ReturnMissing);
	}
}
