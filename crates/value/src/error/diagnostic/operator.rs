// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	error::{ErrorCode, diagnostic::Diagnostic},
	fragment::Fragment,
	value::Type,
};

/// Operator received an operand of a kind it does not accept
pub fn incompatible_operand(operator: &str, found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::IncompatibleOperand,
		message: format!("Cannot apply '{}' to a value of type {}", operator, found),
		fragment: Fragment::None,
		label: Some(format!("operand of type {}", found)),
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Ordering operators require operands of comparable kinds
pub fn invalid_comparison(left: Type, right: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::InvalidComparison,
		message: format!("Cannot compare {} with {}", left, right),
		fragment: Fragment::None,
		label: None,
		help: Some("Only numbers, text, byte strings, booleans and values of the same temporal type can be ordered"
			.to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn divide_by_zero() -> Diagnostic {
	Diagnostic {
		code: ErrorCode::DivideByZero,
		message: "Division by zero".to_string(),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn modulo_by_zero() -> Diagnostic {
	Diagnostic {
		code: ErrorCode::ModuloByZero,
		message: "Modulo by zero".to_string(),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// 64-bit integer arithmetic overflowed
pub fn integer_overflow(operation: &str) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::IntegerOverflow,
		message: format!("Integer overflow in '{}'", operation),
		fragment: Fragment::None,
		label: None,
		help: Some("Cast an operand to DECIMAL to compute without a fixed width".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Result does not fit the declared integer width
pub fn integer_out_of_range(value: i64, bits: u32) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::IntegerOverflow,
		message: format!("Value {} does not fit a {}-bit integer", value, bits),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// A condition evaluated to something other than a boolean or an unknown
pub fn non_boolean_condition(context: &str, found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::NonBooleanCondition,
		message: format!("{} expects a boolean, found {}", context, found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn collection_expected(context: &str, found: Type) -> Diagnostic {
	Diagnostic {
		code: ErrorCode::CollectionExpected,
		message: format!("{} expects a LIST, SEXP or BAG, found {}", context, found),
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
