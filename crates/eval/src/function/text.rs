// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use quill_value::{Datum, Value};

use super::{CallResult, ExprFunction, FunctionSignature, text_argument};
use crate::session::Session;

/// Keeps symbols symbols and strings strings.
fn same_kind(original: &Value, text: String) -> Value {
	match original.datum() {
		Datum::Symbol(_) => Value::symbol(text),
		_ => Value::string(text),
	}
}

pub struct Upper {
	signature: FunctionSignature,
}

impl Upper {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("upper", 1, 1),
		}
	}
}

impl ExprFunction for Upper {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
		let text = text_argument(&self.signature, args, 0)?;
		Ok(same_kind(&args[0], text.to_uppercase()))
	}
}

pub struct Lower {
	signature: FunctionSignature,
}

impl Lower {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("lower", 1, 1),
		}
	}
}

impl ExprFunction for Lower {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
		let text = text_argument(&self.signature, args, 0)?;
		Ok(same_kind(&args[0], text.to_lowercase()))
	}
}

/// Length in code points.
pub struct CharLength {
	signature: FunctionSignature,
}

impl CharLength {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("char_length", 1, 1),
		}
	}
}

impl ExprFunction for CharLength {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
		let text = text_argument(&self.signature, args, 0)?;
		Ok(Value::int(text.chars().count() as i64))
	}
}
