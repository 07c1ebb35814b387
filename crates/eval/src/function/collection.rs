// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use quill_value::{Datum, GetType, Value, error, error::diagnostic::function::invalid_argument_type};

use super::{CallResult, ExprFunction, FunctionSignature};
use crate::session::Session;

/// Number of elements of a collection or fields of a struct.
pub struct Size {
	signature: FunctionSignature,
}

impl Size {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("size", 1, 1),
		}
	}
}

impl ExprFunction for Size {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
		let len = match args[0].datum() {
			Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => seq.len()?,
			Datum::Struct(value) => value.len()?,
			_ => {
				let found = args[0].get_type();
				return Err(error!(invalid_argument_type(&self.signature.name, 1, "collection or struct", found)).into());
			}
		};
		Ok(Value::int(len as i64))
	}
}

/// Whether a collection has at least one element. An unknown argument is `false`.
pub struct Exists {
	signature: FunctionSignature,
}

impl Exists {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("exists", 1, 1).propagates_unknowns(false),
		}
	}
}

impl ExprFunction for Exists {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
		let value = &args[0];
		if value.is_unknown() {
			return Ok(Value::bool(false));
		}
		if !value.is_collection() && value.as_struct().is_none() {
			return Err(error!(invalid_argument_type(&self.signature.name, 1, "collection", value.get_type())).into());
		}
		match value.children().next() {
			Some(Err(err)) => Err(err.into()),
			first => Ok(Value::bool(first.is_some())),
		}
	}
}
