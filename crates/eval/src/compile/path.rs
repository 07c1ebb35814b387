// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use quill_value::{
	BindingName, Bindings, GetType, Result, Type, Value,
	error::diagnostic::path::invalid_path_component,
	return_error,
	value::{FieldBindings, OrdinalBindings},
};

use super::Compiler;
use crate::{
	ast::{Expr, ExprKind, Meta, PathStep},
	environment::Environment,
	signal::Signaler,
	thunk::{PathThunk, Thunk},
};

impl Compiler {
	pub(super) fn compile_path(&mut self, meta: &Meta, root: &Expr, steps: &[PathStep]) -> Result<Thunk> {
		let root = self.compile_expr(root)?;

		// Built back to front so each step owns the rest of the path.
		let mut tail: Option<PathThunk> = None;
		let mut fans_out = false;
		for step in steps.iter().rev() {
			let step_thunk = match step {
				PathStep::Field(name) => self.compile_field_step(meta, name.clone(), tail.take()),
				PathStep::Index(index) => match literal_field(index) {
					Some(name) => self.compile_field_step(meta, name, tail.take()),
					None => self.compile_index_step(meta, index, tail.take())?,
				},
				PathStep::Wildcard => {
					let step = self.compile_fan_out(meta, Fan::Wildcard, fans_out, tail.take());
					fans_out = true;
					step
				}
				PathStep::Unpivot => {
					let step = self.compile_fan_out(meta, Fan::Unpivot, fans_out, tail.take());
					fans_out = true;
					step
				}
			};
			tail = Some(step_thunk);
		}

		Ok(self.thunk(meta, move |env| {
			let value = root.eval(env)?;
			match &tail {
				Some(steps) => steps.eval(env, value),
				None => Ok(value),
			}
		}))
	}

	fn compile_field_step(&self, meta: &Meta, name: BindingName, tail: Option<PathThunk>) -> PathThunk {
		let signaler = self.signaler();
		self.factory.path_thunk(meta, move |env, value| {
			let next = field(signaler, &value, &name)?;
			continue_path(env, &tail, next)
		})
	}

	fn compile_index_step(&mut self, meta: &Meta, index: &Expr, tail: Option<PathThunk>) -> Result<PathThunk> {
		let index = self.compile_expr(index)?;
		let signaler = self.signaler();
		Ok(self.factory.path_thunk(meta, move |env, value| {
			let index = index.eval(env)?;
			let next = if value.is_unknown() || index.is_unknown() {
				Value::missing()
			} else if let Some(ordinal) = index.as_int() {
				match value.as_facet::<OrdinalBindings>() {
					Some(elements) => elements.get(ordinal)?.unwrap_or_else(Value::missing),
					None => return_error!(invalid_path_component(value.get_type(), index.get_type())),
				}
			} else if let Some(text) = index.as_text() {
				field(signaler, &value, &BindingName::sensitive(text))?
			} else {
				return_error!(invalid_path_component(value.get_type(), index.get_type()))
			};
			continue_path(env, &tail, next)
		}))
	}

	fn compile_fan_out(&self, meta: &Meta, fan: Fan, flatten: bool, tail: Option<PathThunk>) -> PathThunk {
		self.factory.path_thunk(meta, move |env, value| {
			let mut out = Vec::new();
			for element in fan.elements(&value)? {
				let result = continue_path(env, &tail, element)?;
				if result.is_missing() {
					continue;
				}
				if flatten && result.is_collection() {
					for nested in result.children() {
						out.push(nested?);
					}
				} else {
					out.push(result);
				}
			}
			Ok(Value::bag(out))
		})
	}
}

#[derive(Debug, Clone, Copy)]
enum Fan {
	/// `[*]`: the elements of a collection.
	Wildcard,
	/// `.*`: the field values of a struct.
	Unpivot,
}

impl Fan {
	fn elements(&self, value: &Value) -> Result<Vec<Value>> {
		if value.is_missing() {
			return Ok(Vec::new());
		}
		let ranges = match self {
			Fan::Wildcard => value.is_collection(),
			Fan::Unpivot => value.as_struct().is_some(),
		};
		if !ranges {
			return Ok(vec![value.clone()]);
		}
		value.children().map(|child| child.map(Value::unnamed)).collect()
	}
}

/// A literal text index behaves as a case-sensitive field step.
fn literal_field(index: &Expr) -> Option<BindingName> {
	match &index.kind {
		ExprKind::Literal(value) => value.as_text().map(BindingName::sensitive),
		_ => None,
	}
}

fn field(signaler: Signaler, value: &Value, name: &BindingName) -> Result<Value> {
	if value.is_unknown() {
		return Ok(Value::missing());
	}
	let Some(fields) = value.as_facet::<FieldBindings>() else {
		return_error!(invalid_path_component(value.get_type(), Type::String));
	};
	match fields.get(name)? {
		Some(found) => Ok(found),
		None => signaler.missing_field(name.text()),
	}
}

fn continue_path(env: &Environment, tail: &Option<PathThunk>, value: Value) -> Result<Value> {
	match tail {
		Some(tail) => tail.eval(env, value),
		None => Ok(value),
	}
}

#[cfg(test)]
mod tests {
	use quill_value::{ErrorCode, StructOrdering};

	use super::*;
	use crate::{compile::compile, options::CompileOptions, session::Session};

	fn record() -> Expr {
		Expr::lit(Value::structure(
			StructOrdering::Ordered,
			[("a", Value::int(1)), ("b", Value::list(vec![Value::int(10), Value::int(20)]))],
		))
	}

	fn strict(expr: Expr) -> Result<Value> {
		compile(&expr, CompileOptions::strict())?.eval(&Session::standard())
	}

	fn permissive(expr: Expr) -> Result<Value> {
		compile(&expr, CompileOptions::permissive())?.eval(&Session::standard())
	}

	#[test]
	fn test_field_case_sensitivity() {
		assert_eq!(strict(Expr::path(record(), vec![PathStep::field("A")])).unwrap(), Value::int(1));
		let quoted = Expr::path(record(), vec![PathStep::quoted("A")]);
		assert_eq!(strict(quoted.clone()).unwrap_err().code(), ErrorCode::BindingDoesNotExist);
		assert!(permissive(quoted).unwrap().is_missing());
	}

	#[test]
	fn test_index_steps() {
		let second = Expr::path(record(), vec![PathStep::field("b"), PathStep::Index(Expr::lit(1i64))]);
		assert_eq!(strict(second).unwrap(), Value::int(20));
		let out_of_range = Expr::path(record(), vec![PathStep::field("b"), PathStep::Index(Expr::lit(5i64))]);
		assert!(strict(out_of_range).unwrap().is_missing());
		let by_text = Expr::path(record(), vec![PathStep::Index(Expr::lit("a"))]);
		assert_eq!(strict(by_text).unwrap(), Value::int(1));
	}

	#[test]
	fn test_invalid_components() {
		let int_on_struct = Expr::path(record(), vec![PathStep::Index(Expr::lit(0i64))]);
		assert_eq!(strict(int_on_struct.clone()).unwrap_err().code(), ErrorCode::InvalidPathComponent);
		assert!(permissive(int_on_struct).unwrap().is_missing());
		let field_on_int = Expr::path(Expr::lit(1i64), vec![PathStep::field("a")]);
		assert_eq!(strict(field_on_int).unwrap_err().code(), ErrorCode::InvalidPathComponent);
	}

	#[test]
	fn test_unknown_container_is_missing() {
		let path = Expr::path(Expr::null(), vec![PathStep::field("a"), PathStep::field("b")]);
		assert!(strict(path).unwrap().is_missing());
	}

	#[test]
	fn test_wildcard_flattens() {
		let nested = Expr::lit(Value::list(vec![
			Value::list(vec![Value::int(1), Value::int(2)]),
			Value::list(vec![Value::int(3)]),
		]));
		let path = Expr::path(nested, vec![PathStep::Wildcard, PathStep::Wildcard]);
		assert_eq!(strict(path).unwrap(), Value::bag(vec![Value::int(1), Value::int(2), Value::int(3)]));
	}

	#[test]
	fn test_wildcard_then_field_drops_missing() {
		let rows = Expr::lit(Value::bag(vec![
			Value::structure(StructOrdering::Ordered, [("a", Value::int(1))]),
			Value::structure(StructOrdering::Ordered, [("c", Value::int(2))]),
		]));
		let path = Expr::path(rows, vec![PathStep::Wildcard, PathStep::field("a")]);
		assert_eq!(permissive(path).unwrap(), Value::bag(vec![Value::int(1)]));
	}

	#[test]
	fn test_unpivot() {
		let values = strict(Expr::path(record(), vec![PathStep::Unpivot])).unwrap();
		assert_eq!(values.children().count(), 2);
		let scalar = strict(Expr::path(Expr::lit(5i64), vec![PathStep::Unpivot])).unwrap();
		assert_eq!(scalar, Value::bag(vec![Value::int(5)]));
	}
}
