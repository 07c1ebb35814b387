// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use quill_value::{
	GetType, Result, StructOrdering, Value,
	bag::{self, BagOp},
	error,
	error::diagnostic::{path::non_text_struct_field_key, query::unsupported_feature},
	return_error,
};

use super::Compiler;
use crate::{
	ast::{Expr, Meta, SetQuantifier},
	environment::Environment,
	thunk::Thunk,
};

impl Compiler {
	pub(super) fn compile_list(&mut self, meta: &Meta, items: &[Expr]) -> Result<Thunk> {
		let items = self.compile_all(items)?;
		Ok(self.thunk(meta, move |env| Ok(Value::list(evaluate(env, &items)?))))
	}

	pub(super) fn compile_sexp(&mut self, meta: &Meta, items: &[Expr]) -> Result<Thunk> {
		let items = self.compile_all(items)?;
		Ok(self.thunk(meta, move |env| Ok(Value::sexp(evaluate(env, &items)?))))
	}

	pub(super) fn compile_bag(&mut self, meta: &Meta, items: &[Expr]) -> Result<Thunk> {
		let items = self.compile_all(items)?;
		Ok(self.thunk(meta, move |env| Ok(Value::bag(evaluate(env, &items)?))))
	}

	/// Fields whose value is `MISSING` are left out.
	pub(super) fn compile_struct(&mut self, meta: &Meta, fields: &[(Expr, Expr)]) -> Result<Thunk> {
		let fields = fields
			.iter()
			.map(|(name, value)| Ok((self.compile_expr(name)?, self.compile_expr(value)?)))
			.collect::<Result<Vec<_>>>()?;
		Ok(self.thunk(meta, move |env| {
			let mut out: Vec<(Arc<str>, Value)> = Vec::with_capacity(fields.len());
			for (name, value) in &fields {
				let name = name.eval(env)?;
				let Some(text) = name.as_text() else {
					return_error!(non_text_struct_field_key(name.get_type()));
				};
				let value = value.eval(env)?;
				if value.is_missing() {
					continue;
				}
				out.push((Arc::from(text), value.unnamed()));
			}
			Ok(Value::structure(StructOrdering::Ordered, out))
		}))
	}

	pub(super) fn compile_bag_op(
		&mut self,
		meta: &Meta,
		op: BagOp,
		quantifier: SetQuantifier,
		left: &Expr,
		right: &Expr,
	) -> Result<Thunk> {
		if matches!(op, BagOp::Union | BagOp::Intersect | BagOp::Except) {
			return Err(error!(unsupported_feature(op.as_str())).with_fragment_if_absent(&meta.fragment));
		}
		let left = self.compile_expr(left)?;
		let right = self.compile_expr(right)?;
		let distinct = quantifier == SetQuantifier::Distinct;
		Ok(self.thunk(meta, move |env| bag::apply(op, distinct, &left.eval(env)?, &right.eval(env)?)))
	}
}

fn evaluate(env: &Environment, items: &[Thunk]) -> Result<Vec<Value>> {
	items.iter().map(|item| item.eval(env).map(Value::unnamed)).collect()
}

#[cfg(test)]
mod tests {
	use quill_value::{Bindings, BindingName, ErrorCode};

	use super::*;
	use crate::{compile::compile, options::CompileOptions, session::Session};

	fn strict(expr: Expr) -> Result<Value> {
		compile(&expr, CompileOptions::strict())?.eval(&Session::standard())
	}

	#[test]
	fn test_struct_drops_missing_fields() {
		let value = strict(Expr::structure(vec![("a", Expr::lit(1i64)), ("b", Expr::missing()), ("c", Expr::null())]))
			.unwrap();
		let record = value.as_struct().unwrap();
		assert_eq!(record.len().unwrap(), 2);
		assert!(record.get(&BindingName::sensitive("b")).unwrap().is_none());
		assert!(record.get(&BindingName::sensitive("c")).unwrap().unwrap().is_null());
	}

	#[test]
	fn test_struct_requires_text_keys() {
		let expr = Expr::new(crate::ast::ExprKind::Struct(vec![(Expr::lit(1i64), Expr::lit(2i64))]));
		assert_eq!(strict(expr.clone()).unwrap_err().code(), ErrorCode::NonTextStructFieldKey);
		let permissive = compile(&expr, CompileOptions::permissive()).unwrap();
		assert!(permissive.eval(&Session::standard()).unwrap().is_missing());
	}

	#[test]
	fn test_sequences() {
		let list = strict(Expr::list(vec![Expr::lit(1i64), Expr::missing()])).unwrap();
		assert_eq!(list.to_string(), "[1, MISSING]");
		let bag = strict(Expr::bag(vec![Expr::lit(2i64), Expr::lit(1i64)])).unwrap();
		assert_eq!(bag, Value::bag(vec![Value::int(1), Value::int(2)]));
	}

	#[test]
	fn test_bag_operators() {
		let left = Expr::bag(vec![Expr::lit(1i64), Expr::lit(1i64), Expr::lit(2i64)]);
		let right = Expr::bag(vec![Expr::lit(1i64)]);
		let except = |quantifier| {
			Expr::new(crate::ast::ExprKind::BagOp {
				op: BagOp::OuterExcept,
				quantifier,
				left: Box::new(left.clone()),
				right: Box::new(right.clone()),
			})
		};
		assert_eq!(strict(except(SetQuantifier::All)).unwrap().to_string(), "<<1, 2>>");

		let union = Expr::new(crate::ast::ExprKind::BagOp {
			op: BagOp::Union,
			quantifier: SetQuantifier::All,
			left: Box::new(left.clone()),
			right: Box::new(right.clone()),
		});
		assert_eq!(compile(&union, CompileOptions::new()).map(|_| ()).unwrap_err().code(), ErrorCode::UnsupportedFeature);
	}
}
