// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compilation of the expression tree into nested [`Thunk`] closures.
//!
//! Every node is compiled exactly once. Static decisions (literal LIKE patterns, constant IN sets,
//! function lookup and arity) are made here so evaluation only runs closures.

use std::sync::Arc;

use quill_value::{BindingName, Bindings, CancellationToken, Result, Time, Value};
use tracing::{debug, instrument};

use crate::{
	aggregate::Accumulator,
	ast::{AggregateFunc, Expr, ExprKind, Meta, VariableScope},
	environment::Environment,
	function::Functions,
	options::CompileOptions,
	session::Session,
	signal::Signaler,
	thunk::{Thunk, ThunkFactory},
};

mod call;
mod collection;
mod operator;
mod path;
mod select;

/// A compiled expression, evaluated against a [`Session`].
#[derive(Clone)]
pub struct Expression {
	thunk: Thunk,
}

impl Expression {
	pub fn eval(&self, session: &Session) -> Result<Value> {
		self.eval_in(&Environment::new(Arc::new(session.clone())))
	}

	pub fn eval_in(&self, env: &Environment) -> Result<Value> {
		self.thunk.eval(env)
	}
}

/// Aggregate call collected while compiling a query's projection, HAVING and ORDER BY.
pub(crate) struct AggregatePlan {
	pub func: AggregateFunc,
	pub distinct: bool,
	pub count_star: bool,
	pub arg: Option<Thunk>,
}

impl AggregatePlan {
	pub fn accumulator(&self) -> Box<dyn Accumulator> {
		crate::aggregate::accumulator(self.func, self.distinct, self.count_star)
	}
}

pub struct Compiler {
	options: Arc<CompileOptions>,
	functions: Functions,
	cancel: CancellationToken,
	factory: ThunkFactory,
	/// One frame per enclosing query whose aggregates are currently being collected.
	aggregates: Vec<Vec<AggregatePlan>>,
}

impl Compiler {
	pub fn new(options: CompileOptions) -> Self {
		let factory = ThunkFactory::new(Signaler::new(&options));
		Self {
			options: Arc::new(options),
			functions: Functions::builtins(),
			cancel: CancellationToken::new(),
			factory,
			aggregates: Vec::new(),
		}
	}

	pub fn with_functions(mut self, functions: Functions) -> Self {
		self.functions = functions;
		self
	}

	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn options(&self) -> &CompileOptions {
		&self.options
	}

	#[instrument(name = "eval::compile::expression", level = "debug", skip_all)]
	pub fn compile(&mut self, expr: &Expr) -> Result<Expression> {
		self.aggregates.clear();
		let thunk = self.compile_expr(expr)?;
		Ok(Expression {
			thunk,
		})
	}

	pub(crate) fn signaler(&self) -> Signaler {
		self.factory.signaler()
	}

	pub(crate) fn thunk<F>(&self, meta: &Meta, f: F) -> Thunk
	where
		F: Fn(&Environment) -> Result<Value> + Send + Sync + 'static,
	{
		self.factory.thunk(meta, f)
	}

	pub(crate) fn compile_expr(&mut self, expr: &Expr) -> Result<Thunk> {
		if self.cancel.is_cancelled() {
			debug!("compilation cancelled");
		}
		self.cancel.check("compilation")?;

		let meta = &expr.meta;
		match &expr.kind {
			ExprKind::Literal(value) => Ok(self.compile_literal(meta, value.clone())),
			ExprKind::Time {
				time,
				with_time_zone,
			} => Ok(self.compile_time(meta, *time, *with_time_zone)),
			ExprKind::Variable {
				name,
				case,
				scope,
			} => Ok(self.compile_variable(meta, BindingName::new(name.as_str(), *case), *scope)),
			ExprKind::Parameter(ordinal) => Ok(self.compile_parameter(meta, *ordinal)),
			ExprKind::Unary {
				op,
				operand,
			} => self.compile_unary(meta, *op, operand),
			ExprKind::Nary {
				op,
				operands,
			} => self.compile_nary(meta, *op, operands),
			ExprKind::Between {
				value,
				from,
				to,
				negated,
			} => self.compile_between(meta, value, from, to, *negated),
			ExprKind::Is {
				value,
				ty,
				negated,
			} => self.compile_is(meta, value, *ty, *negated),
			ExprKind::Like {
				value,
				pattern,
				escape,
				negated,
			} => self.compile_like(meta, value, pattern, escape.as_deref(), *negated),
			ExprKind::In {
				value,
				collection,
				negated,
			} => self.compile_in(meta, value, collection, *negated),
			ExprKind::NullIf(left, right) => self.compile_null_if(meta, left, right),
			ExprKind::Coalesce(operands) => self.compile_coalesce(meta, operands),
			ExprKind::SimpleCase {
				value,
				branches,
				default,
			} => self.compile_simple_case(meta, value, branches, default.as_deref()),
			ExprKind::SearchedCase {
				branches,
				default,
			} => self.compile_searched_case(meta, branches, default.as_deref()),
			ExprKind::Path {
				root,
				steps,
			} => self.compile_path(meta, root, steps),
			ExprKind::List(items) => self.compile_list(meta, items),
			ExprKind::Sexp(items) => self.compile_sexp(meta, items),
			ExprKind::Bag(items) => self.compile_bag(meta, items),
			ExprKind::Struct(fields) => self.compile_struct(meta, fields),
			ExprKind::Call {
				name,
				args,
			} => self.compile_call(meta, name, args),
			ExprKind::Aggregate {
				func,
				quantifier,
				arg,
			} => self.compile_aggregate(meta, *func, *quantifier, arg.as_deref()),
			ExprKind::BagOp {
				op,
				quantifier,
				left,
				right,
			} => self.compile_bag_op(meta, *op, *quantifier, left, right),
			ExprKind::Select(select) => self.compile_select(meta, select),
		}
	}

	pub(crate) fn compile_all(&mut self, exprs: &[Expr]) -> Result<Vec<Thunk>> {
		exprs.iter().map(|expr| self.compile_expr(expr)).collect()
	}

	// ─────────────────────────────────────────────────────────────────────────────
	// Leaves
	// ─────────────────────────────────────────────────────────────────────────────

	fn compile_literal(&self, meta: &Meta, value: Value) -> Thunk {
		self.thunk(meta, move |_| Ok(value.clone()))
	}

	fn compile_time(&self, meta: &Meta, time: Time, with_time_zone: bool) -> Thunk {
		if !with_time_zone || time.offset().is_some() {
			return self.compile_literal(meta, Value::time(time));
		}
		self.thunk(meta, move |env| Ok(Value::time(time.with_offset(env.session().default_offset()))))
	}

	fn compile_variable(&self, meta: &Meta, name: BindingName, scope: VariableScope) -> Thunk {
		let signaler = self.signaler();
		self.thunk(meta, move |env| {
			let found = match scope {
				VariableScope::Unqualified => env.current().get(&name)?,
				VariableScope::LocalsFirst => env.lexical().get(&name)?,
			};
			match found {
				Some(value) => Ok(value),
				None => signaler.undefined_variable(name.text()),
			}
		})
	}

	fn compile_parameter(&self, meta: &Meta, ordinal: usize) -> Thunk {
		self.thunk(meta, move |env| env.session().parameter(ordinal))
	}
}

/// Compiles `expr` against the builtin functions.
pub fn compile(expr: &Expr, options: CompileOptions) -> Result<Expression> {
	Compiler::new(options).compile(expr)
}

#[cfg(test)]
mod tests {
	use chrono::FixedOffset;
	use quill_value::{Datum, ErrorCode, binding::MapBindings};

	use super::*;
	use crate::options::UndefinedVariableBehavior;

	fn session() -> Session {
		let globals: MapBindings = [("x", Value::int(7))].into_iter().collect();
		Session::builder().globals(Arc::new(globals)).parameter(Value::string("p")).build()
	}

	#[test]
	fn test_literal_and_parameter() {
		let expr = compile(&Expr::lit(3i64), CompileOptions::new()).unwrap();
		assert_eq!(expr.eval(&session()).unwrap(), Value::int(3));
		let param = compile(&Expr::param(1), CompileOptions::new()).unwrap();
		assert_eq!(param.eval(&session()).unwrap(), Value::string("p"));
		let unbound = compile(&Expr::param(2), CompileOptions::permissive()).unwrap();
		assert_eq!(unbound.eval(&session()).unwrap_err().code(), ErrorCode::UnboundParameter);
	}

	#[test]
	fn test_variables() {
		let expr = compile(&Expr::var("X"), CompileOptions::new()).unwrap();
		assert_eq!(expr.eval(&session()).unwrap(), Value::int(7));

		let undefined = compile(&Expr::var("y"), CompileOptions::new()).unwrap();
		assert_eq!(undefined.eval(&session()).unwrap_err().code(), ErrorCode::BindingDoesNotExist);

		let options = CompileOptions::new().undefined_variable(UndefinedVariableBehavior::Missing);
		assert!(compile(&Expr::var("y"), options).unwrap().eval(&session()).unwrap().is_missing());
	}

	#[test]
	fn test_zoned_time_takes_session_offset() {
		let time = Time::new(10, 30, 0, 0, 0, None).unwrap();
		let expr = Expr::new(ExprKind::Time {
			time,
			with_time_zone: true,
		});
		let offset = FixedOffset::east_opt(3600).unwrap();
		let session = Session::builder().default_offset(offset).build();
		let value = compile(&expr, CompileOptions::new()).unwrap().eval(&session).unwrap();
		match value.datum() {
			Datum::Time(time) => assert_eq!(time.offset(), Some(offset)),
			_ => panic!("expected a time"),
		}
	}

	#[test]
	fn test_cancelled_compilation() {
		let cancel = CancellationToken::new();
		cancel.cancel();
		let err = Compiler::new(CompileOptions::new())
			.with_cancellation(cancel)
			.compile(&Expr::lit(1i64))
			.map(|_| ())
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::Interrupted);
	}
}
