// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	panic::{AssertUnwindSafe, catch_unwind},
};

use quill_value::{
	Error, Fragment, GetType, Result, Value, error,
	error::diagnostic::{
		function::{function_failed, function_not_found, incorrect_argument_count},
		operator::collection_expected,
	},
	return_error, return_internal_error,
};
use tracing::debug;

use super::{AggregatePlan, Compiler};
use crate::{
	aggregate,
	ast::{AggregateFunc, Expr, Meta, SetQuantifier},
	function::CallError,
	options::ErrorHandler,
	thunk::Thunk,
};

/// A panic raised by function code.
#[derive(Debug, thiserror::Error)]
#[error("function panicked: {0}")]
struct Panicked(String);

impl Compiler {
	pub(super) fn compile_call(&mut self, meta: &Meta, name: &str, args: &[Expr]) -> Result<Thunk> {
		let Some(function) = self.functions.get(name) else {
			return Err(error!(function_not_found(name)).with_fragment_if_absent(&meta.fragment));
		};
		let signature = function.signature().clone();
		if args.len() < signature.min || args.len() > signature.max {
			let diagnostic = incorrect_argument_count(name, signature.min, signature.max, args.len());
			return Err(error!(diagnostic).with_fragment_if_absent(&meta.fragment));
		}

		let args = self.compile_all(args)?;
		let signaler = self.signaler();
		let handler = self.options.error_handler.clone();
		let fragment = meta.fragment.clone();
		Ok(self.thunk(meta, move |env| {
			let values = args.iter().map(|arg| arg.eval(env)).collect::<Result<Vec<_>>>()?;
			if signature.propagates_unknowns {
				if let Some(unknown) = values.iter().find(|value| value.is_unknown()) {
					return Ok(signaler.unknown(unknown));
				}
			}
			match catch_unwind(AssertUnwindSafe(|| function.call(env.session(), &values))) {
				Ok(Ok(value)) => Ok(value),
				Ok(Err(CallError::Engine(err))) => Err(err),
				Ok(Err(CallError::Foreign(cause))) => Err(foreign(&handler, &signature.name, cause.as_ref(), &fragment)),
				Err(payload) => {
					let panicked = Panicked(panic_message(payload.as_ref()));
					debug!(function = %signature.name, "{}", panicked);
					Err(foreign(&handler, &signature.name, &panicked, &fragment))
				}
			}
		}))
	}

	pub(super) fn compile_aggregate(
		&mut self,
		meta: &Meta,
		func: AggregateFunc,
		quantifier: SetQuantifier,
		arg: Option<&Expr>,
	) -> Result<Thunk> {
		let distinct = quantifier == SetQuantifier::Distinct;
		if arg.is_none() && func != AggregateFunc::Count {
			let diagnostic = incorrect_argument_count(func.as_str(), 1, 1, 0);
			return Err(error!(diagnostic).with_fragment_if_absent(&meta.fragment));
		}

		if let Some(frame) = self.aggregates.pop() {
			// The argument is evaluated per row, outside the aggregate being collected.
			let compiled = arg.map(|arg| self.compile_expr(arg)).transpose();
			self.aggregates.push(frame);
			let compiled = compiled?;

			let Some(frame) = self.aggregates.last_mut() else {
				return_internal_error!("aggregate frame vanished");
			};
			let register = frame.len();
			frame.push(AggregatePlan {
				func,
				distinct,
				count_star: compiled.is_none(),
				arg: compiled,
			});
			return Ok(self.thunk(meta, move |env| env.read_register(register)));
		}

		// Outside a query the argument is the collection to aggregate.
		let Some(arg) = arg else {
			let diagnostic = incorrect_argument_count(func.as_str(), 1, 1, 0);
			return Err(error!(diagnostic).with_fragment_if_absent(&meta.fragment));
		};
		let collection = self.compile_expr(arg)?;
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			let value = collection.eval(env)?;
			if value.is_unknown() {
				return Ok(signaler.unknown(&value));
			}
			if !value.is_collection() {
				return_error!(collection_expected(func.as_str(), value.get_type()));
			}
			let elements = value.children().collect::<Result<Vec<_>>>()?;
			aggregate::aggregate(func, distinct, &elements)
		}))
	}
}

fn foreign(
	handler: &Option<ErrorHandler>,
	function: &str,
	cause: &(dyn std::error::Error + Send + Sync),
	fragment: &Fragment,
) -> Error {
	if let Some(translated) = handler.as_ref().and_then(|handler| handler(cause, fragment)) {
		return translated;
	}
	error!(function_failed(function, &cause.to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		return message.to_string();
	}
	if let Some(message) = payload.downcast_ref::<String>() {
		return message.clone();
	}
	"unknown panic".to_string()
}

#[cfg(test)]
mod tests {
	use quill_value::{ErrorCode, error::diagnostic::operator::divide_by_zero};

	use super::*;
	use crate::{
		compile::compile,
		function::{CallResult, ExprFunction, FunctionSignature, Functions},
		options::CompileOptions,
		session::Session,
	};

	struct Faulty {
		signature: FunctionSignature,
		panics: bool,
	}

	impl ExprFunction for Faulty {
		fn signature(&self) -> &FunctionSignature {
			&self.signature
		}

		fn call(&self, _: &Session, _: &[Value]) -> CallResult<Value> {
			if self.panics {
				panic!("boom");
			}
			Err(CallError::Foreign("disk on fire".into()))
		}
	}

	fn functions() -> Functions {
		Functions::builder()
			.with_builtins()
			.with_function(Faulty {
				signature: FunctionSignature::new("fails", 0, 0),
				panics: false,
			})
			.with_function(Faulty {
				signature: FunctionSignature::new("panics", 0, 0),
				panics: true,
			})
			.build()
	}

	fn run(expr: Expr, options: CompileOptions) -> Result<Value> {
		Compiler::new(options).with_functions(functions()).compile(&expr)?.eval(&Session::standard())
	}

	#[test]
	fn test_builtin_call() {
		let upper = Expr::call("UPPER", vec![Expr::lit("abc")]);
		assert_eq!(run(upper, CompileOptions::new()).unwrap(), Value::string("ABC"));
		let unknown = Expr::call("upper", vec![Expr::missing()]);
		assert!(run(unknown, CompileOptions::permissive()).unwrap().is_missing());
	}

	#[test]
	fn test_lookup_and_arity_are_checked_at_compile_time() {
		let missing = compile(&Expr::call("nope", vec![]), CompileOptions::permissive()).map(|_| ()).unwrap_err();
		assert_eq!(missing.code(), ErrorCode::FunctionNotFound);
		let arity = compile(&Expr::call("upper", vec![]), CompileOptions::new()).map(|_| ()).unwrap_err();
		assert_eq!(arity.code(), ErrorCode::IncorrectArgumentCount);
	}

	#[test]
	fn test_argument_type_degrades_in_permissive_mode() {
		let call = Expr::call("upper", vec![Expr::lit(1i64)]);
		assert_eq!(run(call.clone(), CompileOptions::new()).unwrap_err().code(), ErrorCode::InvalidArgumentType);
		assert!(run(call, CompileOptions::permissive()).unwrap().is_missing());
	}

	#[test]
	fn test_foreign_failures_are_internal() {
		let err = run(Expr::call("fails", vec![]), CompileOptions::permissive()).unwrap_err();
		assert!(err.is_internal());
		let err = run(Expr::call("panics", vec![]), CompileOptions::permissive()).unwrap_err();
		assert!(err.is_internal());
	}

	#[test]
	fn test_error_handler_translates() {
		let options = CompileOptions::permissive().error_handler(|_, _| Some(error!(divide_by_zero())));
		assert!(run(Expr::call("fails", vec![]), options.clone()).unwrap().is_missing());
		let strict = options.typing_mode(crate::options::TypingMode::Strict);
		assert_eq!(run(Expr::call("panics", vec![]), strict).unwrap_err().code(), ErrorCode::DivideByZero);
	}

	#[test]
	fn test_aggregate_over_collection() {
		let sum = Expr::aggregate(
			AggregateFunc::Sum,
			SetQuantifier::All,
			Some(Expr::bag(vec![Expr::lit(1i64), Expr::lit(2i64), Expr::null()])),
		);
		assert_eq!(run(sum, CompileOptions::new()).unwrap(), Value::int(3));
		let count = Expr::aggregate(AggregateFunc::Count, SetQuantifier::Distinct, Some(Expr::list(vec![
			Expr::lit(1i64),
			Expr::lit(1i64),
		])));
		assert_eq!(run(count, CompileOptions::new()).unwrap(), Value::int(1));
		let scalar = Expr::aggregate(AggregateFunc::Max, SetQuantifier::All, Some(Expr::lit(1i64)));
		assert_eq!(run(scalar, CompileOptions::new()).unwrap_err().code(), ErrorCode::CollectionExpected);
	}
}
