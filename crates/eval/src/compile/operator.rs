// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering, collections::BTreeSet, sync::Arc};

use quill_pattern::Pattern;
use quill_value::{
	Datum, Error, GetType, NaturalOrder, Number, OrderedValue, Result, Type, Value, error,
	error::diagnostic::{
		like::invalid_inputs,
		operator::{collection_expected, incompatible_operand, invalid_comparison},
	},
	return_error, return_internal_error,
};

use super::Compiler;
use crate::{
	ast::{Expr, ExprKind, Meta, NaryOp, UnaryOp},
	environment::Environment,
	signal::Signaler,
	thunk::Thunk,
};

impl Compiler {
	// ─────────────────────────────────────────────────────────────────────────────
	// Unary and n-ary operators
	// ─────────────────────────────────────────────────────────────────────────────

	pub(super) fn compile_unary(&mut self, meta: &Meta, op: UnaryOp, operand: &Expr) -> Result<Thunk> {
		let operand = self.compile_expr(operand)?;
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			let value = operand.eval(env)?;
			if value.is_unknown() {
				return Ok(signaler.unknown(&value));
			}
			match op {
				UnaryOp::Not => match value.as_bool() {
					Some(b) => Ok(Value::bool(!b)),
					None => return_error!(incompatible_operand("NOT", value.get_type())),
				},
				UnaryOp::Plus => match Number::of(&value) {
					Some(_) => Ok(value.unnamed()),
					None => return_error!(incompatible_operand("+", value.get_type())),
				},
				UnaryOp::Minus => match Number::of(&value) {
					Some(n) => Ok(n.neg()?.into_value()),
					None => return_error!(incompatible_operand("-", value.get_type())),
				},
			}
		}))
	}

	pub(super) fn compile_nary(&mut self, meta: &Meta, op: NaryOp, operands: &[Expr]) -> Result<Thunk> {
		if operands.is_empty() {
			return_internal_error!("operator {} without operands", op.as_str());
		}
		let operands = self.compile_all(operands)?;
		let signaler = self.signaler();
		let thunk = match op {
			NaryOp::Add | NaryOp::Sub | NaryOp::Mul | NaryOp::Div | NaryOp::Mod => {
				self.thunk(meta, move |env| arithmetic(env, signaler, op, &operands))
			}
			NaryOp::Concat => self.thunk(meta, move |env| concat(env, signaler, &operands)),
			NaryOp::Eq | NaryOp::Ne | NaryOp::Lt | NaryOp::Le | NaryOp::Gt | NaryOp::Ge => {
				self.thunk(meta, move |env| comparison(env, signaler, op, &operands))
			}
			NaryOp::And => self.thunk(meta, move |env| logical(env, signaler, false, &operands)),
			NaryOp::Or => self.thunk(meta, move |env| logical(env, signaler, true, &operands)),
		};
		Ok(thunk)
	}

	// ─────────────────────────────────────────────────────────────────────────────
	// Predicates
	// ─────────────────────────────────────────────────────────────────────────────

	pub(super) fn compile_between(
		&mut self,
		meta: &Meta,
		value: &Expr,
		from: &Expr,
		to: &Expr,
		negated: bool,
	) -> Result<Thunk> {
		let operands = [self.compile_expr(value)?, self.compile_expr(from)?, self.compile_expr(to)?];
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			let values = match evaluate_known(env, signaler, &operands)? {
				Ok(values) => values,
				Err(unknown) => return Ok(unknown),
			};
			let inside = ordering(&values[1], &values[0])? != Ordering::Greater
				&& ordering(&values[0], &values[2])? != Ordering::Greater;
			Ok(Value::bool(inside != negated))
		}))
	}

	pub(super) fn compile_is(&mut self, meta: &Meta, value: &Expr, ty: Type, negated: bool) -> Result<Thunk> {
		let value = self.compile_expr(value)?;
		Ok(self.thunk(meta, move |env| {
			let value = value.eval(env)?;
			let is = match ty {
				Type::Null => value.is_unknown(),
				ty => value.get_type() == ty,
			};
			Ok(Value::bool(is != negated))
		}))
	}

	pub(super) fn compile_null_if(&mut self, meta: &Meta, left: &Expr, right: &Expr) -> Result<Thunk> {
		let left = self.compile_expr(left)?;
		let right = self.compile_expr(right)?;
		Ok(self.thunk(meta, move |env| {
			let l = left.eval(env)?;
			let r = right.eval(env)?;
			if !l.is_unknown() && !r.is_unknown() && NaturalOrder::default().equals(&l, &r)? {
				return Ok(Value::null());
			}
			Ok(l)
		}))
	}

	pub(super) fn compile_coalesce(&mut self, meta: &Meta, operands: &[Expr]) -> Result<Thunk> {
		let operands = self.compile_all(operands)?;
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			let mut all_missing = !operands.is_empty();
			for operand in &operands {
				let value = operand.eval(env)?;
				if !value.is_unknown() {
					return Ok(value);
				}
				all_missing &= value.is_missing();
			}
			if all_missing && signaler.is_permissive() {
				return Ok(Value::missing());
			}
			Ok(Value::null())
		}))
	}

	// ─────────────────────────────────────────────────────────────────────────────
	// CASE
	// ─────────────────────────────────────────────────────────────────────────────

	pub(super) fn compile_simple_case(
		&mut self,
		meta: &Meta,
		value: &Expr,
		branches: &[(Expr, Expr)],
		default: Option<&Expr>,
	) -> Result<Thunk> {
		let value = self.compile_expr(value)?;
		let branches = self.compile_branches(branches)?;
		let default = self.compile_default(default)?;
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			let value = value.eval(env)?;
			for (when, then) in &branches {
				let candidate = when.eval(env)?;
				let matched = if value.is_unknown() || candidate.is_unknown() {
					Value::null()
				} else {
					Value::bool(NaturalOrder::default().equals(&value, &candidate)?)
				};
				if signaler.condition(&matched, "CASE")? {
					return then.eval(env);
				}
			}
			default.eval(env)
		}))
	}

	pub(super) fn compile_searched_case(
		&mut self,
		meta: &Meta,
		branches: &[(Expr, Expr)],
		default: Option<&Expr>,
	) -> Result<Thunk> {
		let branches = self.compile_branches(branches)?;
		let default = self.compile_default(default)?;
		let signaler = self.signaler();
		Ok(self.thunk(meta, move |env| {
			for (when, then) in &branches {
				if signaler.condition(&when.eval(env)?, "CASE")? {
					return then.eval(env);
				}
			}
			default.eval(env)
		}))
	}

	fn compile_branches(&mut self, branches: &[(Expr, Expr)]) -> Result<Vec<(Thunk, Thunk)>> {
		branches.iter().map(|(when, then)| Ok((self.compile_expr(when)?, self.compile_expr(then)?))).collect()
	}

	fn compile_default(&mut self, default: Option<&Expr>) -> Result<Thunk> {
		match default {
			Some(expr) => self.compile_expr(expr),
			None => Ok(Thunk::constant(Value::null())),
		}
	}

	// ─────────────────────────────────────────────────────────────────────────────
	// IN
	// ─────────────────────────────────────────────────────────────────────────────

	pub(super) fn compile_in(&mut self, meta: &Meta, value: &Expr, collection: &Expr, negated: bool) -> Result<Thunk> {
		let needle = self.compile_expr(value)?;
		let signaler = self.signaler();

		if let Some(set) = constant_set(collection) {
			let set = Arc::new(set);
			return Ok(self.thunk(meta, move |env| {
				let value = needle.eval(env)?;
				if value.is_unknown() {
					return Ok(signaler.unknown(&value));
				}
				let found = set.contains(&OrderedValue::new(value.unnamed())?);
				Ok(Value::bool(found != negated))
			}));
		}

		let haystack = self.compile_expr(collection)?;
		Ok(self.thunk(meta, move |env| {
			let value = needle.eval(env)?;
			let collection = haystack.eval(env)?;
			if value.is_unknown() {
				return Ok(signaler.unknown(&value));
			}
			if collection.is_unknown() {
				return Ok(signaler.unknown(&collection));
			}
			if !collection.is_collection() {
				return_error!(collection_expected("IN", collection.get_type()));
			}
			let mut unknown: Option<Value> = None;
			for element in collection.children() {
				let element = element?;
				if element.is_unknown() {
					if unknown.as_ref().is_none_or(|seen| !seen.is_missing()) {
						unknown = Some(element);
					}
					continue;
				}
				if NaturalOrder::default().equals(&value, &element)? {
					return Ok(Value::bool(!negated));
				}
			}
			match unknown {
				Some(seen) => Ok(signaler.unknown(&seen)),
				None => Ok(Value::bool(negated)),
			}
		}))
	}

	// ─────────────────────────────────────────────────────────────────────────────
	// LIKE
	// ─────────────────────────────────────────────────────────────────────────────

	pub(super) fn compile_like(
		&mut self,
		meta: &Meta,
		value: &Expr,
		pattern: &Expr,
		escape: Option<&Expr>,
		negated: bool,
	) -> Result<Thunk> {
		let subject = self.compile_expr(value)?;
		let signaler = self.signaler();

		if let Some(precompiled) = self.precompile_pattern(pattern, escape) {
			return Ok(self.thunk(meta, move |env| {
				let value = subject.eval(env)?;
				if value.is_unknown() {
					return Ok(signaler.unknown(&value));
				}
				let pattern = match &precompiled {
					Ok(pattern) => pattern,
					Err(err) => return Err(err.clone()),
				};
				Ok(Value::bool(pattern.matches(like_input("value", &value)?) != negated))
			}));
		}

		let pattern = self.compile_expr(pattern)?;
		let escape = match escape {
			Some(escape) => Some(self.compile_expr(escape)?),
			None => None,
		};
		let cancel = self.cancel.clone();
		Ok(self.thunk(meta, move |env| {
			let mut operands = vec![subject.eval(env)?, pattern.eval(env)?];
			if let Some(escape) = &escape {
				operands.push(escape.eval(env)?);
			}
			if let Some(unknown) = operands.iter().find(|v| v.is_unknown()) {
				return Ok(signaler.unknown(unknown));
			}
			let text = like_input("value", &operands[0])?;
			let escape = match operands.get(2) {
				Some(escape) => Some(like_input("escape", escape)?),
				None => None,
			};
			let pattern = Pattern::compile(like_input("pattern", &operands[1])?, escape, &cancel)?;
			Ok(Value::bool(pattern.matches(text) != negated))
		}))
	}

	/// A pattern whose text and escape are literal text compiles once. Compilation errors are kept
	/// and raised on every evaluation so they pass through the typing mode like any other.
	fn precompile_pattern(&self, pattern: &Expr, escape: Option<&Expr>) -> Option<std::result::Result<Pattern, Error>> {
		let pattern = literal_text(pattern)?;
		let escape = match escape {
			Some(escape) => Some(literal_text(escape)?),
			None => None,
		};
		Some(Pattern::compile(pattern, escape, &self.cancel))
	}
}

fn literal_text(expr: &Expr) -> Option<&str> {
	match &expr.kind {
		ExprKind::Literal(value) => value.as_text(),
		_ => None,
	}
}

fn like_input<'a>(role: &str, value: &'a Value) -> Result<&'a str> {
	match value.as_text() {
		Some(text) => Ok(text),
		None => return_error!(invalid_inputs(role, value.get_type())),
	}
}

/// The right-hand side of IN as a set, when it is a literal collection free of unknowns.
fn constant_set(collection: &Expr) -> Option<BTreeSet<OrderedValue>> {
	let elements: Vec<Value> = match &collection.kind {
		ExprKind::Literal(value) if value.is_collection() => value.children().collect::<Result<_>>().ok()?,
		ExprKind::List(items) | ExprKind::Bag(items) | ExprKind::Sexp(items) => items
			.iter()
			.map(|item| match &item.kind {
				ExprKind::Literal(value) => Some(value.clone()),
				_ => None,
			})
			.collect::<Option<_>>()?,
		_ => return None,
	};
	if elements.iter().any(Value::is_unknown) {
		return None;
	}
	elements.into_iter().map(|element| OrderedValue::new(element.unnamed()).ok()).collect()
}

/// Evaluates every operand; the first unknown short-circuits to the engine's unknown.
fn evaluate_known(
	env: &Environment,
	signaler: Signaler,
	operands: &[Thunk],
) -> Result<std::result::Result<Vec<Value>, Value>> {
	let mut values = Vec::with_capacity(operands.len());
	for operand in operands {
		let value = operand.eval(env)?;
		if value.is_unknown() {
			return Ok(Err(signaler.unknown(&value)));
		}
		values.push(value);
	}
	Ok(Ok(values))
}

fn arithmetic(env: &Environment, signaler: Signaler, op: NaryOp, operands: &[Thunk]) -> Result<Value> {
	let mut acc: Option<Number> = None;
	for operand in operands {
		let value = operand.eval(env)?;
		if value.is_unknown() {
			return Ok(signaler.unknown(&value));
		}
		let Some(n) = Number::of(&value) else {
			return_error!(incompatible_operand(op.as_str(), value.get_type()));
		};
		acc = Some(match acc {
			None => n,
			Some(acc) => match op {
				NaryOp::Add => acc.add(n)?,
				NaryOp::Sub => acc.sub(n)?,
				NaryOp::Mul => acc.mul(n)?,
				NaryOp::Div => acc.div(n)?,
				NaryOp::Mod => acc.rem(n)?,
				_ => return_internal_error!("{} is not arithmetic", op.as_str()),
			},
		});
	}
	match acc {
		Some(n) => Ok(n.into_value()),
		None => return_internal_error!("operator {} without operands", op.as_str()),
	}
}

fn concat(env: &Environment, signaler: Signaler, operands: &[Thunk]) -> Result<Value> {
	let mut out = String::new();
	for operand in operands {
		let value = operand.eval(env)?;
		if value.is_unknown() {
			return Ok(signaler.unknown(&value));
		}
		match value.as_text() {
			Some(text) => out.push_str(text),
			None => return_error!(incompatible_operand("||", value.get_type())),
		}
	}
	Ok(Value::string(out))
}

/// Adjacent operands are compared pairwise; every pair must hold.
fn comparison(env: &Environment, signaler: Signaler, op: NaryOp, operands: &[Thunk]) -> Result<Value> {
	let values = match evaluate_known(env, signaler, operands)? {
		Ok(values) => values,
		Err(unknown) => return Ok(unknown),
	};
	for pair in values.windows(2) {
		let (l, r) = (&pair[0], &pair[1]);
		let holds = match op {
			NaryOp::Eq => NaturalOrder::default().equals(l, r)?,
			NaryOp::Ne => !NaturalOrder::default().equals(l, r)?,
			NaryOp::Lt => ordering(l, r)? == Ordering::Less,
			NaryOp::Le => ordering(l, r)? != Ordering::Greater,
			NaryOp::Gt => ordering(l, r)? == Ordering::Greater,
			NaryOp::Ge => ordering(l, r)? != Ordering::Less,
			_ => return_internal_error!("{} is not a comparison", op.as_str()),
		};
		if !holds {
			return Ok(Value::bool(false));
		}
	}
	Ok(Value::bool(true))
}

/// AND when `decisive` is false, OR when it is true. A non-boolean operand raises in strict mode and
/// counts as `MISSING` in permissive mode.
fn logical(env: &Environment, signaler: Signaler, decisive: bool, operands: &[Thunk]) -> Result<Value> {
	let mut unknown: Option<Value> = None;
	for operand in operands {
		let value = operand.eval(env)?;
		match value.as_bool() {
			Some(b) if b == decisive => return Ok(Value::bool(decisive)),
			Some(_) => {}
			None => {
				let seen = if value.is_unknown() {
					value
				} else if signaler.is_permissive() {
					Value::missing()
				} else {
					return_error!(incompatible_operand(if decisive { "OR" } else { "AND" }, value.get_type()));
				};
				if unknown.as_ref().is_none_or(|u| !u.is_missing()) {
					unknown = Some(seen);
				}
			}
		}
	}
	match unknown {
		Some(seen) => Ok(signaler.unknown(&seen)),
		None => Ok(Value::bool(!decisive)),
	}
}

/// Ordering for `<`, `<=`, `>`, `>=` and BETWEEN. Only numbers, text, lobs and equal scalar kinds
/// compare.
fn ordering(l: &Value, r: &Value) -> Result<Ordering> {
	let (lt, rt) = (l.get_type(), r.get_type());
	let comparable = (lt.is_number() && rt.is_number())
		|| (lt.is_text() && rt.is_text())
		|| (lt.is_lob() && rt.is_lob())
		|| (lt == rt && matches!(l.datum(), Datum::Bool(_) | Datum::Date(_) | Datum::Time(_) | Datum::Timestamp(_)));
	if !comparable {
		return Err(error!(invalid_comparison(lt, rt)));
	}
	NaturalOrder::default().compare(l, r)
}
