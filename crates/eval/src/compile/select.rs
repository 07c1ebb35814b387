// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Queries.
//!
//! A query compiles into a [`SelectPlan`]. Ungrouped, unordered queries produce a lazy bag that
//! re-runs the plan on every iteration; grouped or ordered queries are evaluated eagerly.

use std::{cmp::Ordering, collections::BTreeSet, sync::Arc};

use quill_value::{
	Error, Fragment, GetType, NaturalOrder, OrderedValue, Result, SeqIter, Sequence, StructOrdering, Value, bag,
	binding::MapBindings,
	error,
	error::diagnostic::query::{negative_limit, negative_offset, non_int_limit, non_int_offset, unsupported_feature},
	return_error,
	value::OrdinalBindings,
};
use tracing::instrument;

use super::{AggregatePlan, Compiler};
use crate::{
	ast::{Expr, FromSource, JoinKind, Meta, ProjectItem, Projection, Select, SetQuantifier, SortOrder},
	environment::{CurrentMode, Environment, Group},
	options::ProjectionIterationBehavior,
	signal::Signaler,
	thunk::Thunk,
};

/// Variable bindings produced by FROM, LET and grouping, in binding order.
type Row = Vec<(Arc<str>, Value)>;

type RowIter = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// A row that passed WHERE, with the environment its expressions evaluate in.
type Context = (Environment, Row);

type ContextIter = Box<dyn Iterator<Item = Result<Context>> + Send>;

pub(crate) struct SelectPlan {
	distinct: bool,
	from: FromPlan,
	lets: Vec<(Thunk, Arc<str>)>,
	filter: Option<Thunk>,
	group: Option<GroupPlan>,
	aggregates: Vec<AggregatePlan>,
	having: Option<Thunk>,
	projection: ProjectionPlan,
	order_by: Vec<SortPlan>,
	limit: Option<Thunk>,
	offset: Option<Thunk>,
	signaler: Signaler,
	projection_iteration: ProjectionIterationBehavior,
	/// Attached to errors raised while a streamed result is consumed.
	fragment: Fragment,
}

struct GroupPlan {
	keys: Vec<(Thunk, Arc<str>)>,
	group_as: Option<Arc<str>>,
}

struct SortPlan {
	key: Thunk,
	descending: bool,
	nulls_first: bool,
}

enum ProjectionPlan {
	Value(Thunk),
	Items(Vec<ItemPlan>),
	Star,
}

enum ItemPlan {
	Expr {
		thunk: Thunk,
		name: Arc<str>,
	},
	/// `x.*`; a non-struct value is projected under `name`.
	All {
		thunk: Thunk,
		name: Arc<str>,
	},
}

enum FromPlan {
	Scan {
		expr: Thunk,
		alias: Arc<str>,
		at: Option<Arc<str>>,
		by: Option<Arc<str>>,
	},
	Unpivot {
		expr: Thunk,
		alias: Arc<str>,
		at: Option<Arc<str>>,
	},
	/// Lateral: the right side is evaluated once per left row, with the left row in scope.
	Join {
		outer: bool,
		left: Box<FromPlan>,
		right: Arc<FromPlan>,
		condition: Option<Thunk>,
		right_aliases: Vec<Arc<str>>,
	},
}

impl Compiler {
	#[instrument(name = "eval::compile::select", level = "debug", skip_all)]
	pub(super) fn compile_select(&mut self, meta: &Meta, select: &Select) -> Result<Thunk> {
		// Aggregates of an enclosing query never bind inside this one.
		let outer = std::mem::take(&mut self.aggregates);
		let plan = self.compile_select_plan(meta, select);
		self.aggregates = outer;

		let plan = Arc::new(plan?);
		Ok(self.thunk(meta, move |env| plan.evaluate(env)))
	}

	fn compile_select_plan(&mut self, meta: &Meta, select: &Select) -> Result<SelectPlan> {
		let from = self.compile_from(meta, &select.from, &mut 0)?;
		let lets = select
			.lets
			.iter()
			.map(|(expr, name)| Ok((self.compile_expr(expr)?, Arc::from(name.as_str()))))
			.collect::<Result<Vec<_>>>()?;
		let filter = select.filter.as_ref().map(|expr| self.compile_expr(expr)).transpose()?;
		let group = match &select.group_by {
			Some(group_by) => {
				let keys = group_by
					.keys
					.iter()
					.enumerate()
					.map(|(index, (expr, alias))| {
						Ok((self.compile_expr(expr)?, column_name(alias.as_deref(), expr, index)))
					})
					.collect::<Result<Vec<_>>>()?;
				Some(GroupPlan {
					keys,
					group_as: group_by.group_as.as_deref().map(Arc::from),
				})
			}
			None => None,
		};

		self.aggregates.push(Vec::new());
		let clauses = self.compile_aggregating_clauses(select);
		let aggregates = self.aggregates.pop().unwrap_or_default();
		let (having, projection, order_by) = clauses?;

		let limit = select.limit.as_ref().map(|expr| self.compile_expr(expr)).transpose()?;
		let offset = select.offset.as_ref().map(|expr| self.compile_expr(expr)).transpose()?;

		Ok(SelectPlan {
			distinct: select.quantifier == SetQuantifier::Distinct,
			from,
			lets,
			filter,
			group,
			aggregates,
			having,
			projection,
			order_by,
			limit,
			offset,
			signaler: self.signaler(),
			projection_iteration: self.options.projection_iteration,
			fragment: meta.fragment.clone(),
		})
	}

	/// HAVING, the projection and ORDER BY: the clauses evaluated once per group.
	fn compile_aggregating_clauses(
		&mut self,
		select: &Select,
	) -> Result<(Option<Thunk>, ProjectionPlan, Vec<SortPlan>)> {
		let having = select.having.as_ref().map(|expr| self.compile_expr(expr)).transpose()?;
		let projection = self.compile_projection(&select.projection)?;
		let order_by = select
			.order_by
			.iter()
			.map(|spec| {
				Ok(SortPlan {
					key: self.compile_expr(&spec.expr)?,
					descending: spec.order == SortOrder::Desc,
					nulls_first: spec.nulls_first(),
				})
			})
			.collect::<Result<Vec<_>>>()?;
		Ok((having, projection, order_by))
	}

	fn compile_projection(&mut self, projection: &Projection) -> Result<ProjectionPlan> {
		match projection {
			Projection::Value(expr) => Ok(ProjectionPlan::Value(self.compile_expr(expr)?)),
			Projection::Star => Ok(ProjectionPlan::Star),
			Projection::List(items) => items
				.iter()
				.enumerate()
				.map(|(index, item)| match item {
					ProjectItem::Expr {
						expr,
						alias,
					} => Ok(ItemPlan::Expr {
						thunk: self.compile_expr(expr)?,
						name: column_name(alias.as_deref(), expr, index),
					}),
					ProjectItem::All(expr) => Ok(ItemPlan::All {
						thunk: self.compile_expr(expr)?,
						name: column_name(None, expr, index),
					}),
				})
				.collect::<Result<Vec<_>>>()
				.map(ProjectionPlan::Items),
		}
	}

	fn compile_from(&mut self, meta: &Meta, source: &FromSource, position: &mut usize) -> Result<FromPlan> {
		match source {
			FromSource::Scan {
				expr,
				alias,
				at,
				by,
			} => {
				*position += 1;
				Ok(FromPlan::Scan {
					alias: column_name(alias.as_deref(), expr, *position - 1),
					expr: self.compile_expr(expr)?,
					at: at.as_deref().map(Arc::from),
					by: by.as_deref().map(Arc::from),
				})
			}
			FromSource::Unpivot {
				expr,
				alias,
				at,
			} => {
				*position += 1;
				Ok(FromPlan::Unpivot {
					alias: column_name(alias.as_deref(), expr, *position - 1),
					expr: self.compile_expr(expr)?,
					at: at.as_deref().map(Arc::from),
				})
			}
			FromSource::Join {
				kind,
				left,
				right,
				condition,
			} => {
				let outer = match kind {
					JoinKind::Inner => false,
					JoinKind::Left => true,
					JoinKind::Right => {
						return Err(error!(unsupported_feature("RIGHT JOIN")).with_fragment_if_absent(&meta.fragment));
					}
					JoinKind::Full => {
						return Err(error!(unsupported_feature("FULL JOIN")).with_fragment_if_absent(&meta.fragment));
					}
				};
				let left = self.compile_from(meta, left, position)?;
				let right = self.compile_from(meta, right, position)?;
				let condition = condition.as_ref().map(|expr| self.compile_expr(expr)).transpose()?;
				let right_aliases = right.aliases();
				Ok(FromPlan::Join {
					outer,
					left: Box::new(left),
					right: Arc::new(right),
					condition,
					right_aliases,
				})
			}
		}
	}
}

/// Explicit alias, else the name the expression derives, else `_<position>`.
fn column_name(alias: Option<&str>, expr: &Expr, index: usize) -> Arc<str> {
	match alias.or_else(|| expr.derived_name()) {
		Some(name) => Arc::from(name),
		None => Arc::from(format!("_{}", index + 1)),
	}
}

fn row_bindings(row: &Row) -> MapBindings {
	row.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
}

fn bind(env: &Environment, row: &Row) -> Environment {
	env.nest(Arc::new(row_bindings(row)), CurrentMode::Locals)
}

impl SelectPlan {
	fn evaluate(self: &Arc<Self>, env: &Environment) -> Result<Value> {
		let env = env.nest_query();
		let offset = self.bound(&env, self.offset.as_ref(), Bound::Offset)?.unwrap_or(0);
		let limit = self.bound(&env, self.limit.as_ref(), Bound::Limit)?;

		let grouped = self.group.is_some() || !self.aggregates.is_empty();
		if !grouped && self.order_by.is_empty() {
			return Ok(self.stream(env, offset, limit));
		}

		let rows = self.rows(&env)?;
		let contexts = if grouped {
			self.group(&env, rows)?
		} else {
			rows.collect::<Result<Vec<_>>>()?
		};
		let contexts = self.sort(contexts)?;

		let mut seen = BTreeSet::new();
		let mut out = Vec::new();
		for (context, row) in &contexts {
			let value = self.project(context, row)?;
			if self.distinct && !seen.insert(OrderedValue::new(value.clone())?) {
				continue;
			}
			out.push(value);
		}
		let out: Vec<Value> = out.into_iter().skip(offset).take(limit.unwrap_or(usize::MAX)).collect();
		if self.order_by.is_empty() {
			Ok(Value::bag(out))
		} else {
			Ok(Value::list(out))
		}
	}

	fn stream(self: &Arc<Self>, env: Environment, offset: usize, limit: Option<usize>) -> Value {
		let plan = self.clone();
		let projected = Sequence::lazy(move || -> SeqIter {
			let project = plan.clone();
			match plan.rows(&env) {
				Ok(rows) => Box::new(rows.map(move |context| {
					match context.and_then(|(context, row)| project.project(&context, &row)) {
						Ok(value) => Ok(value),
						Err(err) => project.settle(err),
					}
				})),
				Err(err) => Box::new(std::iter::once(plan.settle(err))),
			}
		});
		let values = if self.distinct {
			bag::distinct(projected)
		} else {
			projected
		};
		if offset == 0 && limit.is_none() {
			return Value::bag_of(values);
		}
		let limit = limit.unwrap_or(usize::MAX);
		Value::bag_of(Sequence::lazy(move || -> SeqIter { Box::new(values.iter().skip(offset).take(limit)) }))
	}

	/// Errors surfacing after `evaluate` returned get the same treatment the node's thunk gives.
	fn settle(&self, err: Error) -> Result<Value> {
		self.signaler.recover(err.with_fragment_if_absent(&self.fragment))
	}

	/// FROM rows after LET and WHERE.
	fn rows(self: &Arc<Self>, env: &Environment) -> Result<ContextIter> {
		let source = self.from.rows(env, self.signaler)?;
		let plan = self.clone();
		let env = env.clone();
		Ok(Box::new(source.filter_map(move |row| match row.and_then(|row| plan.bind_row(&env, row)) {
			Ok(Some(context)) => Some(Ok(context)),
			Ok(None) => None,
			Err(err) => Some(Err(err)),
		})))
	}

	fn bind_row(&self, env: &Environment, mut row: Row) -> Result<Option<Context>> {
		let mut bindings = Arc::new(row_bindings(&row));
		for (expr, name) in &self.lets {
			let value = expr.eval(&env.nest(bindings.clone(), CurrentMode::Locals))?.unnamed();
			Arc::make_mut(&mut bindings).insert(name.to_string(), value.clone());
			row.push((name.clone(), value));
		}
		let context = env.nest(bindings, CurrentMode::Locals);
		if let Some(filter) = &self.filter {
			if !self.signaler.condition(&filter.eval(&context)?, "WHERE")? {
				return Ok(None);
			}
		}
		Ok(Some((context, row)))
	}

	fn new_group(&self, key: Vec<Value>) -> Group {
		let aliases = self.group.iter().flat_map(|group| group.keys.iter().map(|(_, alias)| alias.clone()));
		Group {
			key: aliases.zip(key).collect(),
			members: Vec::new(),
			registers: self.aggregates.iter().map(AggregatePlan::accumulator).collect(),
		}
	}

	/// Folds rows into groups and returns one context per group that passes HAVING.
	fn group(&self, env: &Environment, rows: ContextIter) -> Result<Vec<Context>> {
		let group_as = self.group.as_ref().and_then(|group| group.group_as.clone());
		if self.group.is_none() {
			// Aggregates without GROUP BY form one group, even over no rows.
			env.groups().lock().insert(OrderedValue::new(Value::list(vec![]))?, self.new_group(vec![]));
		}

		for context in rows {
			let (context, row) = context?;
			let key = match &self.group {
				Some(group) => group
					.keys
					.iter()
					.map(|(key, _)| key.eval(&context).map(Value::unnamed))
					.collect::<Result<Vec<_>>>()?,
				None => vec![],
			};
			let inputs = self
				.aggregates
				.iter()
				.map(|plan| match &plan.arg {
					Some(arg) => arg.eval(&context),
					None => Ok(Value::null()),
				})
				.collect::<Result<Vec<_>>>()?;
			let member = group_as.as_ref().map(|_| Value::structure(StructOrdering::Ordered, row));

			let ordered = OrderedValue::new(Value::list(key.clone()))?;
			let mut groups = env.groups().lock();
			let group = groups.entry(ordered).or_insert_with(|| self.new_group(key));
			for (register, input) in group.registers.iter_mut().zip(&inputs) {
				register.accumulate(input)?;
			}
			if let Some(member) = member {
				group.members.push(member);
			}
		}

		let bindings = {
			let groups = env.groups().lock();
			groups
				.iter()
				.map(|(key, group)| {
					let mut row = group.key.clone();
					if let Some(name) = &group_as {
						row.push((name.clone(), Value::bag(group.members.clone())));
					}
					(key.clone(), row)
				})
				.collect::<Vec<_>>()
		};

		let mut out = Vec::with_capacity(bindings.len());
		for (key, row) in bindings {
			let context = bind(&env.with_group(key), &row);
			if let Some(having) = &self.having {
				if !self.signaler.condition(&having.eval(&context)?, "HAVING")? {
					continue;
				}
			}
			out.push((context, row));
		}
		Ok(out)
	}

	fn sort(&self, contexts: Vec<Context>) -> Result<Vec<Context>> {
		if self.order_by.is_empty() {
			return Ok(contexts);
		}
		let mut keyed = Vec::with_capacity(contexts.len());
		for (context, row) in contexts {
			let keys = self
				.order_by
				.iter()
				.map(|spec| {
					let value = spec.key.eval(&context)?;
					value.force()?;
					Ok(value)
				})
				.collect::<Result<Vec<_>>>()?;
			keyed.push((keys, (context, row)));
		}
		keyed.sort_by(|(l, _), (r, _)| compare_keys(&self.order_by, l, r));
		Ok(keyed.into_iter().map(|(_, context)| context).collect())
	}

	fn project(&self, env: &Environment, row: &Row) -> Result<Value> {
		let mut fields: Row = Vec::new();
		match &self.projection {
			ProjectionPlan::Value(thunk) => return thunk.eval(env),
			ProjectionPlan::Items(items) => {
				for item in items {
					match item {
						ItemPlan::Expr {
							thunk,
							name,
						} => self.push_field(&mut fields, name.clone(), thunk.eval(env)?),
						ItemPlan::All {
							thunk,
							name,
						} => self.merge_fields(&mut fields, name, thunk.eval(env)?)?,
					}
				}
			}
			ProjectionPlan::Star => {
				for (name, value) in row {
					self.merge_fields(&mut fields, name, value.clone())?;
				}
			}
		}
		Ok(Value::structure(StructOrdering::Ordered, fields))
	}

	fn merge_fields(&self, fields: &mut Row, name: &Arc<str>, value: Value) -> Result<()> {
		match value.as_struct() {
			Some(record) => {
				for (field, value) in record.pairs()? {
					self.push_field(fields, field, value);
				}
			}
			None => self.push_field(fields, name.clone(), value),
		}
		Ok(())
	}

	fn push_field(&self, fields: &mut Row, name: Arc<str>, value: Value) {
		if value.is_missing() && self.projection_iteration == ProjectionIterationBehavior::FilterMissing {
			return;
		}
		fields.push((name, value.unnamed()));
	}

	fn bound(&self, env: &Environment, thunk: Option<&Thunk>, bound: Bound) -> Result<Option<usize>> {
		let Some(thunk) = thunk else {
			return Ok(None);
		};
		let value = thunk.eval(env)?;
		let Some(n) = value.as_int() else {
			match bound {
				Bound::Limit => return_error!(non_int_limit(value.get_type())),
				Bound::Offset => return_error!(non_int_offset(value.get_type())),
			}
		};
		if n < 0 {
			match bound {
				Bound::Limit => return_error!(negative_limit(n)),
				Bound::Offset => return_error!(negative_offset(n)),
			}
		}
		Ok(Some(usize::try_from(n).unwrap_or(usize::MAX)))
	}
}

#[derive(Debug, Clone, Copy)]
enum Bound {
	Limit,
	Offset,
}

/// Unknowns are placed by NULLS FIRST/LAST regardless of direction; DESC reverses known values only.
fn compare_keys(specs: &[SortPlan], left: &[Value], right: &[Value]) -> Ordering {
	for (spec, (l, r)) in specs.iter().zip(left.iter().zip(right)) {
		let ordering = match (l.is_unknown(), r.is_unknown()) {
			(true, true) => NaturalOrder::default().compare(l, r).unwrap_or(Ordering::Equal),
			(true, false) if spec.nulls_first => Ordering::Less,
			(true, false) => Ordering::Greater,
			(false, true) if spec.nulls_first => Ordering::Greater,
			(false, true) => Ordering::Less,
			(false, false) => {
				let ordering = NaturalOrder::default().compare(l, r).unwrap_or(Ordering::Equal);
				if spec.descending {
					ordering.reverse()
				} else {
					ordering
				}
			}
		};
		if ordering != Ordering::Equal {
			return ordering;
		}
	}
	Ordering::Equal
}

impl FromPlan {
	fn aliases(&self) -> Vec<Arc<str>> {
		match self {
			FromPlan::Scan {
				alias,
				at,
				by,
				..
			} => std::iter::once(alias).chain(at).chain(by).cloned().collect(),
			FromPlan::Unpivot {
				alias,
				at,
				..
			} => std::iter::once(alias).chain(at).cloned().collect(),
			FromPlan::Join {
				left,
				right,
				..
			} => {
				let mut aliases = left.aliases();
				aliases.extend(right.aliases());
				aliases
			}
		}
	}

	/// Sources resolve global names before local ones.
	fn rows(&self, env: &Environment, signaler: Signaler) -> Result<RowIter> {
		match self {
			FromPlan::Scan {
				expr,
				alias,
				at,
				by,
			} => {
				let value = expr.eval(&env.with_mode(CurrentMode::GlobalsThenLocals))?;
				let (alias, at, by) = (alias.clone(), at.clone(), by.clone());
				if !value.is_collection() {
					return Ok(Box::new(std::iter::once(Ok(scan_row(&alias, &at, &by, value, Value::missing())))));
				}
				let ordered = value.as_facet::<OrdinalBindings>().is_some();
				Ok(Box::new(value.children().enumerate().map(move |(index, element)| {
					let position = if ordered {
						Value::int(index as i64)
					} else {
						Value::missing()
					};
					element.map(|element| scan_row(&alias, &at, &by, element, position))
				})))
			}
			FromPlan::Unpivot {
				expr,
				alias,
				at,
			} => {
				let value = expr.eval(&env.with_mode(CurrentMode::GlobalsThenLocals))?;
				let rows: Vec<Result<Row>> = if value.is_missing() {
					Vec::new()
				} else if let Some(record) = value.as_struct() {
					record.pairs()?
						.into_iter()
						.map(|(name, value)| Ok(unpivot_row(alias, at, value, Value::string(name))))
						.collect()
				} else {
					vec![Ok(unpivot_row(alias, at, value, Value::string("_1")))]
				};
				Ok(Box::new(rows.into_iter()))
			}
			FromPlan::Join {
				outer,
				left,
				right,
				condition,
				right_aliases,
			} => {
				let left_rows = left.rows(env, signaler)?;
				let env = env.clone();
				let right = right.clone();
				let condition = condition.clone();
				let right_aliases = right_aliases.clone();
				let outer = *outer;
				Ok(Box::new(left_rows.flat_map(move |left| {
					let joined = left.and_then(|left| {
						join(&env, signaler, &right, condition.as_ref(), &right_aliases, outer, left)
					});
					match joined {
						Ok(rows) => rows.into_iter().map(Ok).collect::<Vec<_>>(),
						Err(err) => vec![Err(err)],
					}
				})))
			}
		}
	}
}

fn scan_row(alias: &Arc<str>, at: &Option<Arc<str>>, by: &Option<Arc<str>>, value: Value, position: Value) -> Row {
	let mut row = Vec::with_capacity(3);
	if let Some(by) = by {
		row.push((by.clone(), value.address().cloned().unwrap_or_else(Value::missing)));
	}
	if let Some(at) = at {
		row.push((at.clone(), position));
	}
	row.insert(0, (alias.clone(), value.unnamed()));
	row
}

fn unpivot_row(alias: &Arc<str>, at: &Option<Arc<str>>, value: Value, name: Value) -> Row {
	let mut row = vec![(alias.clone(), value.unnamed())];
	if let Some(at) = at {
		row.push((at.clone(), name));
	}
	row
}

fn join(
	env: &Environment,
	signaler: Signaler,
	right: &FromPlan,
	condition: Option<&Thunk>,
	right_aliases: &[Arc<str>],
	outer: bool,
	left: Row,
) -> Result<Vec<Row>> {
	let left_env = bind(env, &left);
	let mut out = Vec::new();
	for right_row in right.rows(&left_env, signaler)? {
		let mut row = left.clone();
		row.extend(right_row?);
		if let Some(condition) = condition {
			if !signaler.condition(&condition.eval(&bind(env, &row))?, "ON")? {
				continue;
			}
		}
		out.push(row);
	}
	if out.is_empty() && outer {
		let mut row = left;
		row.extend(right_aliases.iter().map(|alias| (alias.clone(), Value::null())));
		out.push(row);
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use quill_value::{ErrorCode, Sequence, error::diagnostic::operator::divide_by_zero};

	use super::*;
	use crate::{
		ast::{AggregateFunc, GroupBy, NaryOp, NullsOrder, PathStep, SortSpec},
		compile::compile,
		options::CompileOptions,
		session::Session,
	};

	fn people() -> Value {
		let person = |name: &str, age: i64, city: &str| {
			Value::structure(
				StructOrdering::Ordered,
				[("name", Value::string(name)), ("age", Value::int(age)), ("city", Value::string(city))],
			)
		};
		Value::bag(vec![person("ann", 30, "oslo"), person("bob", 25, "rome"), person("cat", 35, "oslo")])
	}

	fn session() -> Session {
		let globals: MapBindings = [("people", people())].into_iter().collect();
		Session::builder().globals(Arc::new(globals)).build()
	}

	fn run(select: Select) -> Result<Value> {
		compile(&Expr::select(select), CompileOptions::strict())?.eval(&session())
	}

	fn field(root: &str, name: &str) -> Expr {
		Expr::path(Expr::var(root), vec![PathStep::field(name)])
	}

	#[test]
	fn test_select_value_with_filter() {
		let mut select = Select::value(field("p", "name"), Expr::var("people"), "p");
		select.filter = Some(Expr::binary(NaryOp::Gt, field("p", "age"), Expr::lit(26i64)));
		let result = run(select).unwrap();
		assert_eq!(result, Value::bag(vec![Value::string("ann"), Value::string("cat")]));
	}

	#[test]
	fn test_result_streams_lazily() {
		let result = run(Select::value(field("p", "age"), Expr::var("people"), "p")).unwrap();
		let seq: &Sequence = result.as_sequence().unwrap();
		assert!(!seq.is_materialized());
		assert_eq!(seq.len().unwrap(), 3);
	}

	#[test]
	fn test_streamed_errors_carry_fragment_and_recover() {
		let failing =
			Value::bag_of(Sequence::lazy(|| -> SeqIter { Box::new(std::iter::once(Err(error!(divide_by_zero())))) }));
		let fragment = Fragment::statement("SELECT VALUE x FROM failing AS x", 1, 1);
		let expr = Expr::select(Select::value(Expr::var("x"), Expr::lit(failing), "x")).at(fragment);

		let result = compile(&expr, CompileOptions::strict()).unwrap().eval(&session()).unwrap();
		let err = result.force().unwrap_err();
		assert_eq!(err.code(), ErrorCode::DivideByZero);
		assert_eq!(err.0.fragment.text(), "SELECT VALUE x FROM failing AS x");

		let result = compile(&expr, CompileOptions::permissive()).unwrap().eval(&session()).unwrap();
		let rows = result.children().collect::<Result<Vec<_>>>().unwrap();
		assert_eq!(rows.len(), 1);
		assert!(rows[0].is_missing());
	}

	#[test]
	fn test_order_by_limit_offset() {
		let mut select = Select::value(field("p", "name"), Expr::var("people"), "p");
		select.order_by = vec![SortSpec {
			expr: field("p", "age"),
			order: SortOrder::Desc,
			nulls: None,
		}];
		select.limit = Some(Expr::lit(2i64));
		select.offset = Some(Expr::lit(1i64));
		let result = run(select).unwrap();
		assert_eq!(result.to_string(), "['ann', 'bob']");
	}

	#[test]
	fn test_order_by_null_placement() {
		let values = Expr::lit(Value::list(vec![Value::int(2), Value::null(), Value::int(1)]));
		let ordered = |order, nulls| {
			let mut select = Select::value(Expr::var("v"), values.clone(), "v");
			select.order_by = vec![SortSpec {
				expr: Expr::var("v"),
				order,
				nulls,
			}];
			run(select).unwrap().to_string()
		};
		assert_eq!(ordered(SortOrder::Asc, None), "[1, 2, NULL]");
		assert_eq!(ordered(SortOrder::Desc, None), "[NULL, 2, 1]");
		assert_eq!(ordered(SortOrder::Asc, Some(NullsOrder::First)), "[NULL, 1, 2]");
	}

	#[test]
	fn test_limit_errors() {
		let mut select = Select::value(Expr::var("p"), Expr::var("people"), "p");
		select.limit = Some(Expr::lit("ten"));
		assert_eq!(run(select.clone()).unwrap_err().code(), ErrorCode::NonIntLimit);
		select.limit = None;
		select.offset = Some(Expr::lit(-1i64));
		let permissive = compile(&Expr::select(select), CompileOptions::permissive()).unwrap();
		assert_eq!(permissive.eval(&session()).unwrap_err().code(), ErrorCode::NegativeOffset);
	}

	#[test]
	fn test_group_by_with_aggregates() {
		let mut select = Select::value(Expr::var("p"), Expr::var("people"), "p");
		select.projection = Projection::List(vec![
			ProjectItem::Expr {
				expr: Expr::var("city"),
				alias: None,
			},
			ProjectItem::Expr {
				expr: Expr::aggregate(AggregateFunc::Count, SetQuantifier::All, None),
				alias: Some("n".to_string()),
			},
			ProjectItem::Expr {
				expr: Expr::aggregate(AggregateFunc::Max, SetQuantifier::All, Some(field("p", "age"))),
				alias: Some("oldest".to_string()),
			},
		]);
		select.group_by = Some(GroupBy {
			keys: vec![(field("p", "city"), None)],
			group_as: None,
		});
		select.order_by = vec![SortSpec {
			expr: Expr::var("city"),
			order: SortOrder::Asc,
			nulls: None,
		}];
		let result = run(select).unwrap();
		assert_eq!(result.to_string(), "[{'city': 'oslo', 'n': 2, 'oldest': 35}, {'city': 'rome', 'n': 1, 'oldest': 25}]");
	}

	#[test]
	fn test_having_and_group_as() {
		let mut select = Select::value(Expr::var("g"), Expr::var("people"), "p");
		select.group_by = Some(GroupBy {
			keys: vec![(field("p", "city"), Some("c".to_string()))],
			group_as: Some("g".to_string()),
		});
		select.having = Some(Expr::binary(
			NaryOp::Gt,
			Expr::aggregate(AggregateFunc::Count, SetQuantifier::All, None),
			Expr::lit(1i64),
		));
		let result = run(select).unwrap();
		let groups = result.children().collect::<Result<Vec<_>>>().unwrap();
		assert_eq!(groups.len(), 1);
		assert_eq!(groups[0].children().count(), 2);
	}

	#[test]
	fn test_implicit_group_over_no_rows() {
		let mut select = Select::value(
			Expr::aggregate(AggregateFunc::Count, SetQuantifier::All, None),
			Expr::lit(Value::bag(vec![])),
			"x",
		);
		assert_eq!(run(select.clone()).unwrap(), Value::bag(vec![Value::int(0)]));
		select.projection = Projection::Value(Expr::aggregate(AggregateFunc::Sum, SetQuantifier::All, Some(Expr::var("x"))));
		assert_eq!(run(select).unwrap(), Value::bag(vec![Value::null()]));
	}

	#[test]
	fn test_select_star_and_at() {
		let mut select = Select::value(Expr::var("v"), Expr::lit(Value::list(vec![Value::string("a")])), "v");
		select.projection = Projection::Star;
		select.from = FromSource::Scan {
			expr: Expr::lit(Value::list(vec![Value::string("a"), Value::string("b")])),
			alias: Some("v".to_string()),
			at: Some("i".to_string()),
			by: None,
		};
		let result = run(select).unwrap();
		assert_eq!(result, Value::bag(vec![
			Value::structure(StructOrdering::Ordered, [("v", Value::string("a")), ("i", Value::int(0))]),
			Value::structure(StructOrdering::Ordered, [("v", Value::string("b")), ("i", Value::int(1))]),
		]));
	}

	#[test]
	fn test_projection_filters_missing() {
		let mut select = Select::value(Expr::var("p"), Expr::var("people"), "p");
		select.projection = Projection::List(vec![
			ProjectItem::Expr {
				expr: field("p", "name"),
				alias: None,
			},
			ProjectItem::Expr {
				expr: Expr::missing(),
				alias: Some("gone".to_string()),
			},
		]);
		select.limit = Some(Expr::lit(1i64));
		let row = run(select).unwrap().children().next().unwrap().unwrap();
		assert_eq!(row.as_struct().unwrap().len().unwrap(), 1);
	}

	#[test]
	fn test_left_join_pads_with_null() {
		let orders = Value::bag(vec![Value::structure(
			StructOrdering::Ordered,
			[("who", Value::string("ann")), ("item", Value::string("tea"))],
		)]);
		let mut select = Select::value(Expr::var("p"), Expr::var("people"), "p");
		select.projection = Projection::List(vec![
			ProjectItem::Expr {
				expr: field("p", "name"),
				alias: None,
			},
			ProjectItem::Expr {
				expr: field("o", "item"),
				alias: None,
			},
		]);
		select.from = FromSource::Join {
			kind: JoinKind::Left,
			left: Box::new(FromSource::Scan {
				expr: Expr::var("people"),
				alias: Some("p".to_string()),
				at: None,
				by: None,
			}),
			right: Box::new(FromSource::Scan {
				expr: Expr::lit(orders),
				alias: Some("o".to_string()),
				at: None,
				by: None,
			}),
			condition: Some(Expr::binary(NaryOp::Eq, field("p", "name"), field("o", "who"))),
		};
		select.order_by = vec![SortSpec {
			expr: field("p", "name"),
			order: SortOrder::Asc,
			nulls: None,
		}];
		let result = compile(&Expr::select(select), CompileOptions::permissive()).unwrap().eval(&session()).unwrap();
		assert_eq!(
			result.to_string(),
			"[{'name': 'ann', 'item': 'tea'}, {'name': 'bob'}, {'name': 'cat'}]"
		);
	}

	#[test]
	fn test_right_join_is_unsupported() {
		let mut select = Select::value(Expr::var("a"), Expr::var("people"), "a");
		select.from = FromSource::Join {
			kind: JoinKind::Full,
			left: Box::new(select.from.clone()),
			right: Box::new(select.from.clone()),
			condition: None,
		};
		let err = compile(&Expr::select(select), CompileOptions::new()).map(|_| ()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::UnsupportedFeature);
	}

	#[test]
	fn test_let_and_unpivot() {
		let mut select = Select::value(Expr::var("doubled"), Expr::null(), "v");
		select.from = FromSource::Unpivot {
			expr: Expr::lit(Value::structure(StructOrdering::Ordered, [("a", Value::int(1)), ("b", Value::int(2))])),
			alias: Some("v".to_string()),
			at: Some("k".to_string()),
		};
		select.lets = vec![(Expr::binary(NaryOp::Mul, Expr::var("v"), Expr::lit(2i64)), "doubled".to_string())];
		select.filter = Some(Expr::binary(NaryOp::Eq, Expr::var("k"), Expr::lit("b")));
		assert_eq!(run(select).unwrap(), Value::bag(vec![Value::int(4)]));
	}

	#[test]
	fn test_let_chain_sees_earlier_lets() {
		let mut select = Select::value(Expr::var("next"), Expr::var("people"), "p");
		select.lets = vec![
			(Expr::binary(NaryOp::Add, field("p", "age"), Expr::lit(1i64)), "next".to_string()),
			(Expr::binary(NaryOp::Mul, Expr::var("next"), Expr::lit(2i64)), "twice".to_string()),
			(Expr::binary(NaryOp::Add, Expr::var("twice"), Expr::var("next")), "next".to_string()),
		];
		select.filter = Some(Expr::binary(NaryOp::Gt, Expr::var("twice"), Expr::lit(60i64)));
		assert_eq!(run(select).unwrap(), Value::bag(vec![Value::int(93), Value::int(108)]));
	}

	#[test]
	fn test_distinct() {
		let mut select = Select::value(field("p", "city"), Expr::var("people"), "p");
		select.quantifier = SetQuantifier::Distinct;
		let result = run(select).unwrap();
		assert_eq!(result.as_sequence().unwrap().len().unwrap(), 2);
	}

	#[test]
	fn test_correlated_sub_query() {
		let mut inner = Select::value(field("q", "name"), Expr::var("people"), "q");
		inner.filter = Some(Expr::binary(NaryOp::Lt, field("q", "age"), field("p", "age")));
		let count = Expr::call("size", vec![Expr::select(inner)]);
		let mut outer = Select::value(count, Expr::var("people"), "p");
		outer.order_by = vec![SortSpec {
			expr: field("p", "age"),
			order: SortOrder::Asc,
			nulls: None,
		}];
		assert_eq!(run(outer).unwrap().to_string(), "[0, 1, 2]");
	}
}
