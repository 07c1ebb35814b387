// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Statements: a query, or an INSERT/DELETE whose affected rows are reported to the host.
//!
//! Nothing is written here. The [`Output`] names the target and the rows; applying them is the
//! host's business.

use quill_value::{
	BindingName, Bindings, Result, Value, error::diagnostic::binding::binding_does_not_exist, return_error,
};
use tracing::{debug, instrument};

use crate::{
	ast::{Expr, ExprKind, Select, VariableScope},
	compile::{Compiler, Expression},
	session::Session,
};

#[derive(Debug, Clone)]
pub enum Statement {
	Query(Expr),
	/// `INSERT INTO target <values>`; a collection inserts each element, anything else one row.
	Insert {
		target: BindingName,
		values: Expr,
	},
	/// `DELETE FROM target [AS alias] [WHERE filter]`
	Delete {
		target: BindingName,
		alias: Option<String>,
		filter: Option<Expr>,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
	Value(Value),
	Insert {
		target: BindingName,
		rows: Vec<Value>,
	},
	Delete {
		target: BindingName,
		rows: Vec<Value>,
	},
}

/// A compiled statement.
#[derive(Clone)]
pub struct Program {
	kind: ProgramKind,
}

#[derive(Clone)]
enum ProgramKind {
	Query(Expression),
	Insert {
		target: BindingName,
		values: Expression,
	},
	Delete {
		target: BindingName,
		rows: Expression,
	},
}

impl Compiler {
	#[instrument(name = "eval::compile::statement", level = "debug", skip_all)]
	pub fn compile_statement(&mut self, statement: &Statement) -> Result<Program> {
		let kind = match statement {
			Statement::Query(expr) => ProgramKind::Query(self.compile(expr)?),
			Statement::Insert {
				target,
				values,
			} => ProgramKind::Insert {
				target: target.clone(),
				values: self.compile(values)?,
			},
			Statement::Delete {
				target,
				alias,
				filter,
			} => {
				let alias = alias.clone().unwrap_or_else(|| target.text().to_string());
				let source = Expr::new(ExprKind::Variable {
					name: target.text().to_string(),
					case: target.case(),
					scope: VariableScope::Unqualified,
				});
				let mut select = Select::value(Expr::var(alias.as_str()), source, &alias);
				select.filter = filter.clone();
				ProgramKind::Delete {
					target: target.clone(),
					rows: self.compile(&Expr::select(select))?,
				}
			}
		};
		Ok(Program {
			kind,
		})
	}
}

impl Program {
	#[instrument(name = "eval::execute", level = "debug", skip_all)]
	pub fn execute(&self, session: &Session) -> Result<Output> {
		match &self.kind {
			ProgramKind::Query(expr) => Ok(Output::Value(expr.eval(session)?)),
			ProgramKind::Insert {
				target,
				values,
			} => {
				if session.globals().get(target)?.is_none() {
					return_error!(binding_does_not_exist(target.text()));
				}
				let rows = rows(values.eval(session)?)?;
				debug!(binding = %target, rows = rows.len(), "insert");
				Ok(Output::Insert {
					target: target.clone(),
					rows,
				})
			}
			ProgramKind::Delete {
				target,
				rows: selected,
			} => {
				let rows = rows(selected.eval(session)?)?;
				debug!(binding = %target, rows = rows.len(), "delete");
				Ok(Output::Delete {
					target: target.clone(),
					rows,
				})
			}
		}
	}
}

fn rows(value: Value) -> Result<Vec<Value>> {
	if value.is_missing() {
		return Ok(Vec::new());
	}
	if !value.is_collection() {
		return Ok(vec![value.unnamed()]);
	}
	value
		.children()
		.filter_map(|row| match row {
			Ok(row) if row.is_missing() => None,
			Ok(row) => Some(Ok(row.unnamed())),
			Err(err) => Some(Err(err)),
		})
		.collect()
}
