// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;
use quill_value::{Bindings, OrderedValue, Result, Value, binding, return_internal_error};

use crate::{aggregate::Accumulator, session::Session};

/// Which bindings an unqualified name resolves against first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentMode {
	Locals,
	GlobalsThenLocals,
}

/// State of one group built by `GROUP BY`.
pub struct Group {
	/// Key aliases bound to this group's key values.
	pub key: Vec<(Arc<str>, Value)>,
	/// Rows collected for `GROUP AS`.
	pub members: Vec<Value>,
	pub registers: Vec<Box<dyn Accumulator>>,
}

/// Groups of the query being evaluated, ordered by key.
pub type GroupMap = BTreeMap<OrderedValue, Group>;

/// Everything a thunk reads at run time. Nesting copies the handles, never the bindings.
#[derive(Clone)]
pub struct Environment {
	locals: Arc<dyn Bindings>,
	current: Arc<dyn Bindings>,
	session: Arc<Session>,
	groups: Arc<Mutex<GroupMap>>,
	current_group: Option<OrderedValue>,
}

impl Environment {
	pub fn new(session: Arc<Session>) -> Self {
		Self {
			locals: binding::empty(),
			current: session.globals().clone(),
			session,
			groups: Arc::new(Mutex::new(GroupMap::new())),
			current_group: None,
		}
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn locals(&self) -> &Arc<dyn Bindings> {
		&self.locals
	}

	/// The view unqualified names resolve against.
	pub fn current(&self) -> &Arc<dyn Bindings> {
		&self.current
	}

	/// Locals first, then globals.
	pub fn lexical(&self) -> Arc<dyn Bindings> {
		binding::with_fallback(self.locals.clone(), self.session.globals().clone())
	}

	/// Adds `bindings` in front of the local chain.
	pub fn nest(&self, bindings: Arc<dyn Bindings>, mode: CurrentMode) -> Self {
		let locals = binding::with_fallback(bindings, self.locals.clone());
		Self {
			current: self.view(&locals, mode),
			locals,
			session: self.session.clone(),
			groups: self.groups.clone(),
			current_group: self.current_group.clone(),
		}
	}

	/// Same locals with a different current view.
	pub fn with_mode(&self, mode: CurrentMode) -> Self {
		Self {
			current: self.view(&self.locals, mode),
			..self.clone()
		}
	}

	/// A fresh grouping map for a query nested in this environment.
	pub fn nest_query(&self) -> Self {
		Self {
			groups: Arc::new(Mutex::new(GroupMap::new())),
			current_group: None,
			..self.clone()
		}
	}

	pub fn with_group(&self, key: OrderedValue) -> Self {
		Self {
			current_group: Some(key),
			..self.clone()
		}
	}

	pub fn groups(&self) -> &Arc<Mutex<GroupMap>> {
		&self.groups
	}

	/// Result of aggregate register `index` in the current group.
	pub fn read_register(&self, index: usize) -> Result<Value> {
		let Some(key) = &self.current_group else {
			return_internal_error!("aggregate register {} read outside of a group", index);
		};
		let groups = self.groups.lock();
		match groups.get(key).and_then(|group| group.registers.get(index)) {
			Some(register) => register.finish(),
			None => return_internal_error!("aggregate register {} does not exist", index),
		}
	}

	fn view(&self, locals: &Arc<dyn Bindings>, mode: CurrentMode) -> Arc<dyn Bindings> {
		let globals = self.session.globals().clone();
		match mode {
			CurrentMode::Locals => binding::with_fallback(locals.clone(), globals),
			CurrentMode::GlobalsThenLocals => binding::with_fallback(globals, locals.clone()),
		}
	}
}
