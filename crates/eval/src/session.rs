// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use quill_value::{
	Bindings, Result, Timestamp, Value, binding, error::diagnostic::binding::unbound_parameter, return_error,
};

/// Per-execution inputs: global bindings, positional parameters, the current instant and the default
/// time zone offset.
#[derive(Clone)]
pub struct Session {
	globals: Arc<dyn Bindings>,
	parameters: Arc<[Value]>,
	now: Timestamp,
	default_offset: FixedOffset,
}

impl Session {
	pub fn builder() -> SessionBuilder {
		SessionBuilder::default()
	}

	/// No globals, no parameters, now.
	pub fn standard() -> Self {
		Self::builder().build()
	}

	pub fn globals(&self) -> &Arc<dyn Bindings> {
		&self.globals
	}

	/// The parameter at 1-based `ordinal`.
	pub fn parameter(&self, ordinal: usize) -> Result<Value> {
		match ordinal.checked_sub(1).and_then(|index| self.parameters.get(index)) {
			Some(value) => Ok(value.clone()),
			None => return_error!(unbound_parameter(ordinal, self.parameters.len())),
		}
	}

	/// Always in UTC.
	pub fn now(&self) -> Timestamp {
		self.now
	}

	pub fn default_offset(&self) -> FixedOffset {
		self.default_offset
	}
}

pub struct SessionBuilder {
	globals: Option<Arc<dyn Bindings>>,
	parameters: Vec<Value>,
	now: Option<Timestamp>,
	default_offset: FixedOffset,
}

impl Default for SessionBuilder {
	fn default() -> Self {
		Self {
			globals: None,
			parameters: Vec::new(),
			now: None,
			default_offset: Utc.fix(),
		}
	}
}

impl SessionBuilder {
	pub fn globals(mut self, globals: Arc<dyn Bindings>) -> Self {
		self.globals = Some(globals);
		self
	}

	pub fn parameters(mut self, parameters: Vec<Value>) -> Self {
		self.parameters = parameters;
		self
	}

	pub fn parameter(mut self, value: Value) -> Self {
		self.parameters.push(value);
		self
	}

	pub fn now(mut self, now: Timestamp) -> Self {
		self.now = Some(now);
		self
	}

	pub fn default_offset(mut self, offset: FixedOffset) -> Self {
		self.default_offset = offset;
		self
	}

	pub fn build(self) -> Session {
		Session {
			globals: self.globals.unwrap_or_else(binding::empty),
			parameters: Arc::from(self.parameters),
			now: self.now.unwrap_or_else(Timestamp::utc_now).to_utc(),
			default_offset: self.default_offset,
		}
	}
}
