// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use quill_value::{Datum, Result, Value, error, error::diagnostic::operator::integer_out_of_range};

use crate::{ast::Meta, environment::Environment, signal::Signaler};

/// A compiled expression node.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn(&Environment) -> Result<Value> + Send + Sync>);

impl Thunk {
	pub fn new(f: impl Fn(&Environment) -> Result<Value> + Send + Sync + 'static) -> Self {
		Self(Arc::new(f))
	}

	pub fn constant(value: Value) -> Self {
		Self::new(move |_| Ok(value.clone()))
	}

	pub fn eval(&self, env: &Environment) -> Result<Value> {
		(self.0)(env)
	}
}

/// A compiled path step, applied to the value produced by the previous step.
#[derive(Clone)]
pub struct PathThunk(Arc<dyn Fn(&Environment, Value) -> Result<Value> + Send + Sync>);

impl PathThunk {
	pub fn new(f: impl Fn(&Environment, Value) -> Result<Value> + Send + Sync + 'static) -> Self {
		Self(Arc::new(f))
	}

	pub fn eval(&self, env: &Environment, value: Value) -> Result<Value> {
		(self.0)(env, value)
	}
}

/// Wraps node closures with the checks every thunk boundary performs: the declared integer width,
/// the source fragment on errors that lack one, and the typing-mode recovery.
#[derive(Debug, Clone, Copy)]
pub struct ThunkFactory {
	signaler: Signaler,
}

impl ThunkFactory {
	pub fn new(signaler: Signaler) -> Self {
		Self {
			signaler,
		}
	}

	pub fn signaler(&self) -> Signaler {
		self.signaler
	}

	pub fn thunk<F>(&self, meta: &Meta, f: F) -> Thunk
	where
		F: Fn(&Environment) -> Result<Value> + Send + Sync + 'static,
	{
		let signaler = self.signaler;
		let fragment = meta.fragment.clone();
		let width = meta.int_width;
		Thunk::new(move |env| {
			let result = f(env).and_then(|value| match (width, value.datum()) {
				(Some(width), Datum::Int(v)) if !width.contains(*v) => {
					Err(error!(integer_out_of_range(*v, width.bits())))
				}
				_ => Ok(value),
			});
			match result {
				Ok(value) => Ok(value),
				Err(err) => signaler.recover(err.with_fragment_if_absent(&fragment)),
			}
		})
	}

	pub fn path_thunk<F>(&self, meta: &Meta, f: F) -> PathThunk
	where
		F: Fn(&Environment, Value) -> Result<Value> + Send + Sync + 'static,
	{
		let signaler = self.signaler;
		let fragment = meta.fragment.clone();
		PathThunk::new(move |env, value| match f(env, value) {
			Ok(value) => Ok(value),
			Err(err) => signaler.recover(err.with_fragment_if_absent(&fragment)),
		})
	}
}
