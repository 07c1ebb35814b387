// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Uniform call interface for functions invoked by compiled programs.

use std::{collections::HashMap, ops::Deref, sync::Arc};

use once_cell::sync::Lazy;
use quill_value::{Error, GetType, Result, Value, error::diagnostic::function::invalid_argument_type, return_error};

use crate::session::Session;

mod collection;
mod text;
mod time;

pub use collection::{Exists, Size};
pub use text::{CharLength, Lower, Upper};
pub use time::UtcNow;

pub type CallResult<T> = std::result::Result<T, CallError>;

/// Failure of a function implementation.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
	/// An engine error, reported as is.
	#[error(transparent)]
	Engine(#[from] Error),
	/// A failure from code outside the engine; handed to the configured error handler.
	#[error("{0}")]
	Foreign(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
	pub name: String,
	pub min: usize,
	pub max: usize,
	/// An unknown argument makes the call return that unknown without invoking the function.
	pub propagates_unknowns: bool,
}

impl FunctionSignature {
	pub fn new(name: impl Into<String>, min: usize, max: usize) -> Self {
		Self {
			name: name.into(),
			min,
			max,
			propagates_unknowns: true,
		}
	}

	pub fn propagates_unknowns(mut self, propagates: bool) -> Self {
		self.propagates_unknowns = propagates;
		self
	}
}

pub trait ExprFunction: Send + Sync {
	fn signature(&self) -> &FunctionSignature;

	fn call(&self, session: &Session, args: &[Value]) -> CallResult<Value>;
}

static BUILTINS: Lazy<Functions> = Lazy::new(|| {
	Functions::builder()
		.with_function(Upper::new())
		.with_function(Lower::new())
		.with_function(CharLength::new())
		.with_function(Size::new())
		.with_function(Exists::new())
		.with_function(UtcNow::new())
		.build()
});

/// Function registry, looked up case-insensitively at compile time.
#[derive(Clone)]
pub struct Functions(Arc<FunctionsInner>);

impl Functions {
	pub fn empty() -> Functions {
		Functions::builder().build()
	}

	pub fn builtins() -> Functions {
		BUILTINS.clone()
	}

	pub fn builder() -> FunctionsBuilder {
		FunctionsBuilder {
			inner: FunctionsInner {
				functions: HashMap::new(),
			},
		}
	}
}

impl Default for Functions {
	fn default() -> Self {
		Self::builtins()
	}
}

impl Deref for Functions {
	type Target = FunctionsInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[derive(Clone)]
pub struct FunctionsInner {
	functions: HashMap<String, Arc<dyn ExprFunction>>,
}

impl FunctionsInner {
	pub fn get(&self, name: &str) -> Option<Arc<dyn ExprFunction>> {
		self.functions.get(&name.to_lowercase()).cloned()
	}

	pub fn has_function(&self, name: &str) -> bool {
		self.functions.contains_key(&name.to_lowercase())
	}
}

pub struct FunctionsBuilder {
	inner: FunctionsInner,
}

impl FunctionsBuilder {
	/// Starts from the builtin set.
	pub fn with_builtins(mut self) -> Self {
		for (name, function) in &BUILTINS.functions {
			self.inner.functions.insert(name.clone(), function.clone());
		}
		self
	}

	/// Registers `function` under its signature name, replacing an earlier one of the same name.
	pub fn with_function<F: ExprFunction + 'static>(mut self, function: F) -> Self {
		let name = function.signature().name.to_lowercase();
		self.inner.functions.insert(name, Arc::new(function));
		self
	}

	pub fn build(self) -> Functions {
		Functions(Arc::new(self.inner))
	}
}

pub(crate) fn text_argument<'a>(signature: &FunctionSignature, args: &'a [Value], position: usize) -> Result<&'a str> {
	let value = &args[position];
	match value.as_text() {
		Some(text) => Ok(text),
		None => return_error!(invalid_argument_type(&signature.name, position + 1, "text", value.get_type())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Twice {
		signature: FunctionSignature,
	}

	impl ExprFunction for Twice {
		fn signature(&self) -> &FunctionSignature {
			&self.signature
		}

		fn call(&self, _: &Session, args: &[Value]) -> CallResult<Value> {
			match args[0].as_int() {
				Some(v) => Ok(Value::int(v * 2)),
				None => Err(CallError::Foreign("not an int".into())),
			}
		}
	}

	#[test]
	fn test_builtins_are_registered() {
		let functions = Functions::builtins();
		for name in ["upper", "lower", "char_length", "size", "exists", "utcnow"] {
			assert!(functions.has_function(name), "{name}");
		}
		assert!(functions.get("UPPER").is_some());
		assert!(functions.get("twice").is_none());
	}

	#[test]
	fn test_builder() {
		let functions = Functions::builder()
			.with_builtins()
			.with_function(Twice {
				signature: FunctionSignature::new("Twice", 1, 1),
			})
			.build();
		let twice = functions.get("twice").unwrap();
		assert_eq!(twice.call(&Session::standard(), &[Value::int(4)]).unwrap(), Value::int(8));
		assert!(matches!(twice.call(&Session::standard(), &[Value::null()]), Err(CallError::Foreign(_))));
		assert!(functions.has_function("upper"));
		assert!(!Functions::empty().has_function("upper"));
	}
}
