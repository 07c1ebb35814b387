// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crate::{
	Result,
	binding::{BindingName, Bindings},
	value::Value,
};

pub struct EmptyBindings;

impl Bindings for EmptyBindings {
	fn get(&self, _name: &BindingName) -> Result<Option<Value>> {
		Ok(None)
	}
}

pub struct FallbackBindings {
	primary: Arc<dyn Bindings>,
	fallback: Arc<dyn Bindings>,
}

impl FallbackBindings {
	pub fn new(primary: Arc<dyn Bindings>, fallback: Arc<dyn Bindings>) -> Self {
		Self {
			primary,
			fallback,
		}
	}
}

impl Bindings for FallbackBindings {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		match self.primary.get(name)? {
			Some(value) => Ok(Some(value)),
			None => self.fallback.get(name),
		}
	}
}

pub struct BlacklistBindings {
	inner: Arc<dyn Bindings>,
	names: Vec<String>,
}

impl BlacklistBindings {
	pub fn new<I, S>(inner: Arc<dyn Bindings>, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			inner,
			names: names.into_iter().map(Into::into).collect(),
		}
	}
}

impl Bindings for BlacklistBindings {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		if self.names.iter().any(|hidden| name.matches(hidden)) {
			return Ok(None);
		}
		self.inner.get(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		ErrorCode,
		binding::{MapBindings, blacklist, empty, with_fallback},
	};

	fn map(entries: &[(&str, i64)]) -> Arc<dyn Bindings> {
		Arc::new(entries.iter().map(|(k, v)| (*k, Value::int(*v))).collect::<MapBindings>())
	}

	#[test]
	fn test_fallback_on_none() {
		let bindings = with_fallback(map(&[("a", 1)]), map(&[("a", 10), ("b", 2)]));
		assert_eq!(bindings.get(&BindingName::sensitive("a")).unwrap(), Some(Value::int(1)));
		assert_eq!(bindings.get(&BindingName::sensitive("b")).unwrap(), Some(Value::int(2)));
		assert!(bindings.get(&BindingName::sensitive("c")).unwrap().is_none());
	}

	#[test]
	fn test_ambiguity_does_not_fall_back() {
		let bindings = with_fallback(map(&[("a", 1), ("A", 2)]), map(&[("a", 10)]));
		let err = bindings.get(&BindingName::insensitive("a")).unwrap_err();
		assert_eq!(err.code(), ErrorCode::AmbiguousBinding);
	}

	#[test]
	fn test_blacklist_hides_names() {
		let bindings = blacklist(map(&[("x", 1), ("y", 2)]), ["X"]);
		assert!(bindings.get(&BindingName::insensitive("x")).unwrap().is_none());
		assert_eq!(bindings.get(&BindingName::sensitive("x")).unwrap(), Some(Value::int(1)));
		assert_eq!(bindings.get(&BindingName::sensitive("y")).unwrap(), Some(Value::int(2)));
	}

	#[test]
	fn test_empty() {
		assert!(empty().get(&BindingName::insensitive("anything")).unwrap().is_none());
	}
}
