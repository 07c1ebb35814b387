// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::{
	Result,
	binding::{BindingCase, BindingName, Bindings},
	error::diagnostic::binding::ambiguous_binding,
	return_error,
	value::Value,
};

/// Lower-cased key to the original keys folding onto it, built on the first
/// case-insensitive lookup.
#[derive(Default, Clone)]
struct FoldedKeys(OnceCell<HashMap<String, Vec<String>>>);

impl FoldedKeys {
	fn resolve<'a, I>(&'a self, keys: I, name: &BindingName) -> Result<Option<&'a str>>
	where
		I: FnOnce() -> Vec<String>,
	{
		let folded = self.0.get_or_init(|| {
			let mut folded: HashMap<String, Vec<String>> = HashMap::new();
			for key in keys() {
				folded.entry(key.to_lowercase()).or_default().push(key);
			}
			folded
		});
		match folded.get(name.key()) {
			None => Ok(None),
			Some(candidates) if candidates.len() == 1 => Ok(Some(candidates[0].as_str())),
			Some(candidates) => return_error!(ambiguous_binding(name.text(), candidates.as_slice())),
		}
	}
}

#[derive(Clone)]
pub struct MapBindings {
	values: HashMap<String, Value>,
	folded: FoldedKeys,
}

impl MapBindings {
	pub fn new(values: HashMap<String, Value>) -> Self {
		Self {
			values,
			folded: FoldedKeys::default(),
		}
	}

	/// Adds or replaces `name`; the case-folded index is rebuilt on the next insensitive lookup.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) {
		self.values.insert(name.into(), value);
		self.folded = FoldedKeys::default();
	}
}

impl<S: Into<String>> FromIterator<(S, Value)> for MapBindings {
	fn from_iter<T: IntoIterator<Item = (S, Value)>>(iter: T) -> Self {
		Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

impl Bindings for MapBindings {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		match name.case() {
			BindingCase::Sensitive => Ok(self.values.get(name.text()).cloned()),
			BindingCase::Insensitive => {
				let key = self.folded.resolve(|| self.values.keys().cloned().collect(), name)?;
				Ok(key.and_then(|key| self.values.get(key)).cloned())
			}
		}
	}
}

type Producer = Box<dyn Fn() -> Result<Value> + Send + Sync>;

struct LazyValue {
	producer: Producer,
	value: OnceCell<Value>,
}

/// Map whose values are computed on first lookup and then kept.
pub struct LazyMapBindings {
	values: HashMap<String, LazyValue>,
	folded: FoldedKeys,
}

impl LazyMapBindings {
	pub fn new() -> Self {
		Self {
			values: HashMap::new(),
			folded: FoldedKeys::default(),
		}
	}

	pub fn with<F>(mut self, name: impl Into<String>, producer: F) -> Self
	where
		F: Fn() -> Result<Value> + Send + Sync + 'static,
	{
		self.values.insert(
			name.into(),
			LazyValue {
				producer: Box::new(producer),
				value: OnceCell::new(),
			},
		);
		self
	}

	fn force(&self, key: &str) -> Result<Option<Value>> {
		match self.values.get(key) {
			None => Ok(None),
			Some(lazy) => lazy.value.get_or_try_init(|| (lazy.producer)()).cloned().map(Some),
		}
	}
}

impl Default for LazyMapBindings {
	fn default() -> Self {
		Self::new()
	}
}

impl Bindings for LazyMapBindings {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		match name.case() {
			BindingCase::Sensitive => self.force(name.text()),
			BindingCase::Insensitive => {
				match self.folded.resolve(|| self.values.keys().cloned().collect(), name)? {
					Some(key) => self.force(key),
					None => Ok(None),
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use super::*;
	use crate::ErrorCode;

	#[test]
	fn test_map_case_modes() {
		let bindings: MapBindings = [("Foo", Value::int(1)), ("bar", Value::int(2))].into_iter().collect();
		assert_eq!(bindings.get(&BindingName::insensitive("foo")).unwrap(), Some(Value::int(1)));
		assert!(bindings.get(&BindingName::sensitive("foo")).unwrap().is_none());
		assert_eq!(bindings.get(&BindingName::sensitive("bar")).unwrap(), Some(Value::int(2)));
		assert!(bindings.get(&BindingName::insensitive("baz")).unwrap().is_none());
	}

	#[test]
	fn test_map_ambiguity() {
		let bindings: MapBindings = [("A", Value::int(1)), ("a", Value::int(2))].into_iter().collect();
		let err = bindings.get(&BindingName::insensitive("a")).unwrap_err();
		assert_eq!(err.code(), ErrorCode::AmbiguousBinding);
		assert_eq!(bindings.get(&BindingName::sensitive("A")).unwrap(), Some(Value::int(1)));
	}

	#[test]
	fn test_map_insert_refreshes_folding() {
		let mut bindings: MapBindings = [("x", Value::int(1))].into_iter().collect();
		assert!(bindings.get(&BindingName::insensitive("y")).unwrap().is_none());
		bindings.insert("Y", Value::int(2));
		assert_eq!(bindings.get(&BindingName::insensitive("y")).unwrap(), Some(Value::int(2)));
		bindings.insert("X", Value::int(3));
		assert_eq!(bindings.get(&BindingName::insensitive("x")).unwrap_err().code(), ErrorCode::AmbiguousBinding);
	}

	#[test]
	fn test_lazy_values_are_computed_once() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let bindings = LazyMapBindings::new().with("Table", move || {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(Value::bag(vec![Value::int(1)]))
		});
		assert!(bindings.get(&BindingName::insensitive("table")).unwrap().is_some());
		assert!(bindings.get(&BindingName::sensitive("Table")).unwrap().is_some());
		assert!(bindings.get(&BindingName::sensitive("table")).unwrap().is_none());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_lazy_ambiguity() {
		let bindings = LazyMapBindings::new().with("x", || Ok(Value::int(1))).with("X", || Ok(Value::int(2)));
		assert_eq!(bindings.get(&BindingName::insensitive("x")).unwrap_err().code(), ErrorCode::AmbiguousBinding);
	}
}
