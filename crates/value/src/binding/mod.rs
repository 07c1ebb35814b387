// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Name to value resolution.
//!
//! Every [`Bindings`] implementation fails with `AmbiguousBinding` when a case-insensitive name
//! matches two or more keys that differ only in case.

use std::{
	fmt::{Display, Formatter},
	hash::{Hash, Hasher},
	sync::Arc,
};

use crate::{Result, value::Value};

mod delegate;
mod map;

pub use delegate::{BlacklistBindings, EmptyBindings, FallbackBindings};
pub use map::{LazyMapBindings, MapBindings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingCase {
	Sensitive,
	Insensitive,
}

/// Name plus case mode. Insensitive names compare and hash on their lower-cased text.
#[derive(Debug, Clone)]
pub struct BindingName {
	text: Arc<str>,
	key: Arc<str>,
	case: BindingCase,
}

impl BindingName {
	pub fn new(text: impl Into<Arc<str>>, case: BindingCase) -> Self {
		let text = text.into();
		let key = match case {
			BindingCase::Sensitive => text.clone(),
			BindingCase::Insensitive => Arc::from(text.to_lowercase()),
		};
		Self {
			text,
			key,
			case,
		}
	}

	pub fn sensitive(text: impl Into<Arc<str>>) -> Self {
		Self::new(text, BindingCase::Sensitive)
	}

	pub fn insensitive(text: impl Into<Arc<str>>) -> Self {
		Self::new(text, BindingCase::Insensitive)
	}

	/// The name as written.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// The text used for comparison under this name's case mode.
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn case(&self) -> BindingCase {
		self.case
	}

	pub fn matches(&self, candidate: &str) -> bool {
		match self.case {
			BindingCase::Sensitive => &*self.text == candidate,
			BindingCase::Insensitive => *self.key == candidate.to_lowercase(),
		}
	}
}

impl PartialEq for BindingName {
	fn eq(&self, other: &Self) -> bool {
		self.case == other.case && self.key == other.key
	}
}

impl Eq for BindingName {}

impl Hash for BindingName {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.case.hash(state);
		self.key.hash(state);
	}
}

impl Display for BindingName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.case {
			BindingCase::Sensitive => write!(f, "\"{}\"", self.text),
			BindingCase::Insensitive => f.write_str(&self.text),
		}
	}
}

pub trait Bindings: Send + Sync {
	fn get(&self, name: &BindingName) -> Result<Option<Value>>;
}

impl<T: Bindings + ?Sized> Bindings for Arc<T> {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		(**self).get(name)
	}
}

pub fn empty() -> Arc<dyn Bindings> {
	Arc::new(EmptyBindings)
}

/// Tries `primary` first and falls back only when it has no binding; ambiguity in `primary`
/// propagates.
pub fn with_fallback(primary: Arc<dyn Bindings>, fallback: Arc<dyn Bindings>) -> Arc<dyn Bindings> {
	Arc::new(FallbackBindings::new(primary, fallback))
}

/// Hides `names` from `inner`.
pub fn blacklist<I, S>(inner: Arc<dyn Bindings>, names: I) -> Arc<dyn Bindings>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	Arc::new(BlacklistBindings::new(inner, names))
}
