// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use once_cell::sync::OnceCell;

use crate::{
	Result,
	binding::{BindingCase, BindingName, Bindings},
	error::diagnostic::binding::ambiguous_binding,
	return_error,
	value::{SeqIter, Sequence, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructOrdering {
	Ordered,
	Unordered,
}

/// Sequence of named values.
///
/// Field lookup indices are built on first lookup and shared by every clone.
#[derive(Clone)]
pub struct StructValue {
	inner: Arc<Inner>,
}

struct Inner {
	ordering: StructOrdering,
	fields: Sequence,
	index: OnceCell<FieldIndex>,
}

struct FieldIndex {
	sensitive: HashMap<Arc<str>, Value>,
	insensitive: HashMap<String, Vec<(Arc<str>, Value)>>,
}

impl StructValue {
	pub fn new<N, I>(ordering: StructOrdering, fields: I) -> Self
	where
		N: Into<Arc<str>>,
		I: IntoIterator<Item = (N, Value)>,
	{
		let fields = fields.into_iter().map(|(name, value)| value.with_name(Value::string(name))).collect();
		Self::from_named(ordering, Sequence::from_vec(fields))
	}

	/// Wraps a sequence whose elements already carry a text name facet.
	pub fn from_named(ordering: StructOrdering, fields: Sequence) -> Self {
		Self {
			inner: Arc::new(Inner {
				ordering,
				fields,
				index: OnceCell::new(),
			}),
		}
	}

	pub fn ordering(&self) -> StructOrdering {
		self.inner.ordering
	}

	/// Field values, each named with its field name.
	pub fn fields(&self) -> SeqIter {
		self.inner.fields.iter()
	}

	pub fn sequence(&self) -> &Sequence {
		&self.inner.fields
	}

	/// `(name, value)` pairs in declaration order; values lose their name facet.
	pub fn pairs(&self) -> Result<Vec<(Arc<str>, Value)>> {
		let fields = self.inner.fields.materialize()?;
		Ok(fields
			.iter()
			.filter_map(|field| {
				let name = field.name()?.as_text()?;
				Some((Arc::from(name), field.clone().unnamed()))
			})
			.collect())
	}

	pub fn len(&self) -> Result<usize> {
		self.inner.fields.len()
	}

	pub fn is_empty(&self) -> Result<bool> {
		self.inner.fields.is_empty()
	}

	fn index(&self) -> Result<&FieldIndex> {
		self.inner.index.get_or_try_init(|| {
			let fields = self.inner.fields.materialize()?;
			let mut sensitive: HashMap<Arc<str>, Value> = HashMap::with_capacity(fields.len());
			let mut insensitive: HashMap<String, Vec<(Arc<str>, Value)>> = HashMap::with_capacity(fields.len());
			for field in fields.iter() {
				let Some(name) = field.name().and_then(Value::as_text) else {
					continue;
				};
				let name: Arc<str> = Arc::from(name);
				sensitive.entry(name.clone()).or_insert_with(|| field.clone());
				let candidates = insensitive.entry(name.to_lowercase()).or_default();
				if !candidates.iter().any(|(candidate, _)| *candidate == name) {
					candidates.push((name, field.clone()));
				}
			}
			Ok(FieldIndex {
				sensitive,
				insensitive,
			})
		})
	}
}

impl Bindings for StructValue {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		let index = self.index()?;
		match name.case() {
			BindingCase::Sensitive => Ok(index.sensitive.get(name.text()).cloned()),
			BindingCase::Insensitive => match index.insensitive.get(name.key()) {
				None => Ok(None),
				Some(candidates) if candidates.len() == 1 => Ok(Some(candidates[0].1.clone())),
				Some(candidates) => {
					let names = candidates.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>();
					return_error!(ambiguous_binding(name.text(), names.as_slice()))
				}
			},
		}
	}
}
