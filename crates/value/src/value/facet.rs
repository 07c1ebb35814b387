// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Optional capabilities of a [`Value`], queried through [`Value::as_facet`].

use crate::{
	Result,
	binding::{BindingName, Bindings},
	value::{Datum, Sequence, StructValue, Value},
};

pub trait Facet: Sized {
	fn query(value: &Value) -> Option<Self>;
}

/// The value is a named child, such as a struct field or an indexed list element.
#[derive(Clone)]
pub struct Named(pub Value);

impl Facet for Named {
	fn query(value: &Value) -> Option<Self> {
		value.name().cloned().map(Named)
	}
}

/// Application-defined unique address, such as a row id.
#[derive(Clone)]
pub struct Addressed(pub Value);

impl Facet for Addressed {
	fn query(value: &Value) -> Option<Self> {
		value.address().cloned().map(Addressed)
	}
}

/// Integer-indexed access into a list or sexp. Bags never expose it.
#[derive(Clone)]
pub struct OrdinalBindings(Sequence);

impl Facet for OrdinalBindings {
	fn query(value: &Value) -> Option<Self> {
		match value.datum() {
			Datum::List(seq) | Datum::Sexp(seq) => Some(Self(seq.clone())),
			_ => None,
		}
	}
}

impl OrdinalBindings {
	/// Element at `ordinal`, named with the ordinal.
	pub fn get(&self, ordinal: i64) -> Result<Option<Value>> {
		let Ok(index) = usize::try_from(ordinal) else {
			return Ok(None);
		};
		Ok(self.0.get(index)?.map(|value| value.with_name(Value::int(ordinal))))
	}
}

/// Name-indexed access into a struct.
#[derive(Clone)]
pub struct FieldBindings(StructValue);

impl Facet for FieldBindings {
	fn query(value: &Value) -> Option<Self> {
		value.as_struct().cloned().map(Self)
	}
}

impl Bindings for FieldBindings {
	fn get(&self, name: &BindingName) -> Result<Option<Value>> {
		self.0.get(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::StructOrdering;

	#[test]
	fn test_bag_has_no_ordinal_access() {
		let bag = Value::bag(vec![Value::int(1)]);
		assert!(bag.as_facet::<OrdinalBindings>().is_none());
	}

	#[test]
	fn test_list_elements_are_named_by_ordinal() {
		let list = Value::list(vec![Value::int(10), Value::int(20)]);
		let ordinal = list.as_facet::<OrdinalBindings>().unwrap();
		let second = ordinal.get(1).unwrap().unwrap();
		assert_eq!(second, Value::int(20));
		assert_eq!(second.as_facet::<Named>().unwrap().0, Value::int(1));
		assert!(ordinal.get(2).unwrap().is_none());
		assert!(ordinal.get(-1).unwrap().is_none());
	}

	#[test]
	fn test_naming_keeps_address() {
		let value = Value::int(5).with_address(Value::string("row-1")).with_name(Value::string("x"));
		assert_eq!(value.as_facet::<Addressed>().unwrap().0, Value::string("row-1"));
		assert_eq!(value.as_facet::<Named>().unwrap().0, Value::string("x"));
		assert!(Value::int(5).as_facet::<Named>().is_none());
	}

	#[test]
	fn test_field_bindings() {
		let record = Value::structure(StructOrdering::Ordered, [("k", Value::bool(true))]);
		let fields = record.as_facet::<FieldBindings>().unwrap();
		assert_eq!(fields.get(&BindingName::insensitive("K")).unwrap(), Some(Value::bool(true)));
		assert!(Value::int(1).as_facet::<FieldBindings>().is_none());
	}
}
