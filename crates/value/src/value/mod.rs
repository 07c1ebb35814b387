// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;

mod display;
pub mod facet;
mod json;
pub mod number;
mod sequence;
mod structure;
pub mod temporal;
mod r#type;

pub use facet::{Addressed, Facet, FieldBindings, Named, OrdinalBindings};
pub use number::Number;
pub use r#type::{GetType, Type};
pub use sequence::{SeqIter, Sequence};
pub use structure::{StructOrdering, StructValue};
pub use temporal::{Date, Time, Timestamp};

use crate::{Result, compare::NaturalOrder};

static EMPTY_LIST: Lazy<Value> = Lazy::new(|| Value::from_datum(Datum::List(Sequence::empty())));
static EMPTY_SEXP: Lazy<Value> = Lazy::new(|| Value::from_datum(Datum::Sexp(Sequence::empty())));
static EMPTY_BAG: Lazy<Value> = Lazy::new(|| Value::from_datum(Datum::Bag(Sequence::empty())));
static EMPTY_STRUCT: Lazy<Value> = Lazy::new(|| {
	Value::from_datum(Datum::Struct(StructValue::from_named(StructOrdering::Unordered, Sequence::empty())))
});

/// Payload of a [`Value`].
#[derive(Clone)]
pub enum Datum {
	Missing,
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Decimal(Arc<BigDecimal>),
	Date(Date),
	Time(Time),
	Timestamp(Timestamp),
	Symbol(Arc<str>),
	String(Arc<str>),
	Clob(Arc<[u8]>),
	Blob(Arc<[u8]>),
	List(Sequence),
	Sexp(Sequence),
	Struct(StructValue),
	Bag(Sequence),
}

#[derive(Clone, Default)]
struct Facets {
	name: Option<Value>,
	address: Option<Value>,
}

/// A runtime value: a [`Datum`] plus the optional name and address facets.
///
/// Cloning is cheap; containers share their backing sequence.
#[derive(Clone)]
pub struct Value {
	datum: Datum,
	facets: Option<Arc<Facets>>,
}

impl Value {
	pub fn from_datum(datum: Datum) -> Self {
		Self {
			datum,
			facets: None,
		}
	}

	pub fn missing() -> Self {
		Self::from_datum(Datum::Missing)
	}

	pub fn null() -> Self {
		Self::from_datum(Datum::Null)
	}

	pub fn bool(value: bool) -> Self {
		Self::from_datum(Datum::Bool(value))
	}

	pub fn int(value: i64) -> Self {
		Self::from_datum(Datum::Int(value))
	}

	pub fn float(value: f64) -> Self {
		Self::from_datum(Datum::Float(value))
	}

	pub fn decimal(value: impl Into<BigDecimal>) -> Self {
		Self::from_datum(Datum::Decimal(Arc::new(value.into())))
	}

	pub fn date(year: i32, month: u32, day: u32) -> Result<Self> {
		Ok(Self::from_datum(Datum::Date(Date::new(year, month, day)?)))
	}

	pub fn time(time: Time) -> Self {
		Self::from_datum(Datum::Time(time))
	}

	pub fn timestamp(timestamp: Timestamp) -> Self {
		Self::from_datum(Datum::Timestamp(timestamp))
	}

	pub fn symbol(value: impl Into<Arc<str>>) -> Self {
		Self::from_datum(Datum::Symbol(value.into()))
	}

	pub fn string(value: impl Into<Arc<str>>) -> Self {
		Self::from_datum(Datum::String(value.into()))
	}

	pub fn clob(value: impl Into<Arc<[u8]>>) -> Self {
		Self::from_datum(Datum::Clob(value.into()))
	}

	pub fn blob(value: impl Into<Arc<[u8]>>) -> Self {
		Self::from_datum(Datum::Blob(value.into()))
	}

	pub fn list(values: Vec<Value>) -> Self {
		if values.is_empty() {
			return EMPTY_LIST.clone();
		}
		Self::from_datum(Datum::List(Sequence::from_vec(values)))
	}

	pub fn list_of(seq: Sequence) -> Self {
		Self::from_datum(Datum::List(seq))
	}

	pub fn sexp(values: Vec<Value>) -> Self {
		if values.is_empty() {
			return EMPTY_SEXP.clone();
		}
		Self::from_datum(Datum::Sexp(Sequence::from_vec(values)))
	}

	pub fn sexp_of(seq: Sequence) -> Self {
		Self::from_datum(Datum::Sexp(seq))
	}

	pub fn bag(values: Vec<Value>) -> Self {
		if values.is_empty() {
			return EMPTY_BAG.clone();
		}
		Self::from_datum(Datum::Bag(Sequence::from_vec(values)))
	}

	pub fn bag_of(seq: Sequence) -> Self {
		Self::from_datum(Datum::Bag(seq))
	}

	pub fn structure<N, I>(ordering: StructOrdering, fields: I) -> Self
	where
		N: Into<Arc<str>>,
		I: IntoIterator<Item = (N, Value)>,
	{
		Self::from_datum(Datum::Struct(StructValue::new(ordering, fields)))
	}

	pub fn struct_of(value: StructValue) -> Self {
		Self::from_datum(Datum::Struct(value))
	}

	pub fn empty_struct() -> Self {
		EMPTY_STRUCT.clone()
	}

	pub fn datum(&self) -> &Datum {
		&self.datum
	}

	pub fn into_datum(self) -> Datum {
		self.datum
	}

	pub fn is_missing(&self) -> bool {
		matches!(self.datum, Datum::Missing)
	}

	pub fn is_null(&self) -> bool {
		matches!(self.datum, Datum::Null)
	}

	pub fn is_unknown(&self) -> bool {
		matches!(self.datum, Datum::Missing | Datum::Null)
	}

	pub fn is_collection(&self) -> bool {
		matches!(self.datum, Datum::List(_) | Datum::Sexp(_) | Datum::Bag(_))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self.datum {
			Datum::Bool(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self.datum {
			Datum::Int(value) => Some(value),
			_ => None,
		}
	}

	/// Text of a string or symbol.
	pub fn as_text(&self) -> Option<&str> {
		match &self.datum {
			Datum::String(text) | Datum::Symbol(text) => Some(text),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match &self.datum {
			Datum::Clob(bytes) | Datum::Blob(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Backing sequence of a list, sexp or bag.
	pub fn as_sequence(&self) -> Option<&Sequence> {
		match &self.datum {
			Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => Some(seq),
			_ => None,
		}
	}

	pub fn as_struct(&self) -> Option<&StructValue> {
		match &self.datum {
			Datum::Struct(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_facet<F: Facet>(&self) -> Option<F> {
		F::query(self)
	}

	pub fn name(&self) -> Option<&Value> {
		self.facets.as_ref().and_then(|facets| facets.name.as_ref())
	}

	pub fn address(&self) -> Option<&Value> {
		self.facets.as_ref().and_then(|facets| facets.address.as_ref())
	}

	pub fn with_name(self, name: Value) -> Self {
		let mut facets = self.facets.as_deref().cloned().unwrap_or_default();
		facets.name = Some(name);
		Self {
			datum: self.datum,
			facets: Some(Arc::new(facets)),
		}
	}

	pub fn with_address(self, address: Value) -> Self {
		let mut facets = self.facets.as_deref().cloned().unwrap_or_default();
		facets.address = Some(address);
		Self {
			datum: self.datum,
			facets: Some(Arc::new(facets)),
		}
	}

	/// Drops the name facet, keeping any address.
	pub fn unnamed(self) -> Self {
		let Some(facets) = self.facets else {
			return self;
		};
		let facets = match facets.address.clone() {
			Some(address) => Some(Arc::new(Facets {
				name: None,
				address: Some(address),
			})),
			None => None,
		};
		Self {
			datum: self.datum,
			facets,
		}
	}

	/// Children of a collection, or the named field values of a struct. Scalars have none.
	pub fn children(&self) -> SeqIter {
		match &self.datum {
			Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => seq.iter(),
			Datum::Struct(value) => value.fields(),
			_ => Box::new(std::iter::empty()),
		}
	}

	/// Materializes every nested sequence so that ordering this value can no longer fail.
	pub fn force(&self) -> Result<()> {
		match &self.datum {
			Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => {
				for child in seq.materialize()?.iter() {
					child.force()?;
				}
			}
			Datum::Struct(value) => {
				for child in value.sequence().materialize()?.iter() {
					child.force()?;
				}
			}
			_ => {}
		}
		Ok(())
	}
}

impl GetType for Value {
	fn get_type(&self) -> Type {
		match &self.datum {
			Datum::Missing => Type::Missing,
			Datum::Null => Type::Null,
			Datum::Bool(_) => Type::Bool,
			Datum::Int(_) => Type::Int,
			Datum::Float(_) => Type::Float,
			Datum::Decimal(_) => Type::Decimal,
			Datum::Date(_) => Type::Date,
			Datum::Time(_) => Type::Time,
			Datum::Timestamp(_) => Type::Timestamp,
			Datum::Symbol(_) => Type::Symbol,
			Datum::String(_) => Type::String,
			Datum::Clob(_) => Type::Clob,
			Datum::Blob(_) => Type::Blob,
			Datum::List(_) => Type::List,
			Datum::Sexp(_) => Type::Sexp,
			Datum::Struct(_) => Type::Struct,
			Datum::Bag(_) => Type::Bag,
		}
	}
}

/// Equality under [`NaturalOrder`]; facets are ignored and values whose sequences fail to
/// materialize are unequal.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		NaturalOrder::default().equals(self, other).unwrap_or(false)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::string(value)
	}
}
