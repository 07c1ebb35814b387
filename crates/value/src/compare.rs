// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Total order over every value kind.
//!
//! Kinds are ranked `unknown < bool < number < date < time < timestamp < text < lob < list < sexp <
//! struct < bag`, with the unknowns optionally moved last. Within a rank values compare structurally.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_traits::FromPrimitive;

use crate::{
	Result, return_internal_error,
	value::{Datum, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOrder {
	#[default]
	First,
	Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Group {
	Unknown,
	Bool,
	Number,
	Date,
	Time,
	Timestamp,
	Text,
	Lob,
	List,
	Sexp,
	Struct,
	Bag,
}

impl Group {
	fn of(value: &Value) -> Self {
		match value.datum() {
			Datum::Missing | Datum::Null => Group::Unknown,
			Datum::Bool(_) => Group::Bool,
			Datum::Int(_) | Datum::Float(_) | Datum::Decimal(_) => Group::Number,
			Datum::Date(_) => Group::Date,
			Datum::Time(_) => Group::Time,
			Datum::Timestamp(_) => Group::Timestamp,
			Datum::Symbol(_) | Datum::String(_) => Group::Text,
			Datum::Clob(_) | Datum::Blob(_) => Group::Lob,
			Datum::List(_) => Group::List,
			Datum::Sexp(_) => Group::Sexp,
			Datum::Struct(_) => Group::Struct,
			Datum::Bag(_) => Group::Bag,
		}
	}
}

/// Numbers projected onto one ordered line: `NaN < -inf < finite < +inf`.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum NumberKey {
	NaN,
	NegativeInfinity,
	Finite(BigDecimal),
	PositiveInfinity,
}

impl NumberKey {
	fn of(datum: &Datum) -> Self {
		match datum {
			Datum::Int(v) => NumberKey::Finite(BigDecimal::from(*v)),
			Datum::Decimal(v) => NumberKey::Finite(v.as_ref().clone()),
			Datum::Float(v) if v.is_nan() => NumberKey::NaN,
			Datum::Float(v) if *v == f64::NEG_INFINITY => NumberKey::NegativeInfinity,
			Datum::Float(v) if *v == f64::INFINITY => NumberKey::PositiveInfinity,
			Datum::Float(v) => NumberKey::Finite(BigDecimal::from_f64(*v).unwrap_or_default()),
			_ => NumberKey::NaN,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NaturalOrder {
	unknowns: UnknownOrder,
}

impl NaturalOrder {
	pub const UNKNOWNS_FIRST: Self = Self {
		unknowns: UnknownOrder::First,
	};
	pub const UNKNOWNS_LAST: Self = Self {
		unknowns: UnknownOrder::Last,
	};

	pub fn new(unknowns: UnknownOrder) -> Self {
		Self {
			unknowns,
		}
	}

	/// Fails only when a lazy sequence inside either operand fails to materialize.
	pub fn compare(&self, left: &Value, right: &Value) -> Result<Ordering> {
		let (lg, rg) = (Group::of(left), Group::of(right));
		if lg != rg {
			return Ok(self.rank(lg).cmp(&self.rank(rg)));
		}
		match (left.datum(), right.datum()) {
			(Datum::Missing, Datum::Missing) | (Datum::Null, Datum::Null) => Ok(Ordering::Equal),
			(Datum::Missing, Datum::Null) => Ok(Ordering::Less),
			(Datum::Null, Datum::Missing) => Ok(Ordering::Greater),
			(Datum::Bool(l), Datum::Bool(r)) => Ok(l.cmp(r)),
			(Datum::Int(l), Datum::Int(r)) => Ok(l.cmp(r)),
			(Datum::Float(l), Datum::Float(r)) => Ok(compare_floats(*l, *r)),
			(l, r) if lg == Group::Number => Ok(NumberKey::of(l).cmp(&NumberKey::of(r))),
			(Datum::Date(l), Datum::Date(r)) => Ok(l.cmp(r)),
			(Datum::Time(l), Datum::Time(r)) => Ok(l.normalized_nanos().cmp(&r.normalized_nanos())),
			(Datum::Timestamp(l), Datum::Timestamp(r)) => Ok(l.cmp(r)),
			(Datum::String(l) | Datum::Symbol(l), Datum::String(r) | Datum::Symbol(r)) => Ok(l.cmp(r)),
			(Datum::Clob(l) | Datum::Blob(l), Datum::Clob(r) | Datum::Blob(r)) => Ok(l.as_ref().cmp(r.as_ref())),
			(Datum::List(l), Datum::List(r)) | (Datum::Sexp(l), Datum::Sexp(r)) => {
				self.compare_sequences(&l.materialize()?, &r.materialize()?)
			}
			(Datum::Bag(l), Datum::Bag(r)) => {
				let mut l = l.materialize()?.to_vec();
				let mut r = r.materialize()?.to_vec();
				self.sort(&mut l)?;
				self.sort(&mut r)?;
				self.compare_sequences(&l, &r)
			}
			(Datum::Struct(l), Datum::Struct(r)) => {
				let mut l = l.pairs()?;
				let mut r = r.pairs()?;
				self.sort_fields(&mut l)?;
				self.sort_fields(&mut r)?;
				for ((ln, lv), (rn, rv)) in l.iter().zip(r.iter()) {
					let ordering = ln.cmp(rn).then(self.compare(lv, rv)?);
					if ordering != Ordering::Equal {
						return Ok(ordering);
					}
				}
				Ok(l.len().cmp(&r.len()))
			}
			_ => return_internal_error!("no ordering between {:?} and {:?} values", lg, rg),
		}
	}

	pub fn equals(&self, left: &Value, right: &Value) -> Result<bool> {
		Ok(self.compare(left, right)? == Ordering::Equal)
	}

	/// Sorts in place; all values are forced first so the sort itself cannot fail.
	pub fn sort(&self, values: &mut [Value]) -> Result<()> {
		for value in values.iter() {
			value.force()?;
		}
		values.sort_by(|l, r| self.compare(l, r).unwrap_or(Ordering::Equal));
		Ok(())
	}

	fn sort_fields(&self, fields: &mut [(std::sync::Arc<str>, Value)]) -> Result<()> {
		for (_, value) in fields.iter() {
			value.force()?;
		}
		fields.sort_by(|(ln, lv), (rn, rv)| ln.cmp(rn).then_with(|| self.compare(lv, rv).unwrap_or(Ordering::Equal)));
		Ok(())
	}

	fn compare_sequences(&self, left: &[Value], right: &[Value]) -> Result<Ordering> {
		for (l, r) in left.iter().zip(right.iter()) {
			let ordering = self.compare(l, r)?;
			if ordering != Ordering::Equal {
				return Ok(ordering);
			}
		}
		Ok(left.len().cmp(&right.len()))
	}

	fn rank(&self, group: Group) -> u8 {
		match (group, self.unknowns) {
			(Group::Unknown, UnknownOrder::Last) => u8::MAX,
			(group, _) => group as u8,
		}
	}
}

fn compare_floats(left: f64, right: f64) -> Ordering {
	match (left.is_nan(), right.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Less,
		(false, true) => Ordering::Greater,
		(false, false) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
	}
}

/// A forced value ordered by [`NaturalOrder::UNKNOWNS_FIRST`], usable as a map or set key.
#[derive(Clone)]
pub struct OrderedValue(Value);

impl OrderedValue {
	pub fn new(value: Value) -> Result<Self> {
		value.force()?;
		Ok(Self(value))
	}

	pub fn value(&self) -> &Value {
		&self.0
	}

	pub fn into_inner(self) -> Value {
		self.0
	}
}

impl PartialEq for OrderedValue {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for OrderedValue {}

impl PartialOrd for OrderedValue {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for OrderedValue {
	fn cmp(&self, other: &Self) -> Ordering {
		NaturalOrder::UNKNOWNS_FIRST.compare(&self.0, &other.0).unwrap_or(Ordering::Equal)
	}
}

impl std::fmt::Debug for OrderedValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::{StructOrdering, Time};

	fn cmp(l: &Value, r: &Value) -> Ordering {
		NaturalOrder::default().compare(l, r).unwrap()
	}

	#[test]
	fn test_nan_sorts_before_negative_infinity() {
		assert_eq!(cmp(&Value::float(f64::NAN), &Value::float(f64::NEG_INFINITY)), Ordering::Less);
		assert_eq!(cmp(&Value::float(f64::NEG_INFINITY), &Value::int(i64::MIN)), Ordering::Less);
		assert_eq!(cmp(&Value::float(f64::INFINITY), &Value::decimal(BigDecimal::from(i64::MAX))), Ordering::Greater);
		assert_eq!(cmp(&Value::float(f64::NAN), &Value::decimal(BigDecimal::from(0))), Ordering::Less);
	}

	#[test]
	fn test_signed_zero_is_equal() {
		assert_eq!(cmp(&Value::float(-0.0), &Value::float(0.0)), Ordering::Equal);
		assert_eq!(cmp(&Value::float(-0.0), &Value::int(0)), Ordering::Equal);
	}

	#[test]
	fn test_numbers_compare_across_representations() {
		assert_eq!(cmp(&Value::int(1), &Value::float(1.0)), Ordering::Equal);
		assert_eq!(cmp(&Value::int(1), &Value::decimal(BigDecimal::from(1))), Ordering::Equal);
		assert_eq!(cmp(&Value::float(1.5), &Value::int(2)), Ordering::Less);
	}

	#[test]
	fn test_kind_groups() {
		let ordered = [
			Value::null(),
			Value::bool(false),
			Value::int(100),
			Value::date(2020, 1, 1).unwrap(),
			Value::time(Time::new(1, 0, 0, 0, 0, None).unwrap()),
			Value::string("a"),
			Value::blob(vec![0]),
			Value::list(vec![]),
			Value::sexp(vec![]),
			Value::empty_struct(),
			Value::bag(vec![]),
		];
		for pair in ordered.windows(2) {
			assert_eq!(cmp(&pair[0], &pair[1]), Ordering::Less, "{} < {}", pair[0], pair[1]);
		}
	}

	#[test]
	fn test_unknowns_last() {
		let order = NaturalOrder::UNKNOWNS_LAST;
		assert_eq!(order.compare(&Value::null(), &Value::bag(vec![])).unwrap(), Ordering::Greater);
		assert_eq!(order.compare(&Value::missing(), &Value::int(1)).unwrap(), Ordering::Greater);
	}

	#[test]
	fn test_missing_and_null_are_distinct() {
		assert_eq!(cmp(&Value::missing(), &Value::missing()), Ordering::Equal);
		assert_eq!(cmp(&Value::null(), &Value::null()), Ordering::Equal);
		assert_ne!(cmp(&Value::missing(), &Value::null()), Ordering::Equal);
	}

	#[test]
	fn test_text_and_lobs() {
		assert_eq!(cmp(&Value::symbol("abc"), &Value::string("abc")), Ordering::Equal);
		assert_eq!(cmp(&Value::string("ab"), &Value::string("abc")), Ordering::Less);
		assert_eq!(cmp(&Value::blob(vec![0xff]), &Value::blob(vec![0x01, 0x00])), Ordering::Greater);
		assert_eq!(cmp(&Value::clob(vec![1]), &Value::blob(vec![1, 0])), Ordering::Less);
	}

	#[test]
	fn test_every_kind_pair_is_ordered() {
		let values = vec![
			Value::missing(),
			Value::null(),
			Value::bool(true),
			Value::int(1),
			Value::float(1.5),
			Value::decimal(BigDecimal::from(2)),
			Value::date(2024, 2, 29).unwrap(),
			Value::time(Time::new(12, 0, 0, 0, 0, None).unwrap()),
			Value::timestamp(crate::value::Timestamp::utc_now()),
			Value::symbol("a"),
			Value::string("b"),
			Value::clob(vec![1]),
			Value::blob(vec![2]),
			Value::list(vec![Value::int(1)]),
			Value::sexp(vec![Value::int(1)]),
			Value::structure(StructOrdering::Ordered, [("a", Value::int(1))]),
			Value::bag(vec![Value::int(1)]),
		];
		let order = NaturalOrder::default();
		for left in &values {
			assert_eq!(order.compare(left, left).unwrap(), Ordering::Equal);
			for right in &values {
				let forward = order.compare(left, right).unwrap();
				assert_eq!(order.compare(right, left).unwrap(), forward.reverse());
			}
		}
	}

	#[test]
	fn test_time_ignores_offset_representation() {
		let utc = Value::time(Time::new(9, 0, 0, 0, 0, Some(0)).unwrap());
		let cet = Value::time(Time::new(10, 0, 0, 0, 3, Some(60)).unwrap());
		assert_eq!(cmp(&utc, &cet), Ordering::Equal);
	}

	#[test]
	fn test_lists_are_lexicographic() {
		let short = Value::list(vec![Value::int(1)]);
		let long = Value::list(vec![Value::int(1), Value::int(0)]);
		let bigger = Value::list(vec![Value::int(2)]);
		assert_eq!(cmp(&short, &long), Ordering::Less);
		assert_eq!(cmp(&long, &bigger), Ordering::Less);
	}

	#[test]
	fn test_bags_and_structs_ignore_order() {
		let l = Value::bag(vec![Value::int(2), Value::int(1)]);
		let r = Value::bag(vec![Value::int(1), Value::int(2)]);
		assert_eq!(cmp(&l, &r), Ordering::Equal);
		let l = Value::structure(StructOrdering::Unordered, [("b", Value::int(2)), ("a", Value::int(1))]);
		let r = Value::structure(StructOrdering::Ordered, [("a", Value::int(1)), ("b", Value::int(2))]);
		assert_eq!(cmp(&l, &r), Ordering::Equal);
		let r = Value::structure(StructOrdering::Ordered, [("a", Value::int(1)), ("b", Value::int(3))]);
		assert_eq!(cmp(&l, &r), Ordering::Less);
	}

	#[test]
	fn test_ordered_value_in_set() {
		let set: std::collections::BTreeSet<_> = [Value::int(1), Value::float(1.0), Value::null(), Value::missing()]
			.into_iter()
			.map(|v| OrderedValue::new(v).unwrap())
			.collect();
		assert_eq!(set.len(), 3);
		assert!(set.iter().next().unwrap().value().is_missing());
	}
}
