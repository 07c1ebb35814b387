// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Multiset operators.
//!
//! Each outer operator tables one side by multiplicity and streams the other, so the streamed side
//! stays lazy. Identity is equality under [`NaturalOrder`](crate::NaturalOrder).

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::{
	Result,
	compare::OrderedValue,
	error::diagnostic::query::unsupported_feature,
	return_error,
	value::{Datum, SeqIter, Sequence, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagOp {
	Union,
	Intersect,
	Except,
	OuterUnion,
	OuterIntersect,
	OuterExcept,
}

impl BagOp {
	pub fn as_str(&self) -> &'static str {
		match self {
			BagOp::Union => "UNION",
			BagOp::Intersect => "INTERSECT",
			BagOp::Except => "EXCEPT",
			BagOp::OuterUnion => "OUTER UNION",
			BagOp::OuterIntersect => "OUTER INTERSECT",
			BagOp::OuterExcept => "OUTER EXCEPT",
		}
	}
}

/// Applies `op` to two operands and returns the resulting bag.
///
/// Non-collection operands act as a one-element bag; `MISSING` acts as the empty bag.
pub fn apply(op: BagOp, distinct: bool, left: &Value, right: &Value) -> Result<Value> {
	let (left, right) = (operand(left), operand(right));
	let result = match op {
		BagOp::OuterUnion => outer_union(left, right),
		BagOp::OuterIntersect => outer_intersect(left, right),
		BagOp::OuterExcept => outer_except(left, right),
		BagOp::Union | BagOp::Intersect | BagOp::Except => return_error!(unsupported_feature(op.as_str())),
	};
	Ok(Value::bag_of(if distinct {
		self::distinct(result)
	} else {
		result
	}))
}

fn operand(value: &Value) -> Sequence {
	match value.datum() {
		Datum::Missing => Sequence::empty(),
		Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => seq.clone(),
		_ => Sequence::from_vec(vec![value.clone().unnamed()]),
	}
}

/// All of `left`, then each element of `right` that is not matched by a remaining occurrence in
/// `left`.
pub fn outer_union(left: Sequence, right: Sequence) -> Sequence {
	Sequence::lazy(move || {
		Box::new(OuterUnion {
			left: left.iter(),
			right: right.iter(),
			table: Multiplicity::default(),
			left_done: false,
		})
	})
}

/// Elements of `right` while `left` still holds an unmatched occurrence of them.
pub fn outer_intersect(left: Sequence, right: Sequence) -> Sequence {
	Sequence::lazy(move || Box::new(Tabled::new(left.clone(), right.iter(), true)))
}

/// Elements of `left` once `right`'s occurrences of them have been used up.
pub fn outer_except(left: Sequence, right: Sequence) -> Sequence {
	Sequence::lazy(move || Box::new(Tabled::new(right.clone(), left.iter(), false)))
}

/// Drops every element equal to one already produced.
pub fn distinct(input: Sequence) -> Sequence {
	Sequence::lazy(move || {
		let mut seen = BTreeSet::new();
		Box::new(input.iter().filter_map(move |item| {
			let value = match item {
				Ok(value) => value,
				Err(err) => return Some(Err(err)),
			};
			match OrderedValue::new(value.clone()) {
				Ok(key) => seen.insert(key).then_some(Ok(value)),
				Err(err) => Some(Err(err)),
			}
		}))
	})
}

#[derive(Default)]
struct Multiplicity(BTreeMap<OrderedValue, usize>);

impl Multiplicity {
	fn build(values: SeqIter) -> Result<Self> {
		let mut table = Self::default();
		for value in values {
			table.add(&value?)?;
		}
		trace!(distinct = table.0.len(), "bag multiplicity table built");
		Ok(table)
	}

	fn add(&mut self, value: &Value) -> Result<()> {
		*self.0.entry(OrderedValue::new(value.clone().unnamed())?).or_insert(0) += 1;
		Ok(())
	}

	/// Consumes one occurrence of `value`, reporting whether one was left.
	fn take(&mut self, value: &Value) -> Result<bool> {
		let key = OrderedValue::new(value.clone().unnamed())?;
		match self.0.get_mut(&key) {
			Some(count) if *count > 0 => {
				*count -= 1;
				Ok(true)
			}
			_ => Ok(false),
		}
	}
}

struct OuterUnion {
	left: SeqIter,
	right: SeqIter,
	table: Multiplicity,
	left_done: bool,
}

impl Iterator for OuterUnion {
	type Item = Result<Value>;

	fn next(&mut self) -> Option<Self::Item> {
		if !self.left_done {
			match self.left.next() {
				Some(Ok(value)) => {
					return Some(self.table.add(&value).map(|_| value));
				}
				Some(Err(err)) => return Some(Err(err)),
				None => {
					trace!(distinct = self.table.0.len(), "bag multiplicity table built");
					self.left_done = true;
				}
			}
		}
		loop {
			let value = match self.right.next()? {
				Ok(value) => value,
				Err(err) => return Some(Err(err)),
			};
			match self.table.take(&value) {
				Ok(true) => continue,
				Ok(false) => return Some(Ok(value)),
				Err(err) => return Some(Err(err)),
			}
		}
	}
}

/// Streams `stream`, keeping an element when consuming it from the table of `tabled` succeeds
/// (`keep_matched`) or fails (`!keep_matched`).
struct Tabled {
	tabled: Option<Sequence>,
	stream: SeqIter,
	table: Multiplicity,
	keep_matched: bool,
}

impl Tabled {
	fn new(tabled: Sequence, stream: SeqIter, keep_matched: bool) -> Self {
		Self {
			tabled: Some(tabled),
			stream,
			table: Multiplicity::default(),
			keep_matched,
		}
	}
}

impl Iterator for Tabled {
	type Item = Result<Value>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(tabled) = self.tabled.take() {
			match Multiplicity::build(tabled.iter()) {
				Ok(table) => self.table = table,
				Err(err) => return Some(Err(err)),
			}
		}
		loop {
			let value = match self.stream.next()? {
				Ok(value) => value,
				Err(err) => return Some(Err(err)),
			};
			match self.table.take(&value) {
				Ok(matched) if matched == self.keep_matched => return Some(Ok(value)),
				Ok(_) => continue,
				Err(err) => return Some(Err(err)),
			}
		}
	}
}
