// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Accumulators behind `COUNT`, `SUM`, `AVG`, `MIN` and `MAX`.
//!
//! Unknown inputs are skipped by every function except `COUNT(*)`.

use std::{cmp::Ordering, collections::BTreeSet};

use bigdecimal::BigDecimal;
use quill_value::{
	GetType, NaturalOrder, Number, OrderedValue, Result, Value,
	error::diagnostic::function::invalid_argument_type, return_error,
};

use crate::ast::AggregateFunc;

pub trait Accumulator: Send {
	fn accumulate(&mut self, value: &Value) -> Result<()>;

	fn finish(&self) -> Result<Value>;
}

/// Fresh accumulator for `func`. `count_star` counts rows instead of known values.
pub fn accumulator(func: AggregateFunc, distinct: bool, count_star: bool) -> Box<dyn Accumulator> {
	let inner: Box<dyn Accumulator> = match func {
		AggregateFunc::Count => Box::new(Count {
			rows: count_star,
			count: 0,
		}),
		AggregateFunc::Sum => Box::new(Sum {
			sum: None,
		}),
		AggregateFunc::Avg => Box::new(Avg {
			sum: None,
			count: 0,
		}),
		AggregateFunc::Min => Box::new(Extreme {
			keep: Ordering::Less,
			current: None,
		}),
		AggregateFunc::Max => Box::new(Extreme {
			keep: Ordering::Greater,
			current: None,
		}),
	};
	if distinct {
		Box::new(Distinct {
			seen: BTreeSet::new(),
			inner,
		})
	} else {
		inner
	}
}

/// Feeds every value of `values` into a fresh accumulator.
pub fn aggregate<'a>(func: AggregateFunc, distinct: bool, values: impl IntoIterator<Item = &'a Value>) -> Result<Value> {
	let mut acc = accumulator(func, distinct, false);
	for value in values {
		acc.accumulate(value)?;
	}
	acc.finish()
}

struct Count {
	rows: bool,
	count: i64,
}

impl Accumulator for Count {
	fn accumulate(&mut self, value: &Value) -> Result<()> {
		if self.rows || !value.is_unknown() {
			self.count += 1;
		}
		Ok(())
	}

	fn finish(&self) -> Result<Value> {
		Ok(Value::int(self.count))
	}
}

fn number(func: AggregateFunc, value: &Value) -> Result<Number> {
	match Number::of(value) {
		Some(n) => Ok(n),
		None => return_error!(invalid_argument_type(func.as_str(), 1, "number", value.get_type())),
	}
}

struct Sum {
	sum: Option<Number>,
}

impl Accumulator for Sum {
	fn accumulate(&mut self, value: &Value) -> Result<()> {
		if value.is_unknown() {
			return Ok(());
		}
		let n = number(AggregateFunc::Sum, value)?;
		self.sum = Some(match self.sum.take() {
			Some(sum) => sum.add(n)?,
			None => n,
		});
		Ok(())
	}

	fn finish(&self) -> Result<Value> {
		Ok(self.sum.clone().map(Number::into_value).unwrap_or_else(Value::null))
	}
}

struct Avg {
	sum: Option<Number>,
	count: i64,
}

impl Accumulator for Avg {
	fn accumulate(&mut self, value: &Value) -> Result<()> {
		if value.is_unknown() {
			return Ok(());
		}
		let n = number(AggregateFunc::Avg, value)?;
		self.sum = Some(match self.sum.take() {
			Some(sum) => sum.add(n)?,
			None => n,
		});
		self.count += 1;
		Ok(())
	}

	/// Exact inputs average as decimals; floats stay floats.
	fn finish(&self) -> Result<Value> {
		let Some(sum) = self.sum.clone() else {
			return Ok(Value::null());
		};
		let sum = match sum {
			Number::Int(v) => Number::Decimal(BigDecimal::from(v)),
			other => other,
		};
		Ok(sum.div(Number::Int(self.count))?.into_value())
	}
}

struct Extreme {
	keep: Ordering,
	current: Option<Value>,
}

impl Accumulator for Extreme {
	fn accumulate(&mut self, value: &Value) -> Result<()> {
		if value.is_unknown() {
			return Ok(());
		}
		let replace = match &self.current {
			None => true,
			Some(current) => NaturalOrder::default().compare(value, current)? == self.keep,
		};
		if replace {
			self.current = Some(value.clone().unnamed());
		}
		Ok(())
	}

	fn finish(&self) -> Result<Value> {
		Ok(self.current.clone().unwrap_or_else(Value::null))
	}
}

struct Distinct {
	seen: BTreeSet<OrderedValue>,
	inner: Box<dyn Accumulator>,
}

impl Accumulator for Distinct {
	fn accumulate(&mut self, value: &Value) -> Result<()> {
		if value.is_unknown() {
			return self.inner.accumulate(value);
		}
		if self.seen.insert(OrderedValue::new(value.clone())?) {
			self.inner.accumulate(value)?;
		}
		Ok(())
	}

	fn finish(&self) -> Result<Value> {
		self.inner.finish()
	}
}
