// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::{
	Result,
	error::diagnostic::operator::{divide_by_zero, integer_overflow, modulo_by_zero},
	return_error,
	value::{Datum, Value},
};

/// Numeric view of a value used by arithmetic and aggregation.
///
/// Binary operations promote along `Int < Float < Decimal`.
#[derive(Debug, Clone)]
pub enum Number {
	Int(i64),
	Float(f64),
	Decimal(BigDecimal),
}

impl Number {
	pub fn of(value: &Value) -> Option<Number> {
		match value.datum() {
			Datum::Int(v) => Some(Number::Int(*v)),
			Datum::Float(v) => Some(Number::Float(*v)),
			Datum::Decimal(v) => Some(Number::Decimal(v.as_ref().clone())),
			_ => None,
		}
	}

	pub fn into_value(self) -> Value {
		match self {
			Number::Int(v) => Value::int(v),
			Number::Float(v) => Value::float(v),
			Number::Decimal(v) => Value::from_datum(Datum::Decimal(Arc::new(v))),
		}
	}

	pub fn is_zero(&self) -> bool {
		match self {
			Number::Int(v) => *v == 0,
			Number::Float(v) => *v == 0.0,
			Number::Decimal(v) => v.is_zero(),
		}
	}

	pub fn to_f64(&self) -> f64 {
		match self {
			Number::Int(v) => *v as f64,
			Number::Float(v) => *v,
			Number::Decimal(v) => v.to_f64().unwrap_or(f64::NAN),
		}
	}

	fn rank(&self) -> u8 {
		match self {
			Number::Int(_) => 0,
			Number::Float(_) => 1,
			Number::Decimal(_) => 2,
		}
	}

	fn to_decimal(&self) -> Option<BigDecimal> {
		match self {
			Number::Int(v) => Some(BigDecimal::from(*v)),
			Number::Float(v) => BigDecimal::from_f64(*v),
			Number::Decimal(v) => Some(v.clone()),
		}
	}

	/// Brings both operands to the wider representation. A non-finite float stays a float.
	fn promote(self, other: Number) -> Promoted {
		match (self, other) {
			(Number::Int(l), Number::Int(r)) => Promoted::Int(l, r),
			(l, r) if l.rank().max(r.rank()) == 1 => Promoted::Float(l.to_f64(), r.to_f64()),
			(l, r) => match (l.to_decimal(), r.to_decimal()) {
				(Some(dl), Some(dr)) => Promoted::Decimal(dl, dr),
				_ => Promoted::Float(l.to_f64(), r.to_f64()),
			},
		}
	}

	pub fn add(self, rhs: Number) -> Result<Number> {
		match self.promote(rhs) {
			Promoted::Int(l, r) => match l.checked_add(r) {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("+")),
			},
			Promoted::Float(l, r) => Ok(Number::Float(l + r)),
			Promoted::Decimal(l, r) => Ok(Number::Decimal(l + r)),
		}
	}

	pub fn sub(self, rhs: Number) -> Result<Number> {
		match self.promote(rhs) {
			Promoted::Int(l, r) => match l.checked_sub(r) {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("-")),
			},
			Promoted::Float(l, r) => Ok(Number::Float(l - r)),
			Promoted::Decimal(l, r) => Ok(Number::Decimal(l - r)),
		}
	}

	pub fn mul(self, rhs: Number) -> Result<Number> {
		match self.promote(rhs) {
			Promoted::Int(l, r) => match l.checked_mul(r) {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("*")),
			},
			Promoted::Float(l, r) => Ok(Number::Float(l * r)),
			Promoted::Decimal(l, r) => Ok(Number::Decimal(l * r)),
		}
	}

	/// Integer division truncates toward zero.
	pub fn div(self, rhs: Number) -> Result<Number> {
		if rhs.is_zero() {
			return_error!(divide_by_zero());
		}
		match self.promote(rhs) {
			Promoted::Int(l, r) => match l.checked_div(r) {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("/")),
			},
			Promoted::Float(l, r) => Ok(Number::Float(l / r)),
			Promoted::Decimal(l, r) => Ok(Number::Decimal(l / r)),
		}
	}

	pub fn rem(self, rhs: Number) -> Result<Number> {
		if rhs.is_zero() {
			return_error!(modulo_by_zero());
		}
		match self.promote(rhs) {
			Promoted::Int(l, r) => match l.checked_rem(r) {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("%")),
			},
			Promoted::Float(l, r) => Ok(Number::Float(l % r)),
			Promoted::Decimal(l, r) => Ok(Number::Decimal(l % r)),
		}
	}

	pub fn neg(self) -> Result<Number> {
		match self {
			Number::Int(v) => match v.checked_neg() {
				Some(v) => Ok(Number::Int(v)),
				None => return_error!(integer_overflow("-")),
			},
			Number::Float(v) => Ok(Number::Float(-v)),
			Number::Decimal(v) => Ok(Number::Decimal(-v)),
		}
	}
}

enum Promoted {
	Int(i64, i64),
	Float(f64, f64),
	Decimal(BigDecimal, BigDecimal),
}
