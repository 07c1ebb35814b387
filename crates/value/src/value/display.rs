// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use crate::value::{Datum, SeqIter, Value};

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self.datum() {
			Datum::Missing => f.write_str("MISSING"),
			Datum::Null => f.write_str("NULL"),
			Datum::Bool(value) => write!(f, "{}", value),
			Datum::Int(value) => write!(f, "{}", value),
			Datum::Float(value) => write!(f, "{:?}", value),
			Datum::Decimal(value) => write!(f, "{}", value),
			Datum::Date(value) => write!(f, "DATE '{}'", value),
			Datum::Time(value) => write!(f, "TIME '{}'", value),
			Datum::Timestamp(value) => write!(f, "TIMESTAMP '{}'", value),
			Datum::Symbol(value) => write!(f, "`{}`", value),
			Datum::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
			Datum::Clob(bytes) => write!(f, "{{{{\"{}\"}}}}", String::from_utf8_lossy(bytes)),
			Datum::Blob(bytes) => {
				f.write_str("{{")?;
				for byte in bytes.iter() {
					write!(f, "{:02x}", byte)?;
				}
				f.write_str("}}")
			}
			Datum::List(seq) => write_children(f, seq.iter(), "[", ", ", "]", false),
			Datum::Sexp(seq) => write_children(f, seq.iter(), "(", " ", ")", false),
			Datum::Bag(seq) => write_children(f, seq.iter(), "<<", ", ", ">>", false),
			Datum::Struct(value) => write_children(f, value.fields(), "{", ", ", "}", true),
		}
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		Display::fmt(self, f)
	}
}

fn write_children(
	f: &mut Formatter<'_>,
	children: SeqIter,
	open: &str,
	separator: &str,
	close: &str,
	named: bool,
) -> FmtResult {
	f.write_str(open)?;
	for (position, child) in children.enumerate() {
		if position > 0 {
			f.write_str(separator)?;
		}
		match child {
			Ok(child) if named => {
				let name = child.name().and_then(Value::as_text).unwrap_or_default();
				write!(f, "'{}': {}", name, child)?;
			}
			Ok(child) => write!(f, "{}", child)?,
			Err(err) => write!(f, "<error {}>", err.code())?,
		}
	}
	f.write_str(close)
}
