// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde_json::{Map, Number as JsonNumber, Value as Json};

use crate::{
	Result,
	error::diagnostic::value::invalid_external_value,
	return_error,
	value::{Datum, StructOrdering, Value},
};

impl Value {
	/// Reads the external interchange format. Objects become ordered structs.
	pub fn from_json(json: &Json) -> Value {
		match json {
			Json::Null => Value::null(),
			Json::Bool(value) => Value::bool(*value),
			Json::Number(number) => from_json_number(number),
			Json::String(text) => Value::string(text.as_str()),
			Json::Array(items) => Value::list(items.iter().map(Value::from_json).collect()),
			Json::Object(fields) => Value::structure(
				StructOrdering::Ordered,
				fields.iter().map(|(name, value)| (name.as_str(), Value::from_json(value))),
			),
		}
	}

	/// Writes the external interchange format. Missing struct fields are omitted and a
	/// top-level `MISSING` becomes `null`.
	pub fn to_json(&self) -> Result<Json> {
		Ok(match self.datum() {
			Datum::Missing | Datum::Null => Json::Null,
			Datum::Bool(value) => Json::Bool(*value),
			Datum::Int(value) => Json::Number((*value).into()),
			Datum::Float(value) => match JsonNumber::from_f64(*value) {
				Some(number) => Json::Number(number),
				None => return_error!(invalid_external_value(&format!("float {} has no JSON form", value))),
			},
			Datum::Decimal(value) => match value.to_f64().and_then(JsonNumber::from_f64) {
				Some(number) if BigDecimal::from_str(&number.to_string()).ok().as_ref() == Some(value.as_ref()) => {
					Json::Number(number)
				}
				_ => Json::String(value.to_string()),
			},
			Datum::Date(value) => Json::String(value.to_string()),
			Datum::Time(value) => Json::String(value.to_string()),
			Datum::Timestamp(value) => Json::String(value.to_string()),
			Datum::Symbol(text) | Datum::String(text) => Json::String(text.to_string()),
			Datum::Clob(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
			Datum::Blob(bytes) => Json::Array(bytes.iter().map(|b| Json::Number((*b).into())).collect()),
			Datum::List(seq) | Datum::Sexp(seq) | Datum::Bag(seq) => {
				let mut items = Vec::new();
				for item in seq.iter() {
					items.push(item?.to_json()?);
				}
				Json::Array(items)
			}
			Datum::Struct(record) => {
				let mut fields = Map::new();
				for (name, value) in record.pairs()? {
					if value.is_missing() {
						continue;
					}
					fields.insert(name.to_string(), value.to_json()?);
				}
				Json::Object(fields)
			}
		})
	}
}

fn from_json_number(number: &JsonNumber) -> Value {
	if let Some(value) = number.as_i64() {
		return Value::int(value);
	}
	if let Some(value) = number.as_u64() {
		return Value::decimal(BigDecimal::from(value));
	}
	Value::float(number.as_f64().unwrap_or(f64::NAN))
}
