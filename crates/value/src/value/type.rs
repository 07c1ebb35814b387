// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Kind tag of a [`super::Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
	Missing,
	Null,
	Bool,
	Int,
	Float,
	Decimal,
	Date,
	Time,
	Timestamp,
	Symbol,
	String,
	Clob,
	Blob,
	List,
	Sexp,
	Struct,
	Bag,
}

impl Type {
	pub fn is_unknown(&self) -> bool {
		matches!(self, Type::Missing | Type::Null)
	}

	pub fn is_number(&self) -> bool {
		matches!(self, Type::Int | Type::Float | Type::Decimal)
	}

	pub fn is_text(&self) -> bool {
		matches!(self, Type::Symbol | Type::String)
	}

	pub fn is_lob(&self) -> bool {
		matches!(self, Type::Clob | Type::Blob)
	}

	pub fn is_temporal(&self) -> bool {
		matches!(self, Type::Date | Type::Time | Type::Timestamp)
	}

	/// List and sexp, the kinds with ordinal access.
	pub fn is_sequence(&self) -> bool {
		matches!(self, Type::List | Type::Sexp)
	}

	pub fn is_collection(&self) -> bool {
		matches!(self, Type::List | Type::Sexp | Type::Bag)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Type::Missing => "MISSING",
			Type::Null => "NULL",
			Type::Bool => "BOOL",
			Type::Int => "INT",
			Type::Float => "FLOAT",
			Type::Decimal => "DECIMAL",
			Type::Date => "DATE",
			Type::Time => "TIME",
			Type::Timestamp => "TIMESTAMP",
			Type::Symbol => "SYMBOL",
			Type::String => "STRING",
			Type::Clob => "CLOB",
			Type::Blob => "BLOB",
			Type::List => "LIST",
			Type::Sexp => "SEXP",
			Type::Struct => "STRUCT",
			Type::Bag => "BAG",
		};
		f.write_str(name)
	}
}

pub trait GetType {
	fn get_type(&self) -> Type;
}
