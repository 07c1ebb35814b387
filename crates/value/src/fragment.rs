// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementLine(pub u32);

impl Deref for StatementLine {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementColumn(pub u32);

impl Deref for StatementColumn {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Source position of a syntax node, carried into diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fragment {
	#[default]
	None,
	Statement {
		text: String,
		line: StatementLine,
		column: StatementColumn,
	},
}

impl Fragment {
	pub fn statement(text: impl Into<String>, line: u32, column: u32) -> Self {
		Self::Statement {
			text: text.into(),
			line: StatementLine(line),
			column: StatementColumn(column),
		}
	}

	pub fn at(line: u32, column: u32) -> Self {
		Self::statement(String::new(), line, column)
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Fragment::None)
	}

	pub fn text(&self) -> &str {
		match self {
			Fragment::None => "",
			Fragment::Statement {
				text,
				..
			} => text,
		}
	}

	pub fn line(&self) -> Option<StatementLine> {
		match self {
			Fragment::None => None,
			Fragment::Statement {
				line,
				..
			} => Some(*line),
		}
	}

	pub fn column(&self) -> Option<StatementColumn> {
		match self {
			Fragment::None => None,
			Fragment::Statement {
				column,
				..
			} => Some(*column),
		}
	}
}

impl Display for Fragment {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Fragment::None => Ok(()),
			Fragment::Statement {
				text,
				line,
				column,
			} if text.is_empty() => write!(f, "line {}, column {}", line.0, column.0),
			Fragment::Statement {
				text,
				line,
				column,
			} => write!(f, "'{}' at line {}, column {}", text, line.0, column.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_none_has_no_position() {
		let fragment = Fragment::None;
		assert!(fragment.is_none());
		assert_eq!(fragment.line(), None);
		assert_eq!(fragment.to_string(), "");
	}

	#[test]
	fn test_statement_position() {
		let fragment = Fragment::statement("a.b", 3, 7);
		assert_eq!(fragment.line(), Some(StatementLine(3)));
		assert_eq!(*fragment.column().unwrap(), 7);
		assert_eq!(fragment.to_string(), "'a.b' at line 3, column 7");
		assert_eq!(Fragment::at(1, 2).to_string(), "line 1, column 2");
	}
}
