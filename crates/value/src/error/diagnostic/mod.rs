// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::Serialize;

use super::{ErrorCategory, ErrorCode};
use crate::fragment::Fragment;

pub mod binding;
pub mod function;
pub mod internal;
pub mod like;
pub mod operator;
pub mod path;
pub mod query;
pub mod runtime;
pub mod value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
	pub code: ErrorCode,
	pub message: String,
	pub fragment: Fragment,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
	pub fn is_internal(&self) -> bool {
		self.code.category() == ErrorCategory::Internal
	}

	pub fn with_fragment(mut self, fragment: Fragment) -> Self {
		self.fragment = fragment;
		self
	}

	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}
}
