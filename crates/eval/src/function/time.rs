// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use quill_value::Value;

use super::{CallResult, ExprFunction, FunctionSignature};
use crate::session::Session;

/// The session's current instant.
pub struct UtcNow {
	signature: FunctionSignature,
}

impl UtcNow {
	pub fn new() -> Self {
		Self {
			signature: FunctionSignature::new("utcnow", 0, 0),
		}
	}
}

impl ExprFunction for UtcNow {
	fn signature(&self) -> &FunctionSignature {
		&self.signature
	}

	fn call(&self, session: &Session, _: &[Value]) -> CallResult<Value> {
		Ok(Value::timestamp(session.now()))
	}
}
