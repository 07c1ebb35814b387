// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use crate::{Result, error::diagnostic::runtime::interrupted, return_error};

/// Cooperative cancellation flag polled by compilation and automaton construction.
#[derive(Clone)]
pub struct CancellationToken {
	cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
	pub fn new() -> Self {
		Self {
			cancelled: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Signal cancellation.
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	/// Check if cancellation was requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}

	/// Fails with an `Interrupted` error naming `phase` once cancellation was requested.
	pub fn check(&self, phase: &str) -> Result<()> {
		if self.is_cancelled() {
			return_error!(interrupted(phase));
		}
		Ok(())
	}
}

impl Default for CancellationToken {
	fn default() -> Self {
		Self::new()
	}
}

impl Debug for CancellationToken {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CancellationToken").field("cancelled", &self.is_cancelled()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorCode;

	#[test]
	fn test_clones_share_the_flag() {
		let token = CancellationToken::new();
		let clone = token.clone();
		assert!(clone.check("compile").is_ok());
		token.cancel();
		assert!(clone.is_cancelled());
		let err = clone.check("compile").unwrap_err();
		assert_eq!(err.code(), ErrorCode::Interrupted);
	}
}
