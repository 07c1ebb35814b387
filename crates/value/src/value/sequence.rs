// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{Result, value::Value};

pub type SeqIter = Box<dyn Iterator<Item = Result<Value>> + Send>;

type Producer = Arc<dyn Fn() -> SeqIter + Send + Sync>;

/// Restartable producer of child values backing lists, sexps, bags and structs.
///
/// Every call to [`Sequence::iter`] re-runs the producer. [`Sequence::materialize`] runs it once and
/// keeps the result, after which iteration reads the cached values.
#[derive(Clone)]
pub struct Sequence {
	inner: Arc<Inner>,
}

struct Inner {
	producer: Option<Producer>,
	materialized: OnceCell<Arc<[Value]>>,
}

impl Sequence {
	pub fn empty() -> Self {
		Self::from_vec(Vec::new())
	}

	pub fn from_vec(values: Vec<Value>) -> Self {
		let materialized = OnceCell::new();
		let _ = materialized.set(Arc::from(values));
		Self {
			inner: Arc::new(Inner {
				producer: None,
				materialized,
			}),
		}
	}

	pub fn lazy<F>(producer: F) -> Self
	where
		F: Fn() -> SeqIter + Send + Sync + 'static,
	{
		Self {
			inner: Arc::new(Inner {
				producer: Some(Arc::new(producer)),
				materialized: OnceCell::new(),
			}),
		}
	}

	pub fn iter(&self) -> SeqIter {
		if let Some(values) = self.inner.materialized.get() {
			return iter_shared(values.clone());
		}
		match &self.inner.producer {
			Some(producer) => producer(),
			None => Box::new(std::iter::empty()),
		}
	}

	pub fn materialize(&self) -> Result<Arc<[Value]>> {
		self.inner
			.materialized
			.get_or_try_init(|| match &self.inner.producer {
				Some(producer) => producer().collect::<Result<Vec<_>>>().map(Arc::from),
				None => Ok(Arc::from(Vec::new())),
			})
			.cloned()
	}

	pub fn is_materialized(&self) -> bool {
		self.inner.materialized.get().is_some()
	}

	pub fn get(&self, index: usize) -> Result<Option<Value>> {
		Ok(self.materialize()?.get(index).cloned())
	}

	pub fn len(&self) -> Result<usize> {
		Ok(self.materialize()?.len())
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.len()? == 0)
	}
}

fn iter_shared(values: Arc<[Value]>) -> SeqIter {
	let len = values.len();
	Box::new((0..len).map(move |index| Ok(values[index].clone())))
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	fn counting(runs: Arc<AtomicUsize>) -> Sequence {
		Sequence::lazy(move || {
			runs.fetch_add(1, Ordering::SeqCst);
			Box::new((1..=3).map(|i| Ok(Value::int(i))))
		})
	}

	#[test]
	fn test_iteration_is_not_cached() {
		let runs = Arc::new(AtomicUsize::new(0));
		let seq = counting(runs.clone());
		assert_eq!(seq.iter().count(), 3);
		assert_eq!(seq.iter().count(), 3);
		assert_eq!(runs.load(Ordering::SeqCst), 2);
		assert!(!seq.is_materialized());
	}

	#[test]
	fn test_materialization_is_cached() {
		let runs = Arc::new(AtomicUsize::new(0));
		let seq = counting(runs.clone());
		assert_eq!(seq.len().unwrap(), 3);
		assert_eq!(seq.get(1).unwrap().unwrap().as_int(), Some(2));
		assert_eq!(seq.iter().count(), 3);
		assert_eq!(runs.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_failed_materialization_is_retried() {
		let runs = Arc::new(AtomicUsize::new(0));
		let counter = runs.clone();
		let seq = Sequence::lazy(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			let item: Result<Value> = crate::internal_err!("boom");
			Box::new(std::iter::once(item))
		});
		assert!(seq.materialize().is_err());
		assert!(seq.materialize().is_err());
		assert_eq!(runs.load(Ordering::SeqCst), 2);
	}
}
