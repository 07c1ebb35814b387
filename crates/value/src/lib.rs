// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Runtime value model of the Quill evaluator.
//!
//! Holds the tagged [`Value`] with its facets, name resolution through [`Bindings`], the total
//! [`NaturalOrder`] over every value kind and the outer bag operators built on top of it.

pub mod bag;
pub mod binding;
pub mod compare;
pub mod error;
pub mod fragment;
pub mod util;
pub mod value;

pub use binding::{BindingCase, BindingName, Bindings};
pub use compare::{NaturalOrder, OrderedValue, UnknownOrder};
pub use error::{Diagnostic, Error, ErrorCode};
pub use fragment::Fragment;
pub use util::CancellationToken;
pub use value::{
	Date, Datum, GetType, Number, SeqIter, Sequence, StructOrdering, StructValue, Time, Timestamp, Type, Value,
};

pub type Result<T> = std::result::Result<T, Error>;
