// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::error::Error($diagnostic)
	};
}

#[macro_export]
macro_rules! err {
	($diagnostic:expr) => {
		Err($crate::error::Error($diagnostic))
	};
}

#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error::Error($diagnostic))
	};
}

/// Creates an internal error diagnostic capturing the call site.
#[macro_export]
macro_rules! internal_error {
	($reason:expr) => {
		$crate::error::diagnostic::internal::internal_with_context(
			$reason,
			file!(),
			line!(),
			column!(),
			{
				fn f() {}
				fn type_name_of<T>(_: T) -> &'static str {
					std::any::type_name::<T>()
				}
				let name = type_name_of(f);
				&name[..name.len() - 3]
			},
			module_path!(),
		)
	};
	($fmt:expr, $($arg:tt)*) => {
		$crate::internal_error!(format!($fmt, $($arg)*))
	};
}

#[macro_export]
macro_rules! internal_err {
	($reason:expr) => {
		Err($crate::error::Error($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		Err($crate::error::Error($crate::internal_error!($fmt, $($arg)*)))
	};
}

#[macro_export]
macro_rules! return_internal_error {
	($reason:expr) => {
		return Err($crate::error::Error($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		return Err($crate::error::Error($crate::internal_error!($fmt, $($arg)*)))
	};
}
