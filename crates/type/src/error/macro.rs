// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Wraps a diagnostic into an `Error`
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::error::Error($diagnostic)
	};
	($diagnostic:expr, $fragment:expr) => {{
		let mut diagnostic = $diagnostic;
		diagnostic.with_fragment($fragment);
		$crate::error::Error(diagnostic)
	}};
}

#[macro_export]
macro_rules! err {
	($diagnostic:expr) => {
		Err($crate::error!($diagnostic))
	};
	($diagnostic:expr, $fragment:expr) => {
		Err($crate::error!($diagnostic, $fragment))
	};
}

#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error!($diagnostic))
	};
	($diagnostic:expr, $fragment:expr) => {
		return Err($crate::error!($diagnostic, $fragment))
	};
}

/// Creates an internal error diagnostic with automatic source location
/// capture
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
		$crate::error::diagnostic::internal::internal_with_context(
			format!($fmt, $($arg)*),
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
