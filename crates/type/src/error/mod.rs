// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

use serde::{de, ser};

pub mod diagnostic;
mod r#macro;

use diagnostic::{Diagnostic, internal::INTERNAL_ERROR_CODE, render::DefaultRenderer, serialization};

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}

	/// True for errors raised on a broken catalog invariant rather than on
	/// bad input.
	pub fn is_internal(&self) -> bool {
		self.0.code == INTERNAL_ERROR_CODE
	}
}

impl std::error::Error for Error {}

impl de::Error for Error {
	fn custom<T: Display>(msg: T) -> Self {
		crate::error!(serialization::serde_deserialize_error(msg.to_string()))
	}
}

impl ser::Error for Error {
	fn custom<T: Display>(msg: T) -> Self {
		crate::error!(serialization::serde_serialize_error(msg.to_string()))
	}
}

impl From<postcard::Error> for Error {
	fn from(err: postcard::Error) -> Self {
		crate::error!(serialization::postcard_error(err))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ObjectId, error::diagnostic::catalog};

	#[test]
	fn test_display_renders_diagnostic() {
		let err = Error(catalog::object_not_found("ObjectType", ObjectId::from_u128(7)));
		let out = err.to_string();
		assert!(out.starts_with("error[CATALOG_006]"));
		assert!(!err.is_internal());
		assert_eq!(err.code(), "CATALOG_006");
	}

	#[test]
	fn test_postcard_error_maps_to_image_code() {
		let err: Error = postcard::Error::DeserializeUnexpectedEnd.into();
		assert_eq!(err.code(), "IMAGE_002");
	}
}
