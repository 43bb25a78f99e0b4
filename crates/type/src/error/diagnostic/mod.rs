// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::fragment::Fragment;

pub mod catalog;
pub mod internal;
pub mod render;
pub mod serialization;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub statement: Option<String>,
	pub message: String,
	pub column: Option<DiagnosticColumn>,
	pub fragment: Fragment,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

/// The field a diagnostic is about, when it concerns a single field of an
/// object (e.g. an unknown field name or a value of the wrong shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticColumn {
	pub name: String,
	pub kind: String,
}

impl Diagnostic {
	/// Attaches the statement text so the renderer can show the offending
	/// line. Applied recursively to the cause chain.
	pub fn with_statement(&mut self, statement: String) {
		if let Some(cause) = self.cause.as_mut() {
			cause.with_statement(statement.clone());
		}
		self.statement = Some(statement);
	}

	pub fn with_fragment(&mut self, fragment: Fragment) {
		self.fragment = fragment;
	}

	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}
}
