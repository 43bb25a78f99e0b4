// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ops::Deref;

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

/// Source location attached to a diagnostic.
///
/// Catalog lookups are mostly issued by the compiler on behalf of a
/// statement; when it has a span for the name being resolved it passes it
/// down as a `Statement` fragment so the resulting error points at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fragment {
	#[default]
	None,
	Statement {
		text: String,
		line: StatementLine,
		column: StatementColumn,
	},
	Internal {
		text: String,
	},
}

impl Fragment {
	pub fn statement(text: impl Into<String>, line: u32, column: u32) -> Self {
		Fragment::Statement {
			text: text.into(),
			line: StatementLine(line),
			column: StatementColumn(column),
		}
	}

	pub fn internal(text: impl Into<String>) -> Self {
		Fragment::Internal {
			text: text.into(),
		}
	}

	pub fn text(&self) -> &str {
		match self {
			Fragment::None => "",
			Fragment::Statement {
				text,
				..
			} => text,
			Fragment::Internal {
				text,
			} => text,
		}
	}

	pub fn line(&self) -> Option<StatementLine> {
		match self {
			Fragment::Statement {
				line,
				..
			} => Some(*line),
			_ => None,
		}
	}

	pub fn column(&self) -> Option<StatementColumn> {
		match self {
			Fragment::Statement {
				column,
				..
			} => Some(*column),
			_ => None,
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Fragment::None)
	}
}
