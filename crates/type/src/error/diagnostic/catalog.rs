// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{ObjectId, error::diagnostic::Diagnostic, fragment::Fragment, util::add_a};

/// An object with the same name (or global name) is already in the catalog
pub fn duplicate_name(fragment: Fragment, verbose_name: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_001".to_string(),
		statement: None,
		message: format!("{} already exists", verbose_name),
		column: None,
		fragment,
		label: Some("duplicate name".to_string()),
		help: Some("choose a different name or drop the existing object first".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn duplicate_id(kind: &str, id: ObjectId) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_002".to_string(),
		statement: None,
		message: format!("{} ('{}') is already present in the schema", kind, id),
		column: None,
		fragment: Fragment::None,
		label: Some("duplicate object id".to_string()),
		help: None,
		notes: vec!["object ids are unique across every layer of a catalog".to_string()],
		cause: None,
	}
}

pub fn unknown_module(fragment: Fragment, module: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_003".to_string(),
		statement: None,
		message: format!("module '{}' is not in this schema", module),
		column: None,
		fragment,
		label: Some("unknown module".to_string()),
		help: Some(format!("create module '{}' before adding objects to it", module)),
		notes: vec![],
		cause: None,
	}
}

/// Name lookup found nothing. `label` is the display name of the kind that
/// was looked for, or "schema item" when any kind would do.
pub fn invalid_reference(fragment: Fragment, label: &str, name: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_004".to_string(),
		statement: None,
		message: format!("{} '{}' does not exist", label, name),
		column: None,
		fragment,
		label: Some(format!("unknown {}", label)),
		help: Some("check the spelling and the module the name is resolved in".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn wrong_type(fragment: Fragment, name: &str, actual: &str, expected: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_005".to_string(),
		statement: None,
		message: format!("'{}' exists, but is {}, not {}", name, add_a(actual), add_a(expected)),
		column: None,
		fragment,
		label: Some(format!("expected {}", add_a(expected))),
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// A mutation targeted an object the catalog does not hold
pub fn object_not_found(kind: &str, id: ObjectId) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_006".to_string(),
		statement: None,
		message: format!("{} ('{}') is not present in the schema", kind, id),
		column: None,
		fragment: Fragment::None,
		label: Some("object not found".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn unknown_object_id(id: ObjectId) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_007".to_string(),
		statement: None,
		message: format!("reference to a non-existent schema item {}", id),
		column: None,
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
