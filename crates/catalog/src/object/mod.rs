// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strata_type::ObjectId;

mod class;
mod field;
mod value;

pub use class::{BUILTIN_FIELD, INTERNAL_FIELD, NAME_FIELD, SchemaClass, schema_class};
pub use field::{FieldDef, FieldType};
pub use value::{
	Datum, Expression, ExpressionDatum, FieldValue, ObjectData, RefIds, datum_at, reduce, referenced_ids, restore,
};

/// The closed set of schema object kinds.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
	Module = 0,
	Extension = 1,
	Migration = 2,
	PseudoType = 3,
	Role = 4,
	Branch = 5,
	ExtensionPackage = 6,
	ObjectType = 7,
	ScalarType = 8,
	Array = 9,
	Tuple = 10,
	Property = 11,
	Link = 12,
	Function = 13,
	Operator = 14,
	Parameter = 15,
	Constraint = 16,
	Cast = 17,
	Annotation = 18,
	Index = 19,
}

impl ObjectKind {
	pub const ALL: [ObjectKind; 20] = [
		ObjectKind::Module,
		ObjectKind::Extension,
		ObjectKind::Migration,
		ObjectKind::PseudoType,
		ObjectKind::Role,
		ObjectKind::Branch,
		ObjectKind::ExtensionPackage,
		ObjectKind::ObjectType,
		ObjectKind::ScalarType,
		ObjectKind::Array,
		ObjectKind::Tuple,
		ObjectKind::Property,
		ObjectKind::Link,
		ObjectKind::Function,
		ObjectKind::Operator,
		ObjectKind::Parameter,
		ObjectKind::Constraint,
		ObjectKind::Cast,
		ObjectKind::Annotation,
		ObjectKind::Index,
	];

	/// Stable identifier used in catalog images.
	pub fn name(&self) -> &'static str {
		match self {
			ObjectKind::Module => "Module",
			ObjectKind::Extension => "Extension",
			ObjectKind::Migration => "Migration",
			ObjectKind::PseudoType => "PseudoType",
			ObjectKind::Role => "Role",
			ObjectKind::Branch => "Branch",
			ObjectKind::ExtensionPackage => "ExtensionPackage",
			ObjectKind::ObjectType => "ObjectType",
			ObjectKind::ScalarType => "ScalarType",
			ObjectKind::Array => "Array",
			ObjectKind::Tuple => "Tuple",
			ObjectKind::Property => "Property",
			ObjectKind::Link => "Link",
			ObjectKind::Function => "Function",
			ObjectKind::Operator => "Operator",
			ObjectKind::Parameter => "Parameter",
			ObjectKind::Constraint => "Constraint",
			ObjectKind::Cast => "Cast",
			ObjectKind::Annotation => "Annotation",
			ObjectKind::Index => "Index",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.name() == name)
	}

	/// Human readable name, as used in diagnostics.
	pub fn display_name(&self) -> &'static str {
		match self {
			ObjectKind::Module => "module",
			ObjectKind::Extension => "extension",
			ObjectKind::Migration => "migration",
			ObjectKind::PseudoType => "pseudo type",
			ObjectKind::Role => "role",
			ObjectKind::Branch => "branch",
			ObjectKind::ExtensionPackage => "extension package",
			ObjectKind::ObjectType => "object type",
			ObjectKind::ScalarType => "scalar type",
			ObjectKind::Array => "array type",
			ObjectKind::Tuple => "tuple type",
			ObjectKind::Property => "property",
			ObjectKind::Link => "link",
			ObjectKind::Function => "function",
			ObjectKind::Operator => "operator",
			ObjectKind::Parameter => "parameter",
			ObjectKind::Constraint => "constraint",
			ObjectKind::Cast => "cast",
			ObjectKind::Annotation => "annotation",
			ObjectKind::Index => "index",
		}
	}

	/// Kinds that live in the cross-branch global layer.
	pub fn is_global(&self) -> bool {
		matches!(self, ObjectKind::Role | ObjectKind::Branch | ObjectKind::ExtensionPackage)
	}

	/// Kinds whose name is a module-qualified `QualName`. Every other kind is
	/// globally named and unique per kind.
	pub fn is_qualified(&self) -> bool {
		!matches!(
			self,
			ObjectKind::Module
				| ObjectKind::Extension
				| ObjectKind::Migration
				| ObjectKind::PseudoType
				| ObjectKind::Role | ObjectKind::Branch
				| ObjectKind::ExtensionPackage
		)
	}

	/// Kinds the compiler creates on its own; hidden from iteration by
	/// default.
	pub fn is_internal(&self) -> bool {
		matches!(self, ObjectKind::Array | ObjectKind::Tuple | ObjectKind::Parameter)
	}

	/// Overloadable callables, indexed by their overload-erased short name.
	pub fn has_shortname(&self) -> bool {
		matches!(self, ObjectKind::Function | ObjectKind::Operator)
	}

	pub fn as_set(&self) -> KindSet {
		KindSet::from_bits_retain(1 << (*self as u8))
	}
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

bitflags! {
	/// A set of object kinds, used as a type filter.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
	pub struct KindSet: u32 {
		const MODULE = 1 << 0;
		const EXTENSION = 1 << 1;
		const MIGRATION = 1 << 2;
		const PSEUDO_TYPE = 1 << 3;
		const ROLE = 1 << 4;
		const BRANCH = 1 << 5;
		const EXTENSION_PACKAGE = 1 << 6;
		const OBJECT_TYPE = 1 << 7;
		const SCALAR_TYPE = 1 << 8;
		const ARRAY = 1 << 9;
		const TUPLE = 1 << 10;
		const PROPERTY = 1 << 11;
		const LINK = 1 << 12;
		const FUNCTION = 1 << 13;
		const OPERATOR = 1 << 14;
		const PARAMETER = 1 << 15;
		const CONSTRAINT = 1 << 16;
		const CAST = 1 << 17;
		const ANNOTATION = 1 << 18;
		const INDEX = 1 << 19;

		const POINTER = Self::PROPERTY.bits() | Self::LINK.bits();
		const TYPE = Self::OBJECT_TYPE.bits()
			| Self::SCALAR_TYPE.bits()
			| Self::ARRAY.bits()
			| Self::TUPLE.bits()
			| Self::PSEUDO_TYPE.bits();
		const GLOBAL = Self::ROLE.bits() | Self::BRANCH.bits() | Self::EXTENSION_PACKAGE.bits();
	}
}

impl KindSet {
	pub fn contains_kind(&self, kind: ObjectKind) -> bool {
		self.contains(kind.as_set())
	}

	pub fn kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
		ObjectKind::ALL.into_iter().filter(|kind| self.contains_kind(*kind))
	}

	/// The only kind in the set, if there is exactly one.
	pub fn single(&self) -> Option<ObjectKind> {
		let mut kinds = self.kinds();
		match (kinds.next(), kinds.next()) {
			(Some(kind), None) => Some(kind),
			_ => None,
		}
	}

	/// Every kind in the set is module-qualified.
	pub fn is_qualified(&self) -> bool {
		!self.is_empty() && self.kinds().all(|kind| kind.is_qualified())
	}

	/// Every kind in the set is globally named.
	pub fn is_globally_named(&self) -> bool {
		!self.is_empty() && self.kinds().all(|kind| !kind.is_qualified())
	}

	/// Human readable name of the set, as used in diagnostics.
	pub fn display_name(&self) -> &'static str {
		if let Some(kind) = self.single() {
			return kind.display_name();
		}
		if *self == KindSet::TYPE {
			"type"
		} else if *self == KindSet::POINTER {
			"pointer"
		} else {
			"schema item"
		}
	}
}

impl From<ObjectKind> for KindSet {
	fn from(kind: ObjectKind) -> Self {
		kind.as_set()
	}
}

/// Handle to a catalog object: its identity plus its kind. Field data is
/// always read through a catalog value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Object {
	pub id: ObjectId,
	pub kind: ObjectKind,
}

impl Object {
	pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
		Self {
			id,
			kind,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_kind_names_round_trip() {
		for kind in ObjectKind::ALL {
			assert_eq!(ObjectKind::from_name(kind.name()), Some(kind));
		}
		assert_eq!(ObjectKind::from_name("Table"), None);
	}

	#[test]
	fn test_kind_set_bits_match_discriminants() {
		assert_eq!(ObjectKind::Module.as_set(), KindSet::MODULE);
		assert_eq!(ObjectKind::Index.as_set(), KindSet::INDEX);
		assert_eq!(ObjectKind::ExtensionPackage.as_set(), KindSet::EXTENSION_PACKAGE);
		assert_eq!(KindSet::GLOBAL.kinds().collect::<Vec<_>>(), vec![
			ObjectKind::Role,
			ObjectKind::Branch,
			ObjectKind::ExtensionPackage
		]);
	}

	#[test]
	fn test_kind_set_display_names() {
		assert_eq!(KindSet::OBJECT_TYPE.display_name(), "object type");
		assert_eq!(KindSet::TYPE.display_name(), "type");
		assert_eq!(KindSet::POINTER.display_name(), "pointer");
		assert_eq!((KindSet::MODULE | KindSet::CAST).display_name(), "schema item");
		assert_eq!(KindSet::POINTER.single(), None);
		assert_eq!(KindSet::LINK.single(), Some(ObjectKind::Link));
	}

	#[test]
	fn test_kind_set_naming() {
		assert!(KindSet::POINTER.is_qualified());
		assert!(!KindSet::TYPE.is_qualified());
		assert!(!KindSet::TYPE.is_globally_named());
		assert!(KindSet::GLOBAL.is_globally_named());
		assert!(!KindSet::empty().is_qualified());
	}

	#[test]
	fn test_global_kinds_are_globally_named() {
		for kind in ObjectKind::ALL {
			if kind.is_global() {
				assert!(!kind.is_qualified(), "{kind}");
			}
		}
		assert!(!ObjectKind::Migration.is_global());
		assert!(!ObjectKind::Migration.is_qualified());
	}
}
