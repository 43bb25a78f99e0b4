// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
	Bool,
	Int,
	Str,
	Name,
	Object,
	ObjectList,
	ObjectSet,
	ObjectDict,
	Expression,
	StrList,
}

impl FieldType {
	/// Reducible values are normalized into a shared `Datum` on write and
	/// restored into a `FieldValue` on read.
	pub fn is_reducible(&self) -> bool {
		matches!(
			self,
			FieldType::Object
				| FieldType::ObjectList
				| FieldType::ObjectSet
				| FieldType::ObjectDict
				| FieldType::Expression
				| FieldType::StrList
		)
	}

	/// Fields whose reduced form carries ids of other objects.
	pub fn is_object_ref(&self) -> bool {
		matches!(
			self,
			FieldType::Object
				| FieldType::ObjectList
				| FieldType::ObjectSet
				| FieldType::ObjectDict
				| FieldType::Expression
		)
	}

	pub fn name(&self) -> &'static str {
		match self {
			FieldType::Bool => "bool",
			FieldType::Int => "int",
			FieldType::Str => "str",
			FieldType::Name => "name",
			FieldType::Object => "object",
			FieldType::ObjectList => "object list",
			FieldType::ObjectSet => "object set",
			FieldType::ObjectDict => "object dict",
			FieldType::Expression => "expression",
			FieldType::StrList => "str list",
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldDef {
	pub name: &'static str,
	pub index: usize,
	pub ty: FieldType,
}
