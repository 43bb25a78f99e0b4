// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use once_cell::sync::Lazy;
use strata_type::{Result, return_internal_error};

use super::{
	ObjectKind,
	field::{FieldDef, FieldType},
	value::{Datum, FieldValue, reduce},
};

pub const NAME_FIELD: usize = 0;
pub const INTERNAL_FIELD: usize = 1;
pub const BUILTIN_FIELD: usize = 2;

const COMMON_FIELDS: &[(&str, FieldType)] =
	&[("name", FieldType::Name), ("internal", FieldType::Bool), ("builtin", FieldType::Bool)];

const INHERITING: &[(&str, FieldType)] = &[("bases", FieldType::ObjectList), ("ancestors", FieldType::ObjectList)];

const POINTER_FIELDS: &[(&str, FieldType)] = &[
	("source", FieldType::Object),
	("target", FieldType::Object),
	("bases", FieldType::ObjectList),
	("ancestors", FieldType::ObjectList),
	("required", FieldType::Bool),
	("cardinality", FieldType::Str),
	("default", FieldType::Expression),
	("expr", FieldType::Expression),
];

static REGISTRY: Lazy<Vec<SchemaClass>> =
	Lazy::new(|| ObjectKind::ALL.into_iter().map(|kind| SchemaClass::new(kind, extra_fields(kind))).collect());

/// Field layout of an object kind. Indices are stable for the life of the
/// process and index directly into `ObjectData`.
#[derive(Debug)]
pub struct SchemaClass {
	kind: ObjectKind,
	fields: Vec<FieldDef>,
	by_name: HashMap<&'static str, usize>,
	object_ref_fields: Vec<FieldDef>,
}

pub fn schema_class(kind: ObjectKind) -> &'static SchemaClass {
	&REGISTRY[kind as usize]
}

impl SchemaClass {
	fn new(kind: ObjectKind, extra: Vec<(&'static str, FieldType)>) -> Self {
		let fields: Vec<FieldDef> = COMMON_FIELDS
			.iter()
			.copied()
			.chain(extra)
			.enumerate()
			.map(|(index, (name, ty))| FieldDef {
				name,
				index,
				ty,
			})
			.collect();

		let by_name = fields.iter().map(|f| (f.name, f.index)).collect();
		let object_ref_fields = fields.iter().filter(|f| f.ty.is_object_ref()).copied().collect();

		Self {
			kind,
			fields,
			by_name,
			object_ref_fields,
		}
	}

	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
		self.by_name.get(name).map(|index| &self.fields[*index])
	}

	/// Unknown field names are a programming error on the caller's side.
	pub fn field(&self, name: &str) -> Result<&FieldDef> {
		match self.find_field(name) {
			Some(field) => Ok(field),
			None => return_internal_error!("{} has no field '{}'", self.kind, name),
		}
	}

	pub fn field_at(&self, index: usize) -> Option<&FieldDef> {
		self.fields.get(index)
	}

	pub fn object_ref_fields(&self) -> &[FieldDef] {
		&self.object_ref_fields
	}

	/// Reduces `fields` into a full data vector; unlisted fields are absent.
	pub fn reduce_fields(&self, fields: Vec<(&str, FieldValue)>) -> Result<Vec<Datum>> {
		let mut data = vec![Datum::Absent; self.len()];
		for (name, value) in fields {
			let field = self.field(name)?;
			data[field.index] = reduce(&field.ty, value)?;
		}
		Ok(data)
	}

	/// Resolves and reduces a batch of updates; `None` becomes absent.
	pub fn reduce_updates(&self, updates: Vec<(&str, Option<FieldValue>)>) -> Result<Vec<(FieldDef, Datum)>> {
		updates.into_iter()
			.map(|(name, value)| {
				let field = *self.field(name)?;
				let datum = match value {
					Some(value) => reduce(&field.ty, value)?,
					None => Datum::Absent,
				};
				Ok((field, datum))
			})
			.collect()
	}
}

fn extra_fields(kind: ObjectKind) -> Vec<(&'static str, FieldType)> {
	use FieldType::*;

	match kind {
		ObjectKind::Module | ObjectKind::PseudoType | ObjectKind::Branch => vec![],
		ObjectKind::Extension => vec![("package", Object), ("version", Str)],
		ObjectKind::Migration => {
			vec![("parents", ObjectList), ("script", Str), ("message", Str), ("generated_by", Str)]
		}
		ObjectKind::Role => {
			let mut fields = INHERITING.to_vec();
			fields.extend([("superuser", Bool), ("permissions", StrList)]);
			fields
		}
		ObjectKind::ExtensionPackage => vec![("version", Str), ("script", Str)],
		ObjectKind::ObjectType => {
			let mut fields = INHERITING.to_vec();
			fields.extend([("abstract", Bool), ("pointers", ObjectSet)]);
			fields
		}
		ObjectKind::ScalarType => {
			let mut fields = INHERITING.to_vec();
			fields.extend([("abstract", Bool), ("default", Expression), ("enum_values", StrList)]);
			fields
		}
		ObjectKind::Array => vec![("element_type", Object)],
		ObjectKind::Tuple => vec![("element_types", ObjectDict), ("named", Bool)],
		ObjectKind::Property => POINTER_FIELDS.to_vec(),
		ObjectKind::Link => {
			let mut fields = POINTER_FIELDS.to_vec();
			fields.push(("on_target_delete", Str));
			fields
		}
		ObjectKind::Function => vec![
			("params", ObjectList),
			("return_type", Object),
			("return_typemod", Str),
			("language", Str),
			("body", Expression),
		],
		ObjectKind::Operator => vec![
			("params", ObjectList),
			("return_type", Object),
			("operator_kind", Str),
			("commutator", Object),
		],
		ObjectKind::Parameter => vec![("num", Int), ("type", Object), ("default", Expression), ("kind", Str)],
		ObjectKind::Constraint => {
			let mut fields = vec![("subject", Object), ("params", ObjectList)];
			fields.extend_from_slice(INHERITING);
			fields.extend([("expr", Expression), ("errmessage", Str), ("abstract", Bool)]);
			fields
		}
		ObjectKind::Cast => vec![
			("from_type", Object),
			("to_type", Object),
			("allow_implicit", Bool),
			("allow_assignment", Bool),
			("code", Str),
		],
		ObjectKind::Annotation => vec![("inheritable", Bool)],
		ObjectKind::Index => {
			let mut fields = vec![("subject", Object), ("expr", Expression)];
			fields.extend_from_slice(INHERITING);
			fields
		}
	}
}
