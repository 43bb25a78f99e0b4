// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use strata_type::{Name, ObjectId, QualName, UnqualName};

use crate::{
	Catalog,
	object::{FieldValue, Object, ObjectKind},
};

pub fn unqual(name: &str) -> FieldValue {
	FieldValue::Name(Name::Unqual(UnqualName::new(name)))
}

pub fn qual(name: &str) -> FieldValue {
	match QualName::parse(name) {
		Some(name) => FieldValue::Name(Name::Qual(name)),
		None => panic!("'{}' is not a qualified name", name),
	}
}

fn create<C: Catalog>(catalog: &C, kind: ObjectKind, fields: Vec<(&str, FieldValue)>) -> (C, Object) {
	let obj = Object::new(ObjectId::generate(), kind);
	let catalog = catalog.add(obj.id, kind, fields).unwrap();
	(catalog, obj)
}

pub fn create_module<C: Catalog>(catalog: &C, name: &str) -> (C, Object) {
	create(catalog, ObjectKind::Module, vec![("name", unqual(name))])
}

pub fn create_role<C: Catalog>(catalog: &C, name: &str) -> (C, Object) {
	create(catalog, ObjectKind::Role, vec![("name", unqual(name))])
}

pub fn create_migration<C: Catalog>(catalog: &C, name: &str, parents: &[Object]) -> (C, Object) {
	let mut fields = vec![("name", unqual(name))];
	if !parents.is_empty() {
		fields.push(("parents", FieldValue::ObjectList(parents.iter().map(|p| p.id).collect())));
	}
	create(catalog, ObjectKind::Migration, fields)
}

pub fn create_scalar_type<C: Catalog>(catalog: &C, name: &str) -> (C, Object) {
	create(catalog, ObjectKind::ScalarType, vec![("name", qual(name))])
}

/// Object type inheriting from `bases`; ancestors are the bases plus their
/// own ancestors.
pub fn create_object_type<C: Catalog>(catalog: &C, name: &str, bases: &[Object]) -> (C, Object) {
	let mut ancestors = Vec::new();
	for base in bases {
		ancestors.push(base.id);
		if let Some(FieldValue::ObjectList(ids)) = catalog.get_field(*base, "ancestors").unwrap() {
			ancestors.extend(ids);
		}
	}

	let mut fields = vec![("name", qual(name))];
	if !bases.is_empty() {
		fields.push(("bases", FieldValue::ObjectList(bases.iter().map(|b| b.id).collect())));
		fields.push(("ancestors", FieldValue::ObjectList(ancestors)));
	}
	create(catalog, ObjectKind::ObjectType, fields)
}

/// Link `name` from `source` to `target`, registered in the source's
/// pointer set.
pub fn create_link<C: Catalog>(catalog: &C, name: &str, source: Object, target: Object) -> (C, Object) {
	let (catalog, link) = create(catalog, ObjectKind::Link, vec![
		("name", qual(name)),
		("source", FieldValue::Object(source.id)),
		("target", FieldValue::Object(target.id)),
	]);

	let mut pointers = match catalog.get_field(source, "pointers").unwrap() {
		Some(FieldValue::ObjectSet(ids)) => ids,
		_ => Default::default(),
	};
	pointers.insert(link.id);
	let catalog = catalog.set_field(source, "pointers", FieldValue::ObjectSet(pointers)).unwrap();
	(catalog, link)
}

pub fn create_cast<C: Catalog>(
	catalog: &C,
	module: &str,
	from: Object,
	to: Object,
	implicit: bool,
	assignment: bool,
) -> (C, Object) {
	let shortname = QualName::new(module, "cast");
	let name = QualName::specialized(&shortname, &[&from.id.to_string(), &to.id.to_string()]);
	create(catalog, ObjectKind::Cast, vec![
		("name", FieldValue::Name(Name::Qual(name))),
		("from_type", FieldValue::Object(from.id)),
		("to_type", FieldValue::Object(to.id)),
		("allow_implicit", FieldValue::Bool(implicit)),
		("allow_assignment", FieldValue::Bool(assignment)),
	])
}

/// Overload of `shortname` told apart by `qualifiers`.
pub fn create_operator<C: Catalog>(catalog: &C, shortname: &str, qualifiers: &[&str], return_type: Object) -> (C, Object) {
	let name = QualName::specialized(&QualName::parse(shortname).unwrap(), qualifiers);
	create(catalog, ObjectKind::Operator, vec![
		("name", FieldValue::Name(Name::Qual(name))),
		("return_type", FieldValue::Object(return_type.id)),
		("operator_kind", FieldValue::Str("Infix".to_string())),
	])
}

pub fn create_function<C: Catalog>(catalog: &C, shortname: &str, qualifiers: &[&str], return_type: Object) -> (C, Object) {
	let name = QualName::specialized(&QualName::parse(shortname).unwrap(), qualifiers);
	create(catalog, ObjectKind::Function, vec![
		("name", FieldValue::Name(Name::Qual(name))),
		("return_type", FieldValue::Object(return_type.id)),
	])
}
