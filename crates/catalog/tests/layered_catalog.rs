// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod common;

use common::{assert_references_consistent, init_test_tracing};
use strata_catalog::{
	Catalog, FieldValue, FlatCatalog, KindSet, LayeredCatalog, Object, ObjectFilter, ObjectKind,
	test_utils::{create_module, create_object_type, create_role, create_scalar_type},
};
use strata_type::{QualName, UnqualName};

fn stdlib() -> (FlatCatalog, Object, Object) {
	let (base, _) = create_module(&FlatCatalog::new(), "std");
	let (base, object) = create_object_type(&base, "std::BaseObject", &[]);
	let (base, str_type) = create_scalar_type(&base, "std::str");
	(base, object, str_type)
}

#[test]
fn test_base_is_never_modified() {
	init_test_tracing();

	let (base, object, str_type) = stdlib();
	let image = base.to_image_bytes().unwrap();
	let catalog = LayeredCatalog::new(base.clone(), FlatCatalog::new(), FlatCatalog::new());

	let (catalog, _) = create_module(&catalog, "default");
	let (catalog, user) = create_object_type(&catalog, "default::User", &[object]);
	let catalog = catalog.set_field(str_type, "abstract", FieldValue::Bool(true)).unwrap();
	let catalog = catalog.set_field(object, "abstract", FieldValue::Bool(true)).unwrap();
	let catalog = catalog.set_field(user, "abstract", FieldValue::Bool(true)).unwrap();

	assert_eq!(catalog.base().token(), base.token());
	assert_eq!(catalog.base().to_image_bytes().unwrap(), image);
	assert!(catalog.top().has_object(str_type.id));
	assert!(catalog.top().has_object(user.id));
	assert_references_consistent(catalog.top());
}

#[test]
fn test_promotion_is_idempotent() {
	let (base, _, str_type) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());

	let twice = catalog
		.set_field(str_type, "abstract", FieldValue::Bool(true))
		.unwrap()
		.set_field(str_type, "enum_values", FieldValue::StrList(vec!["a".to_string()]))
		.unwrap();
	let once = catalog
		.update_obj(str_type, vec![
			("abstract", Some(FieldValue::Bool(true))),
			("enum_values", Some(FieldValue::StrList(vec!["a".to_string()]))),
		])
		.unwrap();

	assert_eq!(twice.top().get_data_raw(str_type.id), once.top().get_data_raw(str_type.id));
	assert_eq!(twice.top().references(), once.top().references());
}

#[test]
fn test_promoted_object_reports_its_own_references() {
	init_test_tracing();

	let (base, object, _) = stdlib();
	let (base, derived) = create_object_type(&base, "std::Derived", &[object]);
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	assert!(catalog.get_children(object).contains(&derived));

	let catalog = catalog.unset_field(derived, "bases").unwrap();
	assert!(catalog.get_children(object).is_empty());
	assert!(catalog.base().get_children(object).contains(&derived));

	let catalog = catalog.set_field(derived, "bases", FieldValue::ObjectList(vec![object.id])).unwrap();
	assert_eq!(catalog.get_referrers_ex(object.id, Some(KindSet::OBJECT_TYPE)).len(), 2);
}

#[test]
fn test_global_layer_routing() {
	let (base, _, _) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	let (catalog, admin) = create_role(&catalog, "admin");

	assert!(catalog.global().has_object(admin.id));
	assert_eq!(catalog.top().len(), 0);
	assert_eq!(catalog.get_global(ObjectKind::Role, &UnqualName::new("admin")).unwrap(), admin);

	let catalog = catalog.set_field(admin, "superuser", FieldValue::Bool(true)).unwrap();
	assert!(catalog.global().get_flag(admin, "superuser").unwrap());

	let roles: Vec<_> =
		catalog.get_objects(ObjectFilter::new().kind(ObjectKind::Role)).iter().map(Result::unwrap).collect();
	assert_eq!(roles, vec![admin]);
	let others: Vec<_> =
		catalog.get_objects(ObjectFilter::new().exclude_global(true)).iter().map(Result::unwrap).collect();
	assert!(!others.contains(&admin));

	let catalog = catalog.delete(admin).unwrap();
	assert!(catalog.global().is_empty());
}

#[test]
fn test_names_are_unique_across_layers() {
	let (base, _, _) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());

	let err = catalog
		.add(strata_type::ObjectId::generate(), ObjectKind::ScalarType, vec![(
			"name",
			strata_catalog::test_utils::qual("std::str"),
		)])
		.unwrap_err();
	assert_eq!(err.message, "scalar type 'std::str' already exists");

	let (catalog, default) = create_module(&catalog, "default");
	let (catalog, _) = create_object_type(&catalog, "default::User", &[]);
	let err = catalog.set_field(default, "name", strata_catalog::test_utils::unqual("std")).unwrap_err();
	assert_eq!(err.code, "CATALOG_001");
}

#[test]
fn test_layered_image_round_trip() {
	let (base, object, _) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	let (catalog, _) = create_module(&catalog, "default");
	let (catalog, user) = create_object_type(&catalog, "default::User", &[object]);
	let (catalog, admin) = create_role(&catalog, "admin");

	let restored = LayeredCatalog::from_image_bytes(&catalog.to_image_bytes().unwrap()).unwrap();
	assert_eq!(restored.find_by_name(&QualName::new("default", "User")), Some(user));
	assert_eq!(restored.find_by_globalname(ObjectKind::Role, &UnqualName::new("admin")), Some(admin));
	assert!(restored.get_children(object).contains(&user));
	assert_eq!(restored.top().references(), catalog.top().references());
}

#[test]
fn test_referrers_in_the_global_layer() {
	init_test_tracing();

	let (base, _, _) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	let (catalog, login) = create_role(&catalog, "login");
	let (catalog, admin) = create_role(&catalog, "admin");
	let catalog = catalog
		.update_obj(admin, vec![
			("bases", Some(FieldValue::ObjectList(vec![login.id]))),
			("ancestors", Some(FieldValue::ObjectList(vec![login.id]))),
		])
		.unwrap();

	assert_eq!(catalog.get_referrers(login.id, None, Some("bases")).into_iter().collect::<Vec<_>>(), vec![admin]);
	assert!(catalog.get_descendants(login).contains(&admin));
	assert!(catalog.get_referrers(login.id, Some(KindSet::OBJECT_TYPE), None).is_empty());

	let buckets = catalog.get_referrers_ex(login.id, None);
	assert_eq!(buckets.len(), 2);
	assert!(buckets.get(&(ObjectKind::Role, "bases")).unwrap().contains(&admin.id));
	assert!(buckets.get(&(ObjectKind::Role, "ancestors")).unwrap().contains(&admin.id));
	assert!(catalog.top().references().is_empty());
	assert_references_consistent(catalog.global());
}

#[test]
fn test_referrers_union_all_layers() {
	let (base, object, _) = stdlib();
	let (base, derived) = create_object_type(&base, "std::Derived", &[object]);
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	let (catalog, _) = create_module(&catalog, "default");
	let (catalog, user) = create_object_type(&catalog, "default::User", &[object]);
	let (catalog, admin) = create_role(&catalog, "admin");
	let catalog = catalog.set_field(admin, "bases", FieldValue::ObjectList(vec![object.id])).unwrap();

	let referrers: Vec<Object> = catalog.get_referrers(object.id, None, Some("bases")).into_iter().collect();
	assert_eq!(referrers.len(), 3);
	assert!(referrers.contains(&derived));
	assert!(referrers.contains(&user));
	assert!(referrers.contains(&admin));

	let buckets = catalog.get_referrers_ex(object.id, Some(KindSet::ROLE));
	assert_eq!(buckets.len(), 1);
	assert!(buckets.get(&(ObjectKind::Role, "bases")).unwrap().contains(&admin.id));
}

#[test]
fn test_old_layered_values_are_unaffected() {
	let (base, object, str_type) = stdlib();
	let catalog = LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new());
	let (catalog, _) = create_module(&catalog, "default");
	let (before, user) = create_object_type(&catalog, "default::User", &[object]);

	let updated = before
		.update_obj(user, vec![
			("name", Some(strata_catalog::test_utils::qual("default::Person"))),
			("abstract", Some(FieldValue::Bool(true))),
		])
		.unwrap()
		.update_obj(str_type, vec![("enum_values", Some(FieldValue::StrList(vec!["a".to_string()])))])
		.unwrap();
	let deleted = updated.delete(user).unwrap();

	assert_eq!(before.find_by_name(&QualName::new("default", "User")), Some(user));
	assert!(before.find_by_name(&QualName::new("default", "Person")).is_none());
	assert!(!before.get_flag(user, "abstract").unwrap());
	assert_eq!(before.get_field(str_type, "enum_values").unwrap(), None);
	assert!(before.get_children(object).contains(&user));

	assert_eq!(updated.find_by_name(&QualName::new("default", "Person")), Some(user));
	assert!(updated.get_flag(user, "abstract").unwrap());
	assert!(updated.get_children(object).contains(&user));

	assert!(!deleted.has_object(user.id));
	assert!(deleted.get_children(object).is_empty());
	assert_eq!(
		deleted.get_field(str_type, "enum_values").unwrap(),
		Some(FieldValue::StrList(vec!["a".to_string()]))
	);
}
