// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

use imbl::OrdSet;
use strata_type::{
	Fragment, Name, ObjectId, QualName, Result, UnqualName,
	error::diagnostic::catalog::{duplicate_id, duplicate_name, object_not_found, unknown_module},
	return_error, return_internal_error,
};
use tracing::{debug, instrument, trace};

use crate::{
	Catalog, FlatCatalog,
	cache::{CatalogToken, QueryCache, ReferrersKey},
	consts::is_special_module,
	flat::check_name_shape,
	object::{FieldValue, KindSet, NAME_FIELD, Object, ObjectData, ObjectKind, datum_at, schema_class},
	reference::ReferrerMap,
};

/// Three flat catalogs presented as one: a read-only *base* (typically the
/// standard library), a *top* receiving user changes and a *global* layer
/// holding the global kinds.
///
/// Base objects are never modified in place. Mutating one first copies it
/// into top, and from then on top's version shadows it.
#[derive(Clone)]
pub struct LayeredCatalog(Arc<LayeredCatalogInner>);

pub struct LayeredCatalogInner {
	base: FlatCatalog,
	top: FlatCatalog,
	global: FlatCatalog,
	token: CatalogToken,
	cache: QueryCache,
}

impl Deref for LayeredCatalog {
	type Target = LayeredCatalogInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl std::fmt::Debug for LayeredCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LayeredCatalog")
			.field("base", &self.base)
			.field("top", &self.top)
			.field("global", &self.global)
			.field("token", &self.token)
			.finish()
	}
}

impl LayeredCatalog {
	pub fn new(base: FlatCatalog, top: FlatCatalog, global: FlatCatalog) -> Self {
		Self(Arc::new(LayeredCatalogInner {
			base,
			top,
			global,
			token: CatalogToken::next(),
			cache: QueryCache::new(),
		}))
	}

	pub fn base(&self) -> &FlatCatalog {
		&self.base
	}

	pub fn top(&self) -> &FlatCatalog {
		&self.top
	}

	pub fn global(&self) -> &FlatCatalog {
		&self.global
	}

	pub fn with_top(&self, top: FlatCatalog) -> Self {
		Self::new(self.base.clone(), top, self.global.clone())
	}

	pub fn with_global(&self, global: FlatCatalog) -> Self {
		Self::new(self.base.clone(), self.top.clone(), global)
	}

	fn layer_for(&self, kind: ObjectKind) -> &FlatCatalog {
		if kind.is_global() {
			&self.global
		} else {
			&self.top
		}
	}

	fn with_layer(&self, kind: ObjectKind, layer: FlatCatalog) -> Self {
		if kind.is_global() {
			self.with_global(layer)
		} else {
			self.with_top(layer)
		}
	}

	/// Whether `id` lives in base but has a newer version in top.
	fn shadowed(&self, id: ObjectId) -> bool {
		self.top.has_object(id)
	}

	fn check_name_free(&self, id: ObjectId, kind: ObjectKind, name: &Name) -> Result<()> {
		check_name_shape(id, kind, name)?;
		let owner = match name {
			Name::Qual(name) => self.find_by_name(name),
			Name::Unqual(name) => self.find_by_globalname(kind, name),
		};
		match owner {
			Some(owner) if owner.id != id => {
				let verbose_name = self.verbose_name(owner)?;
				return_error!(duplicate_name(Fragment::None, &verbose_name))
			}
			_ => Ok(()),
		}
	}

	fn check_module(&self, name: &Name) -> Result<()> {
		if let Name::Qual(name) = name {
			let module = name.module();
			if !is_special_module(module) && !self.has_module(module) {
				return_error!(unknown_module(Fragment::None, module));
			}
		}
		Ok(())
	}

	/// The layer `obj` is mutated in, with `obj` copied into top first when
	/// it so far only exists in base.
	fn promote(&self, obj: Object) -> Result<FlatCatalog> {
		if obj.kind.is_global() || self.top.has_object(obj.id) {
			return Ok(self.layer_for(obj.kind).clone());
		}

		let Some(found) = self.base.find_by_id(obj.id) else {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		};
		if found.kind != obj.kind {
			return_internal_error!("{} is {}, not {}", obj.id, found.kind.display_name(), obj.kind.display_name());
		}
		let Some(data) = self.base.get_data_raw(obj.id) else {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		};

		debug!(id = %obj.id, kind = %obj.kind, "promoting base object into the top layer");
		self.top.insert(obj.id, obj.kind, data, false)
	}

	fn union_referrers(&self, base: OrdSet<Object>, top: OrdSet<Object>, global: OrdSet<Object>) -> OrdSet<Object> {
		let mut result = top.union(global);
		for obj in base {
			if self.shadowed(obj.id) {
				trace!(referrer = %obj.id, "dropping stale base referrer");
				continue;
			}
			result.insert(obj);
		}
		result
	}

	fn union_buckets(&self, base: ReferrerMap, top: ReferrerMap, global: ReferrerMap) -> ReferrerMap {
		let mut result = top;
		for layer in [base, global] {
			for (key, ids) in layer {
				let ids: OrdSet<ObjectId> = ids.into_iter().filter(|id| !self.shadowed(*id)).collect();
				if ids.is_empty() {
					continue;
				}
				let merged = result.get(&key).cloned().unwrap_or_default().union(ids);
				result.insert(key, merged);
			}
		}
		result
	}
}

impl Catalog for LayeredCatalog {
	#[instrument(name = "catalog::layered::add", level = "debug", skip(self, fields))]
	fn add(&self, id: ObjectId, kind: ObjectKind, fields: Vec<(&str, FieldValue)>) -> Result<Self> {
		let data: ObjectData = Arc::from(schema_class(kind).reduce_fields(fields)?);
		let Some(name) = datum_at(&data, NAME_FIELD).as_name().cloned() else {
			return_internal_error!("cannot add {} {} without a name", kind, id);
		};

		self.check_name_free(id, kind, &name)?;
		if self.has_object(id) {
			return_error!(duplicate_id(kind.display_name(), id));
		}
		self.check_module(&name)?;

		let layer = self.layer_for(kind).insert(id, kind, data, false)?;
		Ok(self.with_layer(kind, layer))
	}

	fn set_field(&self, obj: Object, field: &str, value: FieldValue) -> Result<Self> {
		self.update_obj(obj, vec![(field, Some(value))])
	}

	fn unset_field(&self, obj: Object, field: &str) -> Result<Self> {
		self.update_obj(obj, vec![(field, None)])
	}

	#[instrument(name = "catalog::layered::update", level = "debug", skip(self, updates))]
	fn update_obj(&self, obj: Object, updates: Vec<(&str, Option<FieldValue>)>) -> Result<Self> {
		let updates = schema_class(obj.kind).reduce_updates(updates)?;
		if !self.has_object(obj.id) {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		}

		let renamed = updates.iter().rev().find(|(field, _)| field.index == NAME_FIELD);
		if let Some(name) = renamed.and_then(|(_, value)| value.as_name()) {
			self.check_name_free(obj.id, obj.kind, name)?;
			self.check_module(name)?;
		}

		let layer = self.promote(obj)?;
		let updated = layer.apply_updates(obj, updates, false)?;
		if updated.token() == layer.token() && layer.token() == self.layer_for(obj.kind).token() {
			return Ok(self.clone());
		}
		Ok(self.with_layer(obj.kind, updated))
	}

	/// Deletes from top, or from global for global kinds. Base objects are
	/// out of reach; deleting a promoted copy uncovers the base version.
	#[instrument(name = "catalog::layered::delete", level = "debug", skip(self))]
	fn delete(&self, obj: Object) -> Result<Self> {
		let layer = self.layer_for(obj.kind).delete(obj)?;
		Ok(self.with_layer(obj.kind, layer))
	}

	#[instrument(name = "catalog::layered::delist", level = "debug", skip(self))]
	fn delist(&self, name: &QualName) -> Result<Self> {
		Ok(self.with_top(self.top.delist(name)?))
	}

	fn find_by_id(&self, id: ObjectId) -> Option<Object> {
		self.top.find_by_id(id).or_else(|| self.base.find_by_id(id)).or_else(|| self.global.find_by_id(id))
	}

	fn find_by_name(&self, name: &QualName) -> Option<Object> {
		self.base
			.find_by_name(name)
			.filter(|obj| !self.shadowed(obj.id))
			.or_else(|| self.top.find_by_name(name))
	}

	fn find_by_globalname(&self, kind: ObjectKind, name: &UnqualName) -> Option<Object> {
		if kind.is_global() {
			if let Some(found) = self.global.find_by_globalname(kind, name) {
				return Some(found);
			}
		}
		self.top
			.find_by_globalname(kind, name)
			.or_else(|| self.base.find_by_globalname(kind, name).filter(|obj| !self.shadowed(obj.id)))
	}

	fn find_by_shortname(&self, kind: ObjectKind, name: &QualName) -> OrdSet<ObjectId> {
		let base: OrdSet<ObjectId> =
			self.base.find_by_shortname(kind, name).into_iter().filter(|id| !self.shadowed(*id)).collect();
		base.union(self.top.find_by_shortname(kind, name))
	}

	fn get_data_raw(&self, id: ObjectId) -> Option<ObjectData> {
		self.top
			.get_data_raw(id)
			.or_else(|| self.base.get_data_raw(id))
			.or_else(|| self.global.get_data_raw(id))
	}

	#[instrument(name = "catalog::layered::referrers", level = "trace", skip(self))]
	fn get_referrers(&self, target: ObjectId, kinds: Option<KindSet>, field: Option<&str>) -> OrdSet<Object> {
		let key = ReferrersKey {
			target,
			kinds,
			field: field.map(str::to_string),
		};
		self.cache.referrers(key, || {
			self.union_referrers(
				self.base.get_referrers(target, kinds, field),
				self.top.get_referrers(target, kinds, field),
				self.global.get_referrers(target, kinds, field),
			)
		})
	}

	#[instrument(name = "catalog::layered::referrers_ex", level = "trace", skip(self))]
	fn get_referrers_ex(&self, target: ObjectId, kinds: Option<KindSet>) -> ReferrerMap {
		self.cache.referrers_ex((target, kinds), || {
			self.union_buckets(
				self.base.get_referrers_ex(target, kinds),
				self.top.get_referrers_ex(target, kinds),
				self.global.get_referrers_ex(target, kinds),
			)
		})
	}

	fn object_ids(&self) -> Box<dyn Iterator<Item = ObjectId> + '_> {
		Box::new(
			self.base
				.object_ids()
				.filter(move |id| !self.shadowed(*id))
				.chain(self.top.object_ids())
				.chain(self.global.object_ids()),
		)
	}

	fn globalname_ids(&self, kind: ObjectKind) -> Vec<ObjectId> {
		if kind.is_global() {
			return self.global.globalname_ids(kind);
		}
		let mut ids: Vec<ObjectId> =
			self.base.globalname_ids(kind).into_iter().filter(|id| !self.shadowed(*id)).collect();
		ids.extend(self.top.globalname_ids(kind));
		ids
	}

	fn cache(&self) -> &QueryCache {
		&self.cache
	}

	fn token(&self) -> CatalogToken {
		self.token
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(n: u128) -> ObjectId {
		ObjectId::from_u128(n)
	}

	fn name(name: &str) -> FieldValue {
		FieldValue::Name(Name::parse(name))
	}

	fn layered() -> LayeredCatalog {
		let base = FlatCatalog::new()
			.add(id(1), ObjectKind::Module, vec![("name", name("std"))])
			.unwrap()
			.add(id(2), ObjectKind::ScalarType, vec![("name", name("std::str"))])
			.unwrap();
		LayeredCatalog::new(base, FlatCatalog::new(), FlatCatalog::new())
	}

	#[test]
	fn test_add_routes_by_kind() {
		let catalog = layered()
			.add(id(10), ObjectKind::Role, vec![("name", name("admin"))])
			.unwrap()
			.add(id(11), ObjectKind::Module, vec![("name", name("default"))])
			.unwrap();

		assert!(catalog.global().has_object(id(10)));
		assert!(!catalog.top().has_object(id(10)));
		assert!(catalog.top().has_object(id(11)));
		assert_eq!(catalog.get_global(ObjectKind::Role, &"admin".into()).unwrap().id, id(10));
	}

	#[test]
	fn test_module_check_sees_base() {
		let catalog = layered().add(id(10), ObjectKind::ObjectType, vec![("name", name("std::X"))]).unwrap();
		assert!(catalog.top().has_object(id(10)));

		let err = catalog.add(id(11), ObjectKind::ObjectType, vec![("name", name("m::X"))]).unwrap_err();
		assert_eq!(err.code, "CATALOG_003");
	}

	#[test]
	fn test_duplicate_name_across_layers() {
		let err = layered().add(id(10), ObjectKind::ObjectType, vec![("name", name("std::str"))]).unwrap_err();
		assert_eq!(err.code, "CATALOG_001");

		let err = layered().add(id(2), ObjectKind::ObjectType, vec![("name", name("std::other"))]).unwrap_err();
		assert_eq!(err.code, "CATALOG_002");
	}

	#[test]
	fn test_mutation_promotes_into_top() {
		let catalog = layered();
		let str_type = Object::new(id(2), ObjectKind::ScalarType);
		let updated = catalog.set_field(str_type, "abstract", FieldValue::Bool(true)).unwrap();

		assert!(updated.top().has_object(id(2)));
		assert!(updated.get_flag(str_type, "abstract").unwrap());
		assert!(!updated.base().get_flag(str_type, "abstract").unwrap());
		assert_eq!(updated.base().token(), catalog.base().token());
	}

	#[test]
	fn test_delete_uncovers_base_version() {
		let str_type = Object::new(id(2), ObjectKind::ScalarType);
		let catalog = layered().set_field(str_type, "abstract", FieldValue::Bool(true)).unwrap();
		let catalog = catalog.delete(str_type).unwrap();
		assert!(!catalog.get_flag(str_type, "abstract").unwrap());

		let err = catalog.delete(str_type).unwrap_err();
		assert_eq!(err.code, "CATALOG_006");
	}

	#[test]
	fn test_renamed_promotion_hides_base_name() {
		let str_type = Object::new(id(2), ObjectKind::ScalarType);
		let catalog = layered().set_field(str_type, "name", name("std::text")).unwrap();

		assert!(catalog.find_by_name(&QualName::new("std", "str")).is_none());
		assert_eq!(catalog.find_by_name(&QualName::new("std", "text")), Some(str_type));
		assert_eq!(catalog.object_ids().count(), 2);
	}
}
