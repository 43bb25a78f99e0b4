// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use imbl::OrdSet;
use strata_type::{
	Fragment, Name, ObjectId, QualName, Result, UnqualName,
	error::diagnostic::catalog::{
		invalid_reference, object_not_found, unknown_object_id, wrong_type,
	},
	return_error, return_internal_error,
};
use tracing::instrument;

use crate::{
	cache::{CastDirection, CastKey, CatalogToken, QueryCache},
	iterator::{CatalogIterator, ObjectFilter},
	migration,
	object::{
		Datum, FieldValue, KindSet, NAME_FIELD, Object, ObjectData, ObjectKind, datum_at, restore, schema_class,
	},
	reference::ReferrerMap,
	resolve::{ModuleAliases, lookup},
};

/// Options of a by-name lookup through [`Catalog::find`] and
/// [`Catalog::get`].
#[derive(Default)]
pub struct LookupOptions<'a> {
	pub module_aliases: Option<&'a ModuleAliases>,
	/// Kinds the match must be an instance of, e.g. [`KindSet::TYPE`].
	pub kinds: Option<KindSet>,
	pub condition: Option<&'a dyn Fn(Object) -> bool>,
	pub label: Option<&'a str>,
	pub fragment: Fragment,
}

impl<'a> LookupOptions<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_aliases(mut self, aliases: &'a ModuleAliases) -> Self {
		self.module_aliases = Some(aliases);
		self
	}

	pub fn with_kind(mut self, kinds: impl Into<KindSet>) -> Self {
		self.kinds = Some(kinds.into());
		self
	}

	pub fn with_condition(mut self, condition: &'a dyn Fn(Object) -> bool) -> Self {
		self.condition = Some(condition);
		self
	}

	pub fn with_label(mut self, label: &'a str) -> Self {
		self.label = Some(label);
		self
	}

	pub fn with_fragment(mut self, fragment: Fragment) -> Self {
		self.fragment = fragment;
		self
	}

	fn accepts(&self, obj: Object) -> bool {
		self.condition.map(|condition| condition(obj)).unwrap_or(true)
	}
}

/// An immutable schema catalog value.
///
/// Every mutation returns a new value; the receiver keeps observing the
/// state it was created with. Implemented by
/// [`FlatCatalog`](crate::FlatCatalog) and
/// [`LayeredCatalog`](crate::LayeredCatalog).
pub trait Catalog: Clone + Send + Sync + Sized {
	/// Inserts a new object. `fields` must contain `name`; fields that are
	/// not listed start out absent.
	fn add(&self, id: ObjectId, kind: ObjectKind, fields: Vec<(&str, FieldValue)>) -> Result<Self>;

	fn set_field(&self, obj: Object, field: &str, value: FieldValue) -> Result<Self>;

	fn unset_field(&self, obj: Object, field: &str) -> Result<Self>;

	/// Batched field update; `None` unsets the field.
	fn update_obj(&self, obj: Object, updates: Vec<(&str, Option<FieldValue>)>) -> Result<Self>;

	fn delete(&self, obj: Object) -> Result<Self>;

	/// Drops a qualified-name binding, leaving the object in place.
	fn delist(&self, name: &QualName) -> Result<Self>;

	fn find_by_id(&self, id: ObjectId) -> Option<Object>;

	fn find_by_name(&self, name: &QualName) -> Option<Object>;

	fn find_by_globalname(&self, kind: ObjectKind, name: &UnqualName) -> Option<Object>;

	/// All overloads of `kind` sharing `name` as their short name.
	fn find_by_shortname(&self, kind: ObjectKind, name: &QualName) -> OrdSet<ObjectId>;

	fn get_data_raw(&self, id: ObjectId) -> Option<ObjectData>;

	/// Objects referring to `target`, optionally restricted to referrers of
	/// the given kinds and to references stored in field `field`.
	fn get_referrers(&self, target: ObjectId, kinds: Option<KindSet>, field: Option<&str>) -> OrdSet<Object>;

	/// Referrers of `target` bucketed by `(referrer kind, field)`.
	fn get_referrers_ex(&self, target: ObjectId, kinds: Option<KindSet>) -> ReferrerMap;

	/// Lazy walk over the ids of every visible object.
	fn object_ids(&self) -> Box<dyn Iterator<Item = ObjectId> + '_>;

	/// Ids of every globally named object of `kind`.
	fn globalname_ids(&self, kind: ObjectKind) -> Vec<ObjectId>;

	fn cache(&self) -> &QueryCache;

	fn token(&self) -> CatalogToken;

	fn has_object(&self, id: ObjectId) -> bool {
		self.find_by_id(id).is_some()
	}

	/// Deletes `obj` if it is present.
	fn discard(&self, obj: Object) -> Result<Self> {
		if self.has_object(obj.id) {
			self.delete(obj)
		} else {
			Ok(self.clone())
		}
	}

	fn get_by_id(&self, id: ObjectId) -> Result<Object> {
		match self.find_by_id(id) {
			Some(obj) => Ok(obj),
			None => return_error!(unknown_object_id(id)),
		}
	}

	fn get_by_id_as(&self, id: ObjectId, kind: ObjectKind) -> Result<Object> {
		let obj = self.get_by_id(id)?;
		if obj.kind != kind {
			return_error!(wrong_type(
				Fragment::None,
				&id.to_string(),
				obj.kind.display_name(),
				kind.display_name()
			));
		}
		Ok(obj)
	}

	fn get_by_name(&self, name: &QualName) -> Result<Object> {
		match self.find_by_name(name) {
			Some(obj) => Ok(obj),
			None => return_error!(invalid_reference(Fragment::None, "schema item", &name.to_string())),
		}
	}

	fn get_global(&self, kind: ObjectKind, name: &UnqualName) -> Result<Object> {
		match self.find_by_globalname(kind, name) {
			Some(obj) => Ok(obj),
			None => return_error!(invalid_reference(Fragment::None, kind.display_name(), name.as_str())),
		}
	}

	fn get_by_shortname(&self, kind: ObjectKind, name: &QualName) -> Result<Vec<Object>> {
		let ids = self.find_by_shortname(kind, name);
		if ids.is_empty() {
			return_error!(invalid_reference(Fragment::None, kind.display_name(), &name.to_string()));
		}
		Ok(ids.into_iter().map(|id| Object::new(id, kind)).collect())
	}

	fn get_field_raw(&self, obj: Object, index: usize) -> Option<Datum> {
		self.get_data_raw(obj.id).map(|data| datum_at(&data, index).clone())
	}

	/// Restored value of field `field` of `obj`, `None` when unset.
	fn get_field(&self, obj: Object, field: &str) -> Result<Option<FieldValue>> {
		let field = schema_class(obj.kind).field(field)?;
		match self.get_data_raw(obj.id) {
			Some(data) => Ok(restore(datum_at(&data, field.index))),
			None => return_error!(object_not_found(obj.kind.name(), obj.id)),
		}
	}

	/// Bool field read with absent meaning `false`.
	fn get_flag(&self, obj: Object, field: &str) -> Result<bool> {
		Ok(self.get_field(obj, field)?.and_then(|value| value.as_bool()).unwrap_or(false))
	}

	fn get_name(&self, obj: Object) -> Result<Name> {
		let Some(data) = self.get_data_raw(obj.id) else {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		};
		match datum_at(&data, NAME_FIELD).as_name() {
			Some(name) => Ok(name.clone()),
			None => return_internal_error!("{} {} has no name", obj.kind, obj.id),
		}
	}

	/// E.g. `object type 'default::User'`.
	fn verbose_name(&self, obj: Object) -> Result<String> {
		let name = self.get_name(obj)?;
		Ok(format!("{} '{}'", obj.kind.display_name(), name))
	}

	/// Name lookup with module aliases and standard library fallback.
	///
	/// Globally named kinds are looked up by their unqualified name. A match
	/// whose kind is not in the requested set is a `WrongType` error.
	fn find(&self, name: &Name, options: &LookupOptions<'_>) -> Result<Option<Object>> {
		let global_lookup = |kinds: KindSet| {
			let name = UnqualName::new(name.to_string());
			kinds
				.kinds()
				.filter(|kind| !kind.is_qualified())
				.find_map(|kind| self.find_by_globalname(kind, &name).filter(|obj| options.accepts(*obj)))
		};

		if let Some(kinds) = options.kinds {
			if kinds.is_globally_named() {
				return Ok(global_lookup(kinds));
			}
		}

		let found = lookup(
			self,
			name,
			|catalog, name| catalog.find_by_name(name).filter(|obj| options.accepts(*obj)),
			options.module_aliases,
		);

		match (found, options.kinds) {
			(Some(obj), Some(kinds)) if !kinds.contains_kind(obj.kind) => {
				return_error!(wrong_type(
					options.fragment.clone(),
					&name.to_string(),
					obj.kind.display_name(),
					kinds.display_name()
				))
			}
			// mixed sets such as `TYPE` also cover globally named pseudo types
			(None, Some(kinds)) if matches!(name, Name::Unqual(_)) => Ok(global_lookup(kinds)),
			(found, _) => Ok(found),
		}
	}

	fn get(&self, name: &Name, options: &LookupOptions<'_>) -> Result<Object> {
		if let Some(obj) = self.find(name, options)? {
			return Ok(obj);
		}

		let label = options
			.label
			.or_else(|| options.kinds.map(|kinds| kinds.display_name()))
			.unwrap_or("schema item");

		let qualified_kind = options.kinds.map(|kinds| kinds.is_qualified()).unwrap_or(false);
		let refname = match (name, options.module_aliases.and_then(|aliases| aliases.get(&None))) {
			(Name::Unqual(name), Some(default_module)) if qualified_kind => {
				QualName::new(default_module, name.as_str()).to_string()
			}
			_ => name.to_string(),
		};

		return_error!(invalid_reference(options.fragment.clone(), label, &refname))
	}

	/// Lazy, restartable traversal of every object passing `filter`.
	fn get_objects<'a>(&'a self, filter: ObjectFilter<'a>) -> CatalogIterator<'a, Self> {
		CatalogIterator::new(self, filter)
	}

	fn get_children(&self, obj: Object) -> OrdSet<Object> {
		self.get_referrers(obj.id, Some(obj.kind.as_set()), Some("bases"))
	}

	fn get_descendants(&self, obj: Object) -> OrdSet<Object> {
		self.get_referrers(obj.id, Some(obj.kind.as_set()), Some("ancestors"))
	}

	fn get_casts_to_type(&self, ty: ObjectId, implicit: bool, assignment: bool) -> Result<Arc<[Object]>> {
		casts(self, CastKey {
			ty,
			direction: CastDirection::To,
			implicit,
			assignment,
		})
	}

	fn get_casts_from_type(&self, ty: ObjectId, implicit: bool, assignment: bool) -> Result<Arc<[Object]>> {
		casts(self, CastKey {
			ty,
			direction: CastDirection::From,
			implicit,
			assignment,
		})
	}

	fn get_operators(&self, name: &QualName) -> Arc<[Object]> {
		self.cache().operators(name, || {
			self.find_by_shortname(ObjectKind::Operator, name)
				.into_iter()
				.map(|id| Object::new(id, ObjectKind::Operator))
				.collect()
		})
	}

	fn get_modules(&self) -> Vec<Object> {
		self.globalname_ids(ObjectKind::Module).into_iter().map(|id| Object::new(id, ObjectKind::Module)).collect()
	}

	fn has_module(&self, name: &str) -> bool {
		self.find_by_globalname(ObjectKind::Module, &UnqualName::new(name)).is_some()
	}

	fn has_migration(&self, name: &str) -> bool {
		self.find_by_globalname(ObjectKind::Migration, &UnqualName::new(name)).is_some()
	}

	/// Head of the linear migration history, memoized per value.
	fn get_last_migration(&self) -> Result<Option<Object>> {
		self.cache().last_migration(|| migration::get_last_migration(self))
	}
}

#[instrument(name = "catalog::query::casts", level = "trace", skip(catalog))]
fn casts<C: Catalog>(catalog: &C, key: CastKey) -> Result<Arc<[Object]>> {
	let field = match key.direction {
		CastDirection::To => "to_type",
		CastDirection::From => "from_type",
	};

	catalog.cache().casts(key, || {
		let mut result = Vec::new();
		for cast in catalog.get_referrers(key.ty, Some(KindSet::CAST), Some(field)) {
			if key.implicit && !catalog.get_flag(cast, "allow_implicit")? {
				continue;
			}
			if key.assignment && !catalog.get_flag(cast, "allow_assignment")? {
				continue;
			}
			result.push(cast);
		}
		Ok(Arc::from(result))
	})
}
