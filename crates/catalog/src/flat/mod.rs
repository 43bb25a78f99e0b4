// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

use imbl::{OrdMap, OrdSet};
use strata_type::{
	Fragment, ObjectId, QualName, Result, UnqualName,
	error::diagnostic::catalog::{duplicate_id, invalid_reference, object_not_found},
	return_error, return_internal_error,
};
use tracing::instrument;

use crate::{
	Catalog,
	cache::{CatalogToken, QueryCache, ReferrersKey},
	object::{
		Datum, FieldDef, FieldValue, KindSet, NAME_FIELD, Object, ObjectData, ObjectKind, datum_at,
		referenced_ids, schema_class,
	},
	reference::{ReferenceIndex, ReferrerMap, select_buckets, select_referrers},
};

mod name;

pub(crate) use name::check_name_shape;

/// Stored form of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
	pub kind: ObjectKind,
	pub data: ObjectData,
}

/// Primary store plus every index derived from it.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlatState {
	pub(crate) objects: OrdMap<ObjectId, ObjectEntry>,
	pub(crate) name_to_id: OrdMap<QualName, ObjectId>,
	pub(crate) shortname_to_id: OrdMap<(ObjectKind, QualName), OrdSet<ObjectId>>,
	pub(crate) globalname_to_id: OrdMap<(ObjectKind, UnqualName), ObjectId>,
	pub(crate) refs_to: ReferenceIndex,
}

/// A self-contained, fully indexed catalog value.
#[derive(Clone)]
pub struct FlatCatalog(Arc<FlatCatalogInner>);

pub struct FlatCatalogInner {
	pub(crate) state: FlatState,
	generation: u64,
	token: CatalogToken,
	cache: QueryCache,
}

impl Deref for FlatCatalog {
	type Target = FlatCatalogInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Default for FlatCatalog {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for FlatCatalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FlatCatalog")
			.field("objects", &self.state.objects.len())
			.field("generation", &self.generation)
			.field("token", &self.token)
			.finish()
	}
}

impl FlatCatalog {
	pub fn new() -> Self {
		Self::from_state(FlatState::default(), 0)
	}

	pub(crate) fn from_state(state: FlatState, generation: u64) -> Self {
		Self(Arc::new(FlatCatalogInner {
			state,
			generation,
			token: CatalogToken::next(),
			cache: QueryCache::new(),
		}))
	}

	/// Number of mutations that led to this value.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn len(&self) -> usize {
		self.state.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.objects.is_empty()
	}

	pub fn references(&self) -> &ReferenceIndex {
		&self.state.refs_to
	}

	pub(crate) fn state(&self) -> &FlatState {
		&self.state
	}

	pub(crate) fn replace(&self, state: FlatState) -> Self {
		Self::from_state(state, self.generation + 1)
	}

	/// Inserts an object whose data is already reduced.
	#[instrument(name = "catalog::flat::add_reduced", level = "debug", skip(self, data))]
	pub fn add_reduced(&self, id: ObjectId, kind: ObjectKind, data: ObjectData) -> Result<Self> {
		self.insert(id, kind, data, true)
	}

	pub(crate) fn insert(&self, id: ObjectId, kind: ObjectKind, data: ObjectData, check_module: bool) -> Result<Self> {
		let Some(name) = datum_at(&data, NAME_FIELD).as_name().cloned() else {
			return_internal_error!("cannot add {} {} without a name", kind, id);
		};

		let mut state = self.state.clone();
		state.check_name_free(id, kind, &name)?;
		if state.objects.contains_key(&id) {
			return_error!(duplicate_id(kind.display_name(), id));
		}
		state.update_obj_name(id, kind, None, Some(&name), check_module)?;
		state.refs_to.update_object(id, kind, None, Some(&data[..]))?;
		state.objects.insert(id, ObjectEntry {
			kind,
			data,
		});

		Ok(self.replace(state))
	}

	/// Writes reduced `updates` into `obj`. When a field is written more than
	/// once, its index delta runs from the first old to the last new value.
	pub(crate) fn apply_updates(
		&self,
		obj: Object,
		updates: Vec<(FieldDef, Datum)>,
		check_module: bool,
	) -> Result<Self> {
		let Some(entry) = self.state.objects.get(&obj.id) else {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		};
		if entry.kind != obj.kind {
			return_internal_error!("{} is {}, not {}", obj.id, entry.kind.display_name(), obj.kind.display_name());
		}

		let class = schema_class(obj.kind);
		let mut data = entry.data.to_vec();
		if data.len() < class.len() {
			data.resize(class.len(), Datum::Absent);
		}

		let mut previous: Vec<(FieldDef, Datum)> = Vec::with_capacity(updates.len());
		for (field, value) in updates {
			if !previous.iter().any(|(seen, _)| seen.index == field.index) {
				previous.push((field, data[field.index].clone()));
			}
			data[field.index] = value;
		}

		let mut state = self.state.clone();
		let mut changed = false;
		for (field, old) in previous {
			let new = &data[field.index];
			if &old == new {
				continue;
			}
			changed = true;

			if field.index == NAME_FIELD {
				let Some(new_name) = new.as_name() else {
					return_internal_error!("cannot unset the name of {} {}", obj.kind, obj.id);
				};
				state.update_obj_name(obj.id, obj.kind, old.as_name(), Some(new_name), check_module)?;
			} else if field.ty.is_object_ref() {
				state.refs_to.update_field(
					obj.id,
					obj.kind,
					field.name,
					&referenced_ids(&old),
					&referenced_ids(new),
				)?;
			}
		}

		if !changed {
			return Ok(self.clone());
		}

		state.objects.insert(obj.id, ObjectEntry {
			kind: obj.kind,
			data: Arc::from(data),
		});
		Ok(self.replace(state))
	}
}

impl Catalog for FlatCatalog {
	#[instrument(name = "catalog::flat::add", level = "debug", skip(self, fields))]
	fn add(&self, id: ObjectId, kind: ObjectKind, fields: Vec<(&str, FieldValue)>) -> Result<Self> {
		let data = schema_class(kind).reduce_fields(fields)?;
		self.insert(id, kind, Arc::from(data), true)
	}

	fn set_field(&self, obj: Object, field: &str, value: FieldValue) -> Result<Self> {
		self.update_obj(obj, vec![(field, Some(value))])
	}

	fn unset_field(&self, obj: Object, field: &str) -> Result<Self> {
		self.update_obj(obj, vec![(field, None)])
	}

	#[instrument(name = "catalog::flat::update", level = "debug", skip(self, updates))]
	fn update_obj(&self, obj: Object, updates: Vec<(&str, Option<FieldValue>)>) -> Result<Self> {
		let updates = schema_class(obj.kind).reduce_updates(updates)?;
		self.apply_updates(obj, updates, true)
	}

	#[instrument(name = "catalog::flat::delete", level = "debug", skip(self))]
	fn delete(&self, obj: Object) -> Result<Self> {
		let Some(entry) = self.state.objects.get(&obj.id) else {
			return_error!(object_not_found(obj.kind.name(), obj.id));
		};
		if entry.kind != obj.kind {
			return_internal_error!("{} is {}, not {}", obj.id, entry.kind.display_name(), obj.kind.display_name());
		}

		let mut state = self.state.clone();
		if let Some(name) = datum_at(&entry.data, NAME_FIELD).as_name() {
			state.update_obj_name(obj.id, obj.kind, Some(name), None, false)?;
		}
		state.refs_to.update_object(obj.id, obj.kind, Some(&entry.data[..]), None)?;
		state.objects.remove(&obj.id);

		Ok(self.replace(state))
	}

	#[instrument(name = "catalog::flat::delist", level = "debug", skip(self))]
	fn delist(&self, name: &QualName) -> Result<Self> {
		if !self.state.name_to_id.contains_key(name) {
			return_error!(invalid_reference(Fragment::None, "schema item", &name.to_string()));
		}
		let mut state = self.state.clone();
		state.name_to_id.remove(name);
		Ok(self.replace(state))
	}

	fn find_by_id(&self, id: ObjectId) -> Option<Object> {
		self.state.objects.get(&id).map(|entry| Object::new(id, entry.kind))
	}

	fn find_by_name(&self, name: &QualName) -> Option<Object> {
		self.state.name_to_id.get(name).and_then(|id| self.find_by_id(*id))
	}

	fn find_by_globalname(&self, kind: ObjectKind, name: &UnqualName) -> Option<Object> {
		self.state.globalname_to_id.get(&(kind, name.clone())).map(|id| Object::new(*id, kind))
	}

	fn find_by_shortname(&self, kind: ObjectKind, name: &QualName) -> OrdSet<ObjectId> {
		self.state.shortname_to_id.get(&(kind, name.clone())).cloned().unwrap_or_default()
	}

	fn get_data_raw(&self, id: ObjectId) -> Option<ObjectData> {
		self.state.objects.get(&id).map(|entry| entry.data.clone())
	}

	#[instrument(name = "catalog::flat::referrers", level = "trace", skip(self))]
	fn get_referrers(&self, target: ObjectId, kinds: Option<KindSet>, field: Option<&str>) -> OrdSet<Object> {
		let key = ReferrersKey {
			target,
			kinds,
			field: field.map(str::to_string),
		};
		self.cache.referrers(key, || match self.state.refs_to.referrers(target) {
			Some(map) => select_referrers(map, kinds, field),
			None => OrdSet::new(),
		})
	}

	#[instrument(name = "catalog::flat::referrers_ex", level = "trace", skip(self))]
	fn get_referrers_ex(&self, target: ObjectId, kinds: Option<KindSet>) -> ReferrerMap {
		self.cache.referrers_ex((target, kinds), || match self.state.refs_to.referrers(target) {
			Some(map) => select_buckets(map, kinds),
			None => ReferrerMap::new(),
		})
	}

	fn object_ids(&self) -> Box<dyn Iterator<Item = ObjectId> + '_> {
		Box::new(self.state.objects.keys().copied())
	}

	fn globalname_ids(&self, kind: ObjectKind) -> Vec<ObjectId> {
		self.state.globalname_to_id.iter().filter(|((k, _), _)| *k == kind).map(|(_, id)| *id).collect()
	}

	fn cache(&self) -> &QueryCache {
		&self.cache
	}

	fn token(&self) -> CatalogToken {
		self.token
	}
}
