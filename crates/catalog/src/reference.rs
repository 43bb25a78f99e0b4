// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::cmp::Ordering;

use imbl::{OrdMap, OrdSet};
use strata_type::{ObjectId, Result, return_internal_error};

use crate::object::{Datum, KindSet, Object, ObjectKind, RefIds, datum_at, referenced_ids, schema_class};

/// Referrers of a single target, bucketed by the referring kind and the
/// field the reference is stored in.
pub type ReferrerMap = OrdMap<(ObjectKind, &'static str), OrdSet<ObjectId>>;

/// Reverse reference index: target id to everything that points at it.
///
/// Updated only with deltas. Empty buckets and empty targets are removed so
/// that two indexes holding the same references compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
	refs_to: OrdMap<ObjectId, ReferrerMap>,
}

impl ReferenceIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn referrers(&self, target: ObjectId) -> Option<&ReferrerMap> {
		self.refs_to.get(&target)
	}

	pub fn len(&self) -> usize {
		self.refs_to.len()
	}

	pub fn is_empty(&self) -> bool {
		self.refs_to.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &ReferrerMap)> {
		self.refs_to.iter()
	}

	/// Applies the change of one field's references from `old` to `new`.
	/// Both slices must be sorted and free of duplicates.
	pub fn update_field(
		&mut self,
		referrer: ObjectId,
		kind: ObjectKind,
		field: &'static str,
		old: &[ObjectId],
		new: &[ObjectId],
	) -> Result<()> {
		let (added, removed) = diff(old, new);
		for target in added {
			self.insert(target, (kind, field), referrer);
		}
		for target in removed {
			self.remove(target, (kind, field), referrer)?;
		}
		Ok(())
	}

	/// Applies the reference changes of a whole object. `None` stands for an
	/// object that does not exist on that side (add or delete).
	pub fn update_object(
		&mut self,
		referrer: ObjectId,
		kind: ObjectKind,
		old: Option<&[Datum]>,
		new: Option<&[Datum]>,
	) -> Result<()> {
		for field in schema_class(kind).object_ref_fields() {
			let old_refs = old.map(|data| referenced_ids(datum_at(data, field.index))).unwrap_or_default();
			let new_refs = new.map(|data| referenced_ids(datum_at(data, field.index))).unwrap_or_default();
			self.update_field(referrer, kind, field.name, &old_refs, &new_refs)?;
		}
		Ok(())
	}

	fn insert(&mut self, target: ObjectId, key: (ObjectKind, &'static str), referrer: ObjectId) {
		let mut buckets = self.refs_to.get(&target).cloned().unwrap_or_default();
		let mut ids = buckets.get(&key).cloned().unwrap_or_default();
		ids.insert(referrer);
		buckets.insert(key, ids);
		self.refs_to.insert(target, buckets);
	}

	fn remove(&mut self, target: ObjectId, key: (ObjectKind, &'static str), referrer: ObjectId) -> Result<()> {
		let Some(mut buckets) = self.refs_to.get(&target).cloned() else {
			return_internal_error!("reference index has no entry for target {}", target);
		};
		let Some(mut ids) = buckets.get(&key).cloned() else {
			return_internal_error!("reference index has no {}.{} bucket for target {}", key.0, key.1, target);
		};
		if ids.remove(&referrer).is_none() {
			return_internal_error!(
				"reference index is missing {} in the {}.{} bucket of target {}",
				referrer,
				key.0,
				key.1,
				target
			);
		}

		if ids.is_empty() {
			buckets.remove(&key);
		} else {
			buckets.insert(key, ids);
		}

		if buckets.is_empty() {
			self.refs_to.remove(&target);
		} else {
			self.refs_to.insert(target, buckets);
		}
		Ok(())
	}
}

/// Referrers in `map` of the given kinds, through field `field` if set.
pub fn select_referrers(map: &ReferrerMap, kinds: Option<KindSet>, field: Option<&str>) -> OrdSet<Object> {
	map.iter()
		.filter(|((kind, name), _)| {
			kinds.map(|kinds| kinds.contains_kind(*kind)).unwrap_or(true)
				&& field.map(|field| field == *name).unwrap_or(true)
		})
		.flat_map(|((kind, _), ids)| {
			let kind = *kind;
			ids.iter().map(move |id| Object::new(*id, kind))
		})
		.collect()
}

/// Buckets of `map` whose referrer kind is in `kinds`.
pub fn select_buckets(map: &ReferrerMap, kinds: Option<KindSet>) -> ReferrerMap {
	match kinds {
		Some(kinds) => map
			.iter()
			.filter(|((kind, _), _)| kinds.contains_kind(*kind))
			.map(|(key, ids)| (*key, ids.clone()))
			.collect(),
		None => map.clone(),
	}
}

/// Splits two sorted id vectors into `(new - old, old - new)` with a single
/// merge pass.
pub fn diff(old: &[ObjectId], new: &[ObjectId]) -> (RefIds, RefIds) {
	let mut added = RefIds::new();
	let mut removed = RefIds::new();
	let (mut i, mut j) = (0, 0);

	while i < old.len() && j < new.len() {
		match old[i].cmp(&new[j]) {
			Ordering::Less => {
				removed.push(old[i]);
				i += 1;
			}
			Ordering::Greater => {
				added.push(new[j]);
				j += 1;
			}
			Ordering::Equal => {
				i += 1;
				j += 1;
			}
		}
	}
	removed.extend_from_slice(&old[i..]);
	added.extend_from_slice(&new[j..]);

	(added, removed)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(n: u128) -> ObjectId {
		ObjectId::from_u128(n)
	}

	#[test]
	fn test_diff() {
		let (added, removed) = diff(&[id(1), id(2), id(4)], &[id(2), id(3), id(4), id(5)]);
		assert_eq!(added.as_slice(), &[id(3), id(5)]);
		assert_eq!(removed.as_slice(), &[id(1)]);
	}

	#[test]
	fn test_diff_of_equal_sets_is_empty() {
		let (added, removed) = diff(&[id(1), id(2)], &[id(1), id(2)]);
		assert!(added.is_empty());
		assert!(removed.is_empty());
	}

	#[test]
	fn test_update_adds_and_retracts() {
		let mut index = ReferenceIndex::new();
		index.update_field(id(10), ObjectKind::ObjectType, "bases", &[], &[id(1), id(2)]).unwrap();
		index.update_field(id(11), ObjectKind::ObjectType, "bases", &[], &[id(1)]).unwrap();

		let bucket = &index.referrers(id(1)).unwrap()[&(ObjectKind::ObjectType, "bases")];
		assert_eq!(bucket.iter().copied().collect::<Vec<_>>(), vec![id(10), id(11)]);

		index.update_field(id(10), ObjectKind::ObjectType, "bases", &[id(1), id(2)], &[id(1)]).unwrap();
		assert!(index.referrers(id(2)).is_none());
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn test_empty_buckets_are_dropped() {
		let mut index = ReferenceIndex::new();
		index.update_field(id(10), ObjectKind::Link, "target", &[], &[id(1)]).unwrap();
		index.update_field(id(10), ObjectKind::Link, "source", &[], &[id(1)]).unwrap();
		index.update_field(id(10), ObjectKind::Link, "target", &[id(1)], &[]).unwrap();

		let buckets = index.referrers(id(1)).unwrap();
		assert_eq!(buckets.len(), 1);
		assert!(buckets.contains_key(&(ObjectKind::Link, "source")));

		index.update_field(id(10), ObjectKind::Link, "source", &[id(1)], &[]).unwrap();
		assert!(index.is_empty());
		assert_eq!(index, ReferenceIndex::new());
	}

	#[test]
	fn test_select_referrers() {
		let mut index = ReferenceIndex::new();
		index.update_field(id(10), ObjectKind::Link, "target", &[], &[id(1)]).unwrap();
		index.update_field(id(11), ObjectKind::Property, "target", &[], &[id(1)]).unwrap();
		index.update_field(id(12), ObjectKind::ObjectType, "bases", &[], &[id(1)]).unwrap();
		let map = index.referrers(id(1)).unwrap();

		assert_eq!(select_referrers(map, None, None).len(), 3);
		let pointers = select_referrers(map, Some(KindSet::POINTER), Some("target"));
		assert_eq!(
			pointers.into_iter().collect::<Vec<_>>(),
			vec![Object::new(id(10), ObjectKind::Link), Object::new(id(11), ObjectKind::Property)]
		);
		assert!(select_referrers(map, Some(KindSet::OBJECT_TYPE), Some("target")).is_empty());
		assert_eq!(select_buckets(map, Some(KindSet::OBJECT_TYPE)).len(), 1);
	}

	#[test]
	fn test_removing_missing_entry_is_internal_error() {
		let mut index = ReferenceIndex::new();
		let err = index.update_field(id(10), ObjectKind::Link, "target", &[id(1)], &[]).unwrap_err();
		assert!(err.is_internal());
	}
}
