// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Debug, Formatter},
	hash::Hash,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use dashmap::DashMap;
use imbl::OrdSet;
use once_cell::sync::OnceCell;
use strata_type::{ObjectId, QualName, Result};

use crate::{
	object::{KindSet, Object},
	reference::ReferrerMap,
};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one catalog value. Two values never share a
/// token, even when their contents are equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogToken(u64);

impl CatalogToken {
	pub fn next() -> Self {
		Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ReferrersKey {
	pub target: ObjectId,
	pub kinds: Option<KindSet>,
	pub field: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CastDirection {
	To,
	From,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CastKey {
	pub ty: ObjectId,
	pub direction: CastDirection,
	pub implicit: bool,
	pub assignment: bool,
}

/// Memoized query results of a single catalog value.
///
/// Lives behind the value's `Arc`, so it is dropped with the last snapshot
/// and a new value always starts out empty.
#[derive(Default)]
pub struct QueryCache {
	referrers: DashMap<ReferrersKey, OrdSet<Object>>,
	referrers_ex: DashMap<(ObjectId, Option<KindSet>), ReferrerMap>,
	casts: DashMap<CastKey, Arc<[Object]>>,
	operators: DashMap<QualName, Arc<[Object]>>,
	last_migration: OnceCell<Option<Object>>,
}

impl QueryCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn referrers(&self, key: ReferrersKey, compute: impl FnOnce() -> OrdSet<Object>) -> OrdSet<Object> {
		memoize(&self.referrers, key, compute)
	}

	pub(crate) fn referrers_ex(
		&self,
		key: (ObjectId, Option<KindSet>),
		compute: impl FnOnce() -> ReferrerMap,
	) -> ReferrerMap {
		memoize(&self.referrers_ex, key, compute)
	}

	pub(crate) fn casts(
		&self,
		key: CastKey,
		compute: impl FnOnce() -> Result<Arc<[Object]>>,
	) -> Result<Arc<[Object]>> {
		if let Some(hit) = self.casts.get(&key) {
			return Ok(hit.value().clone());
		}
		let value = compute()?;
		self.casts.insert(key, value.clone());
		Ok(value)
	}

	pub(crate) fn operators(&self, key: &QualName, compute: impl FnOnce() -> Arc<[Object]>) -> Arc<[Object]> {
		if let Some(hit) = self.operators.get(key) {
			return hit.value().clone();
		}
		let value = compute();
		self.operators.insert(key.clone(), value.clone());
		value
	}

	/// Only successful results are kept; a failing computation is retried on
	/// the next call.
	pub(crate) fn last_migration(&self, compute: impl FnOnce() -> Result<Option<Object>>) -> Result<Option<Object>> {
		self.last_migration.get_or_try_init(compute).copied()
	}

	pub fn len(&self) -> usize {
		self.referrers.len()
			+ self.referrers_ex.len()
			+ self.casts.len()
			+ self.operators.len()
			+ usize::from(self.last_migration.get().is_some())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Debug for QueryCache {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueryCache").field("entries", &self.len()).finish()
	}
}

fn memoize<K, V>(map: &DashMap<K, V>, key: K, compute: impl FnOnce() -> V) -> V
where
	K: Eq + Hash,
	V: Clone,
{
	// the shard guard must be released before computing, the computation
	// may query the same cache
	if let Some(hit) = map.get(&key) {
		return hit.value().clone();
	}
	let value = compute();
	map.insert(key, value.clone());
	value
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tokens_are_unique() {
		let a = CatalogToken::next();
		let b = CatalogToken::next();
		assert_ne!(a, b);
	}

	#[test]
	fn test_memoize_computes_once() {
		let cache = QueryCache::new();
		let key = ReferrersKey {
			target: ObjectId::from_u128(1),
			kinds: None,
			field: None,
		};
		let mut calls = 0;
		for _ in 0..3 {
			cache.referrers(key.clone(), || {
				calls += 1;
				OrdSet::new()
			});
		}
		assert_eq!(calls, 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_failed_last_migration_is_not_cached() {
		let cache = QueryCache::new();
		assert!(cache.last_migration(|| strata_type::internal_err!("broken")).is_err());
		assert!(cache.is_empty());
		assert_eq!(cache.last_migration(|| Ok(None)).unwrap(), None);
		assert_eq!(cache.len(), 1);
	}
}
