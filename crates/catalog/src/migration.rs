// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, BTreeSet};

use strata_type::{ObjectId, Result, return_internal_error};
use tracing::instrument;

use crate::{
	Catalog,
	object::{Object, ObjectKind},
};

/// Head of the migration history of `catalog`, `None` when there are no
/// migrations. The history must be a single chain starting at the one
/// migration without parents.
#[instrument(name = "catalog::migration::last", level = "debug", skip(catalog))]
pub fn get_last_migration<C: Catalog>(catalog: &C) -> Result<Option<Object>> {
	let migrations = catalog.globalname_ids(ObjectKind::Migration);
	if migrations.is_empty() {
		return Ok(None);
	}

	let mut children: BTreeMap<ObjectId, Vec<ObjectId>> = BTreeMap::new();
	let mut root = None;
	for id in migrations {
		let migration = Object::new(id, ObjectKind::Migration);
		let parents = catalog.get_field(migration, "parents")?;
		let parents = parents.as_ref().and_then(|parents| parents.as_object_list()).unwrap_or_default();

		if parents.is_empty() {
			if root.is_some() {
				return_internal_error!("multiple migration roots found");
			}
			root = Some(id);
		}
		for parent in parents {
			children.entry(*parent).or_default().push(id);
		}
	}

	let Some(mut latest) = root else {
		return_internal_error!("cannot find migration root");
	};

	let mut visited = BTreeSet::from([latest]);
	while let Some(next) = children.get(&latest) {
		if next.len() > 1 {
			return_internal_error!("nonlinear migration history detected");
		}
		latest = next[0];
		if !visited.insert(latest) {
			return_internal_error!("migration history has a cycle through {}", latest);
		}
	}

	Ok(Some(Object::new(latest, ObjectKind::Migration)))
}

#[cfg(test)]
mod tests {
	use strata_type::{Name, UnqualName};

	use super::*;
	use crate::{FlatCatalog, object::FieldValue};

	fn id(n: u128) -> ObjectId {
		ObjectId::from_u128(n)
	}

	fn add(catalog: FlatCatalog, n: u128, parents: &[u128]) -> FlatCatalog {
		let mut fields = vec![("name", FieldValue::Name(Name::Unqual(UnqualName::new(format!("m{}", n)))))];
		if !parents.is_empty() {
			fields.push(("parents", FieldValue::ObjectList(parents.iter().map(|p| id(*p)).collect())));
		}
		catalog.add(id(n), ObjectKind::Migration, fields).unwrap()
	}

	#[test]
	fn test_no_migrations() {
		assert_eq!(get_last_migration(&FlatCatalog::new()).unwrap(), None);
	}

	#[test]
	fn test_linear_history() {
		let catalog = add(add(add(FlatCatalog::new(), 1, &[]), 2, &[1]), 3, &[2]);
		assert_eq!(get_last_migration(&catalog).unwrap(), Some(Object::new(id(3), ObjectKind::Migration)));
	}

	#[test]
	fn test_siblings_are_nonlinear() {
		let catalog = add(add(add(FlatCatalog::new(), 1, &[]), 2, &[1]), 3, &[1]);
		let err = get_last_migration(&catalog).unwrap_err();
		assert!(err.is_internal());
		assert!(err.to_string().contains("nonlinear migration history detected"));
	}

	#[test]
	fn test_multiple_roots() {
		let catalog = add(add(FlatCatalog::new(), 1, &[]), 2, &[]);
		let err = get_last_migration(&catalog).unwrap_err();
		assert!(err.to_string().contains("multiple migration roots found"));
	}

	#[test]
	fn test_missing_root() {
		let catalog = add(add(FlatCatalog::new(), 1, &[2]), 2, &[1]);
		let err = get_last_migration(&catalog).unwrap_err();
		assert!(err.to_string().contains("cannot find migration root"));
	}
}
