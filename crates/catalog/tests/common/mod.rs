// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![allow(dead_code)]

use std::sync::Once;

use strata_catalog::{Catalog, FlatCatalog, object::referenced_ids, schema_class};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a fmt subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_test_tracing() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
			.with_test_writer()
			.try_init();
	});
}

/// Checks both directions of the reference index of `catalog` against the
/// object-reference fields currently stored.
pub fn assert_references_consistent(catalog: &FlatCatalog) {
	for id in catalog.object_ids() {
		let obj = catalog.get_by_id(id).unwrap();
		let data = catalog.get_data_raw(id).unwrap();
		for field in schema_class(obj.kind).object_ref_fields() {
			let stored = referenced_ids(strata_catalog::object::datum_at(&data, field.index));
			for target in &stored {
				let referrers = catalog.get_referrers(*target, Some(obj.kind.as_set()), Some(field.name));
				assert!(referrers.contains(&obj), "{} {}.{} -> {} is not indexed", obj.kind, id, field.name, target);
			}
		}
	}

	for (target, buckets) in catalog.references().iter() {
		for ((kind, field), ids) in buckets.iter() {
			assert!(!ids.is_empty(), "empty bucket {}.{} for {}", kind, field, target);
			for id in ids.iter() {
				let data = catalog.get_data_raw(*id).unwrap();
				let index = schema_class(*kind).field(field).unwrap().index;
				let stored = referenced_ids(strata_catalog::object::datum_at(&data, index));
				assert!(stored.contains(target), "stale entry {}.{} of {} -> {}", kind, field, id, target);
			}
		}
	}
}
