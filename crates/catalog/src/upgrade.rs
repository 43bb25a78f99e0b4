// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
	Catalog, FlatCatalog, LayeredCatalog,
	flat::ObjectEntry,
	object::{Datum, schema_class},
};

/// Catalog values whose stored data can be brought up to the current
/// field layout.
pub trait Upgrade: Catalog {
	fn upgrade(&self) -> Self;
}

/// Pads every data vector that predates fields added since it was written.
/// Returns the same value when nothing needs fixing.
pub fn upgrade_schema<C: Upgrade>(catalog: &C) -> C {
	catalog.upgrade()
}

impl Upgrade for FlatCatalog {
	#[instrument(name = "catalog::upgrade::flat", level = "debug", skip(self))]
	fn upgrade(&self) -> Self {
		let mut state = self.state().clone();
		let mut fixed = 0usize;

		for (id, entry) in self.state().objects.iter() {
			let len = schema_class(entry.kind).len();
			if entry.data.len() >= len {
				continue;
			}
			let mut data = entry.data.to_vec();
			data.resize(len, Datum::Absent);
			state.objects.insert(*id, ObjectEntry {
				kind: entry.kind,
				data: Arc::from(data),
			});
			fixed += 1;
		}

		if fixed == 0 {
			return self.clone();
		}
		debug!(fixed, "padded short object data");
		self.replace(state)
	}
}

impl Upgrade for LayeredCatalog {
	fn upgrade(&self) -> Self {
		let base = self.base().upgrade();
		let top = self.top().upgrade();
		let global = self.global().upgrade();

		let unchanged = base.token() == self.base().token()
			&& top.token() == self.top().token()
			&& global.token() == self.global().token();
		if unchanged {
			return self.clone();
		}
		LayeredCatalog::new(base, top, global)
	}
}

#[cfg(test)]
mod tests {
	use strata_type::{Name, ObjectId};

	use super::*;
	use crate::object::{FieldValue, NAME_FIELD, ObjectKind};

	#[test]
	fn test_nothing_to_fix_keeps_value() {
		let catalog = FlatCatalog::new()
			.add(ObjectId::from_u128(1), ObjectKind::Module, vec![("name", FieldValue::Name(Name::parse("m")))])
			.unwrap();
		assert_eq!(upgrade_schema(&catalog).token(), catalog.token());
	}

	#[test]
	fn test_short_vectors_are_padded() {
		let id = ObjectId::from_u128(1);
		let short: Vec<Datum> = vec![Datum::Name(Name::parse("m")), Datum::Bool(false)];
		let catalog = FlatCatalog::new().add_reduced(id, ObjectKind::Module, Arc::from(short)).unwrap();
		assert_eq!(catalog.get_data_raw(id).unwrap().len(), 2);

		let upgraded = upgrade_schema(&catalog);
		let data = upgraded.get_data_raw(id).unwrap();
		assert_eq!(data.len(), schema_class(ObjectKind::Module).len());
		assert_eq!(data[NAME_FIELD], Datum::Name(Name::parse("m")));
		assert_eq!(upgrade_schema(&upgraded).token(), upgraded.token());
	}
}
