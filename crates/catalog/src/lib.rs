// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// #![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(not(debug_assertions), deny(warnings))]
// #![cfg_attr(not(debug_assertions), deny(clippy::unwrap_used))]
// #![cfg_attr(not(debug_assertions), deny(clippy::expect_used))]

pub use cache::{CatalogToken, QueryCache};
pub use catalog::{Catalog, LookupOptions};
pub use flat::{FlatCatalog, ObjectEntry};
pub use image::{CatalogImage, ImageObject, LayeredImage};
pub use iterator::{CatalogIterator, ObjectFilter};
pub use layered::LayeredCatalog;
pub use migration::get_last_migration;
pub use object::{
	Datum, Expression, FieldDef, FieldType, FieldValue, KindSet, Object, ObjectData, ObjectKind, SchemaClass,
	schema_class,
};
pub use reference::{ReferenceIndex, ReferrerMap};
pub use resolve::{ModuleAliases, apply_module_aliases, lookup};
pub use strata_type::{Error, Result};
pub use upgrade::{Upgrade, upgrade_schema};

mod cache;
mod catalog;
pub mod consts;
mod flat;
mod image;
mod iterator;
mod layered;
mod migration;
pub mod object;
pub mod reference;
mod resolve;
pub mod test_utils;
mod upgrade;
