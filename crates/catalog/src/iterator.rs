// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeSet;

use strata_type::{Name, Result};

use crate::{
	Catalog,
	consts::{EXT_MODULE, STD_MODULES},
	object::{KindSet, Object, ObjectKind},
};

type Predicate<'a> = Box<dyn Fn(Object) -> bool + Send + Sync + 'a>;

/// Selection criteria of a [`CatalogIterator`].
pub struct ObjectFilter<'a> {
	kinds: Option<KindSet>,
	included_modules: Option<BTreeSet<String>>,
	excluded_modules: BTreeSet<String>,
	included_items: Option<BTreeSet<Name>>,
	excluded_items: BTreeSet<Name>,
	exclude_stdlib: bool,
	exclude_extensions: bool,
	exclude_global: bool,
	exclude_internal: bool,
	extra: Vec<Predicate<'a>>,
}

impl Default for ObjectFilter<'_> {
	fn default() -> Self {
		Self {
			kinds: None,
			included_modules: None,
			excluded_modules: BTreeSet::new(),
			included_items: None,
			excluded_items: BTreeSet::new(),
			exclude_stdlib: false,
			exclude_extensions: false,
			exclude_global: false,
			exclude_internal: true,
			extra: Vec::new(),
		}
	}
}

impl<'a> ObjectFilter<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn kind(self, kind: ObjectKind) -> Self {
		self.kinds(kind.as_set())
	}

	pub fn kinds(mut self, kinds: KindSet) -> Self {
		self.kinds = Some(kinds);
		self
	}

	pub fn include_modules<I, S>(mut self, modules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.included_modules.get_or_insert_with(BTreeSet::new).extend(modules.into_iter().map(Into::into));
		self
	}

	pub fn exclude_modules<I, S>(mut self, modules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.excluded_modules.extend(modules.into_iter().map(Into::into));
		self
	}

	pub fn include_items(mut self, items: impl IntoIterator<Item = Name>) -> Self {
		self.included_items.get_or_insert_with(BTreeSet::new).extend(items);
		self
	}

	pub fn exclude_items(mut self, items: impl IntoIterator<Item = Name>) -> Self {
		self.excluded_items.extend(items);
		self
	}

	pub fn exclude_stdlib(mut self, exclude: bool) -> Self {
		self.exclude_stdlib = exclude;
		self
	}

	pub fn exclude_extensions(mut self, exclude: bool) -> Self {
		self.exclude_extensions = exclude;
		self
	}

	pub fn exclude_global(mut self, exclude: bool) -> Self {
		self.exclude_global = exclude;
		self
	}

	pub fn exclude_internal(mut self, exclude: bool) -> Self {
		self.exclude_internal = exclude;
		self
	}

	/// Adds a predicate that runs after every built-in one.
	pub fn filter(mut self, predicate: impl Fn(Object) -> bool + Send + Sync + 'a) -> Self {
		self.extra.push(Box::new(predicate));
		self
	}

	fn excludes_module(&self, module: &str) -> bool {
		self.excluded_modules.contains(module) || (self.exclude_stdlib && STD_MODULES.contains(&module))
	}

	fn accepts<C: Catalog>(&self, catalog: &C, obj: Object) -> Result<bool> {
		if let Some(kinds) = self.kinds {
			if !kinds.contains_kind(obj.kind) {
				return Ok(false);
			}
		}

		let name = catalog.get_name(obj)?;
		let module = name.module();

		if let Some(included) = &self.included_modules {
			if !module.map(|module| included.contains(module)).unwrap_or(false) {
				return Ok(false);
			}
		}

		if let Some(module) = module {
			if self.excludes_module(module) {
				return Ok(false);
			}
		}

		if let Some(included) = &self.included_items {
			if !included.contains(&name) {
				return Ok(false);
			}
		}

		if self.excluded_items.contains(&name) {
			return Ok(false);
		}

		if self.exclude_stdlib && obj.kind == ObjectKind::PseudoType {
			return Ok(false);
		}

		if self.exclude_extensions && name.root_module() == EXT_MODULE {
			return Ok(false);
		}

		if self.exclude_global && obj.kind.is_global() {
			return Ok(false);
		}

		if self.exclude_internal && obj.kind.is_internal() {
			return Ok(false);
		}

		Ok(self.extra.iter().all(|predicate| predicate(obj)))
	}
}

/// Lazy traversal of the objects of a catalog value. Ids are walked straight
/// off the catalog's maps and predicates are evaluated while iterating;
/// every call to [`iter`](Self::iter) starts over.
pub struct CatalogIterator<'a, C: Catalog> {
	catalog: &'a C,
	filter: ObjectFilter<'a>,
}

impl<'a, C: Catalog> CatalogIterator<'a, C> {
	pub fn new(catalog: &'a C, filter: ObjectFilter<'a>) -> Self {
		Self {
			catalog,
			filter,
		}
	}

	/// Objects passing the filter. An object whose name cannot be read
	/// yields the error in its place.
	pub fn iter(&self) -> impl Iterator<Item = Result<Object>> + '_ {
		self.catalog.object_ids().filter_map(|id| self.catalog.find_by_id(id)).filter_map(|obj| {
			match self.filter.accepts(self.catalog, obj) {
				Ok(true) => Some(Ok(obj)),
				Ok(false) => None,
				Err(err) => Some(Err(err)),
			}
		})
	}
}

impl<'s, 'a, C: Catalog> IntoIterator for &'s CatalogIterator<'a, C> {
	type Item = Result<Object>;
	type IntoIter = Box<dyn Iterator<Item = Result<Object>> + 's>;

	fn into_iter(self) -> Self::IntoIter {
		Box::new(self.iter())
	}
}
