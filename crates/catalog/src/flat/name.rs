// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use strata_type::{
	Fragment, Name, ObjectId, QualName, Result, UnqualName,
	error::diagnostic::catalog::{duplicate_name, unknown_module},
	return_error, return_internal_error,
};

use super::FlatState;
use crate::{
	consts::is_special_module,
	object::{NAME_FIELD, ObjectKind, datum_at},
};

impl FlatState {
	/// Id currently bound to `name` in the index `kind` names live in.
	pub(crate) fn name_owner(&self, kind: ObjectKind, name: &Name) -> Option<ObjectId> {
		match name {
			Name::Qual(name) => self.name_to_id.get(name).copied(),
			Name::Unqual(name) => self.globalname_to_id.get(&(kind, name.clone())).copied(),
		}
	}

	pub(crate) fn has_module(&self, module: &str) -> bool {
		self.globalname_to_id.contains_key(&(ObjectKind::Module, UnqualName::new(module)))
	}

	/// Fails with `DuplicateName` when `name` is bound to another object.
	pub(crate) fn check_name_free(&self, id: ObjectId, kind: ObjectKind, name: &Name) -> Result<()> {
		check_name_shape(id, kind, name)?;
		match self.name_owner(kind, name) {
			Some(owner) if owner != id => {
				return_error!(duplicate_name(Fragment::None, &self.verbose_name(owner, name)))
			}
			_ => Ok(()),
		}
	}

	/// Moves the name bindings of `id` from `old` to `new`. `None` on
	/// either side stands for an object without a binding.
	pub(crate) fn update_obj_name(
		&mut self,
		id: ObjectId,
		kind: ObjectKind,
		old: Option<&Name>,
		new: Option<&Name>,
		check_module: bool,
	) -> Result<()> {
		if old == new {
			return Ok(());
		}

		if let Some(new) = new {
			self.check_name_free(id, kind, new)?;
			if check_module {
				self.check_module(new)?;
			}
		}

		if let Some(old) = old {
			self.unbind(id, kind, old);
		}
		if let Some(new) = new {
			self.bind(id, kind, new);
		}
		Ok(())
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

	fn bind(&mut self, id: ObjectId, kind: ObjectKind, name: &Name) {
		match name {
			Name::Qual(name) => {
				self.name_to_id.insert(name.clone(), id);
				self.bind_shortname(id, kind, name);
			}
			Name::Unqual(name) => {
				self.globalname_to_id.insert((kind, name.clone()), id);
			}
		}
	}

	/// Shortname binding only; the qualified binding is left alone.
	pub(crate) fn bind_shortname(&mut self, id: ObjectId, kind: ObjectKind, name: &QualName) {
		if kind.has_shortname() {
			let key = (kind, name.shortname());
			let mut ids = self.shortname_to_id.get(&key).cloned().unwrap_or_default();
			ids.insert(id);
			self.shortname_to_id.insert(key, ids);
		}
	}

	fn unbind(&mut self, id: ObjectId, kind: ObjectKind, name: &Name) {
		match name {
			Name::Qual(name) => {
				// a delisted name may have been rebound to another object
				if self.name_to_id.get(name) == Some(&id) {
					self.name_to_id.remove(name);
				}
				if kind.has_shortname() {
					let key = (kind, name.shortname());
					if let Some(mut ids) = self.shortname_to_id.get(&key).cloned() {
						ids.remove(&id);
						if ids.is_empty() {
							self.shortname_to_id.remove(&key);
						} else {
							self.shortname_to_id.insert(key, ids);
						}
					}
				}
			}
			Name::Unqual(name) => {
				let key = (kind, name.clone());
				if self.globalname_to_id.get(&key) == Some(&id) {
					self.globalname_to_id.remove(&key);
				}
			}
		}
	}

	fn verbose_name(&self, id: ObjectId, fallback: &Name) -> String {
		match self.objects.get(&id) {
			Some(entry) => {
				let name = datum_at(&entry.data, NAME_FIELD).as_name().unwrap_or(fallback);
				format!("{} '{}'", entry.kind.display_name(), name)
			}
			None => format!("'{}'", fallback),
		}
	}
}

/// Qualified kinds carry qualified names and everything else an
/// unqualified one.
pub(crate) fn check_name_shape(id: ObjectId, kind: ObjectKind, name: &Name) -> Result<()> {
	if kind.is_qualified() != name.is_qualified() {
		return_internal_error!(
			"{} {} cannot be named '{}': {} names are {}",
			kind,
			id,
			name,
			kind,
			if kind.is_qualified() {
				"qualified"
			} else {
				"unqualified"
			}
		);
	}
	Ok(())
}
