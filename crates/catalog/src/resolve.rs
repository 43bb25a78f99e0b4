// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use strata_type::{Name, QualName};
use tracing::trace;

use crate::{
	Catalog,
	consts::{STD_MODULE, STD_SENTINEL_MODULE},
};

/// Module alias map of a compilation context. The `None` key holds the
/// default module that unqualified names resolve in.
pub type ModuleAliases = HashMap<Option<String>, String>;

/// Rewrites the first segment of `module` through `aliases`. An absent
/// module is looked up under the `None` key.
pub fn apply_module_aliases(module: Option<&str>, aliases: Option<&ModuleAliases>) -> Option<String> {
	let Some(aliases) = aliases else {
		return module.map(str::to_string);
	};

	let (first, rest) = match module {
		Some(module) if !module.is_empty() => match module.split_once("::") {
			Some((first, rest)) => (Some(first.to_string()), Some(rest)),
			None => (Some(module.to_string()), None),
		},
		_ => (None, None),
	};

	match aliases.get(&first) {
		Some(target) => match rest {
			Some(rest) => Some(format!("{}::{}", target, rest)),
			None => Some(target.clone()),
		},
		None => module.map(str::to_string),
	}
}

/// Resolves `name` through `getter`, trying in order: the `__std__`
/// sentinel, the aliased name, `std::<name>` for unqualified names and
/// `std::<module>::<name>` when the module root is not a module of the
/// catalog. The first hit wins.
pub fn lookup<C, T>(
	catalog: &C,
	name: &Name,
	getter: impl Fn(&C, &QualName) -> Option<T>,
	module_aliases: Option<&ModuleAliases>,
) -> Option<T>
where
	C: Catalog,
{
	let obj_name = name.name();
	let orig_module = name.module();

	if orig_module == Some(STD_SENTINEL_MODULE) {
		return getter(catalog, &QualName::new(STD_MODULE, obj_name));
	}

	let module = apply_module_aliases(orig_module, module_aliases);

	if let Some(module) = &module {
		let fqname = QualName::new(module, obj_name);
		if let Some(found) = getter(catalog, &fqname) {
			return Some(found);
		}
	}

	if orig_module.is_none() {
		if let Some(found) = getter(catalog, &QualName::new(STD_MODULE, obj_name)) {
			return Some(found);
		}
	}

	if let Some(module) = module.filter(|m| !m.is_empty()) {
		let root = module.split("::").next().unwrap_or(&module);
		if !catalog.has_module(root) {
			let fqname = QualName::new(format!("{}::{}", STD_MODULE, module), obj_name);
			trace!(name = %fqname, "falling back to std submodule");
			return getter(catalog, &fqname);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	fn aliases(entries: &[(Option<&str>, &str)]) -> ModuleAliases {
		entries.iter().map(|(k, v)| (k.map(str::to_string), v.to_string())).collect()
	}

	#[test]
	fn test_alias_rewrites_first_segment() {
		let aliases = aliases(&[(Some("m"), "my_module")]);
		assert_eq!(apply_module_aliases(Some("m::sub"), Some(&aliases)), Some("my_module::sub".to_string()));
		assert_eq!(apply_module_aliases(Some("m"), Some(&aliases)), Some("my_module".to_string()));
		assert_eq!(apply_module_aliases(Some("other"), Some(&aliases)), Some("other".to_string()));
	}

	#[test]
	fn test_default_module_alias() {
		let aliases = aliases(&[(None, "default")]);
		assert_eq!(apply_module_aliases(None, Some(&aliases)), Some("default".to_string()));
		assert_eq!(apply_module_aliases(None, None), None);
		assert_eq!(apply_module_aliases(Some("std"), Some(&aliases)), Some("std".to_string()));
	}
}
