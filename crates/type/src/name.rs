// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	sync::Arc,
};

use serde::{Deserialize, Serialize};

const MODULE_SEPARATOR: &str = "::";
const QUALIFIER_SEPARATOR: char = '@';

/// Name of an object that is not scoped to a module, such as a module
/// itself (`std::math`), a role or a migration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnqualName(Arc<str>);

impl UnqualName {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// First `::`-separated segment, e.g. `std` for `std::math`.
	pub fn root_module(&self) -> &str {
		root_segment(&self.0)
	}
}

impl Display for UnqualName {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for UnqualName {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Module-scoped name. The module part may itself contain `::`
/// (`std::math::abs` has module `std::math`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualName {
	module: Arc<str>,
	name: Arc<str>,
}

impl QualName {
	pub fn new(module: impl AsRef<str>, name: impl AsRef<str>) -> Self {
		Self {
			module: Arc::from(module.as_ref()),
			name: Arc::from(name.as_ref()),
		}
	}

	/// Splits at the last `::`. Returns `None` for unqualified input.
	pub fn parse(fqname: &str) -> Option<Self> {
		let (module, name) = fqname.rsplit_once(MODULE_SEPARATOR)?;
		if module.is_empty() || name.is_empty() {
			return None;
		}
		Some(Self::new(module, name))
	}

	pub fn module(&self) -> &str {
		&self.module
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn module_name(&self) -> UnqualName {
		UnqualName(self.module.clone())
	}

	pub fn root_module(&self) -> &str {
		root_segment(&self.module)
	}

	/// Builds the full name of an overloaded callable from its short name
	/// and the qualifiers that disambiguate the overload.
	pub fn specialized(shortname: &QualName, qualifiers: &[&str]) -> Self {
		let mut name = shortname.name.to_string();
		for qualifier in qualifiers {
			name.push(QUALIFIER_SEPARATOR);
			name.push_str(qualifier);
		}
		Self {
			module: shortname.module.clone(),
			name: Arc::from(name),
		}
	}

	/// Short name of an overloaded callable: the full name with every
	/// qualifier dropped. Names without qualifiers are their own short name.
	pub fn shortname(&self) -> Self {
		match self.name.split_once(QUALIFIER_SEPARATOR) {
			Some((short, _)) => Self {
				module: self.module.clone(),
				name: Arc::from(short),
			},
			None => self.clone(),
		}
	}

	pub fn is_specialized(&self) -> bool {
		self.name.contains(QUALIFIER_SEPARATOR)
	}
}

impl Display for QualName {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}{}", self.module, MODULE_SEPARATOR, self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Name {
	Unqual(UnqualName),
	Qual(QualName),
}

impl Name {
	/// `a::b::c` parses as module `a::b`, name `c`; anything without `::`
	/// is unqualified.
	pub fn parse(name: &str) -> Self {
		match QualName::parse(name) {
			Some(qual) => Name::Qual(qual),
			None => Name::Unqual(UnqualName::new(name)),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Name::Unqual(n) => n.as_str(),
			Name::Qual(n) => n.name(),
		}
	}

	pub fn module(&self) -> Option<&str> {
		match self {
			Name::Unqual(_) => None,
			Name::Qual(n) => Some(n.module()),
		}
	}

	pub fn root_module(&self) -> &str {
		match self {
			Name::Unqual(n) => n.root_module(),
			Name::Qual(n) => n.root_module(),
		}
	}

	pub fn is_qualified(&self) -> bool {
		matches!(self, Name::Qual(_))
	}

	pub fn as_qual(&self) -> Option<&QualName> {
		match self {
			Name::Qual(n) => Some(n),
			Name::Unqual(_) => None,
		}
	}

	pub fn as_unqual(&self) -> Option<&UnqualName> {
		match self {
			Name::Unqual(n) => Some(n),
			Name::Qual(_) => None,
		}
	}
}

impl Display for Name {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Name::Unqual(n) => Display::fmt(n, f),
			Name::Qual(n) => Display::fmt(n, f),
		}
	}
}

impl From<QualName> for Name {
	fn from(value: QualName) -> Self {
		Name::Qual(value)
	}
}

impl From<UnqualName> for Name {
	fn from(value: UnqualName) -> Self {
		Name::Unqual(value)
	}
}

impl From<&str> for Name {
	fn from(value: &str) -> Self {
		Name::parse(value)
	}
}

fn root_segment(path: &str) -> &str {
	match path.split_once(MODULE_SEPARATOR) {
		Some((root, _)) => root,
		None => path,
	}
}
