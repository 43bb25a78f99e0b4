// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identity of a catalog object.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	pub const fn from_u128(value: u128) -> Self {
		Self(Uuid::from_u128(value))
	}

	pub const fn nil() -> Self {
		Self(Uuid::nil())
	}
}

impl Deref for ObjectId {
	type Target = Uuid;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<Uuid> for ObjectId {
	fn from(value: Uuid) -> Self {
		Self(value)
	}
}

impl From<ObjectId> for Uuid {
	fn from(value: ObjectId) -> Self {
		value.0
	}
}

impl Display for ObjectId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}
