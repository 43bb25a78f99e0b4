// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_type::{
	Name, ObjectId, QualName, Result, error::diagnostic::catalog::duplicate_id, return_error,
	return_internal_error,
};
use tracing::{debug, instrument};

use crate::{
	FlatCatalog, LayeredCatalog,
	flat::{FlatState, ObjectEntry, check_name_shape},
	object::{Datum, NAME_FIELD, ObjectKind, datum_at},
};

/// Serializable snapshot of one flat catalog. Only the primary store is
/// kept; every index is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogImage {
	pub objects: Vec<ImageObject>,
	/// Qualified-name bindings. Stored apart from the objects since a
	/// delisted name may have been taken by another object.
	pub names: Vec<(QualName, ObjectId)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
	pub id: ObjectId,
	/// Stable kind name, see [`ObjectKind::name`].
	pub kind: String,
	pub data: Vec<Datum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredImage {
	pub base: CatalogImage,
	pub top: CatalogImage,
	pub global: CatalogImage,
}

impl CatalogImage {
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}
}

impl LayeredImage {
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}
}

impl FlatCatalog {
	pub fn to_image(&self) -> CatalogImage {
		CatalogImage {
			objects: self
				.state()
				.objects
				.iter()
				.map(|(id, entry)| ImageObject {
					id: *id,
					kind: entry.kind.name().to_string(),
					data: entry.data.to_vec(),
				})
				.collect(),
			names: self.state().name_to_id.iter().map(|(name, id)| (name.clone(), *id)).collect(),
		}
	}

	/// Rebuilds a catalog and all of its indexes from `image`. The image is
	/// trusted: module presence is not checked.
	#[instrument(name = "catalog::image::load", level = "debug", skip(image), fields(objects = image.objects.len()))]
	pub fn from_image(image: &CatalogImage) -> Result<Self> {
		let mut state = FlatState::default();

		for object in &image.objects {
			let Some(kind) = ObjectKind::from_name(&object.kind) else {
				return_internal_error!("catalog image holds unknown object kind '{}'", object.kind);
			};
			let Some(name) = datum_at(&object.data, NAME_FIELD).as_name() else {
				return_internal_error!("catalog image holds {} {} without a name", kind, object.id);
			};

			match name {
				Name::Qual(_) => check_name_shape(object.id, kind, name)?,
				Name::Unqual(_) => state.check_name_free(object.id, kind, name)?,
			}
			if state.objects.contains_key(&object.id) {
				return_error!(duplicate_id(kind.display_name(), object.id));
			}
			match name {
				Name::Qual(name) => state.bind_shortname(object.id, kind, name),
				Name::Unqual(_) => state.update_obj_name(object.id, kind, None, Some(name), false)?,
			}
			state.refs_to.update_object(object.id, kind, None, Some(&object.data[..]))?;
			state.objects.insert(object.id, ObjectEntry {
				kind,
				data: Arc::from(object.data.as_slice()),
			});
		}

		for (name, id) in &image.names {
			let kind = match state.objects.get(id) {
				Some(entry) if datum_at(&entry.data, NAME_FIELD).as_name() == Some(&Name::Qual(name.clone())) => {
					entry.kind
				}
				Some(entry) => {
					return_internal_error!("catalog image binds '{}' to {} {} of another name", name, entry.kind, id)
				}
				None => return_internal_error!("catalog image binds '{}' to unknown object {}", name, id),
			};
			state.check_name_free(*id, kind, &Name::Qual(name.clone()))?;
			state.name_to_id.insert(name.clone(), *id);
		}

		debug!(
			objects = state.objects.len(),
			references = state.refs_to.len(),
			"rebuilt catalog indexes from image"
		);
		Ok(FlatCatalog::from_state(state, 0))
	}

	pub fn to_image_bytes(&self) -> Result<Vec<u8>> {
		self.to_image().to_bytes()
	}

	pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
		Self::from_image(&CatalogImage::from_bytes(bytes)?)
	}
}

impl LayeredCatalog {
	pub fn to_image(&self) -> LayeredImage {
		LayeredImage {
			base: self.base().to_image(),
			top: self.top().to_image(),
			global: self.global().to_image(),
		}
	}

	pub fn from_image(image: &LayeredImage) -> Result<Self> {
		Ok(LayeredCatalog::new(
			FlatCatalog::from_image(&image.base)?,
			FlatCatalog::from_image(&image.top)?,
			FlatCatalog::from_image(&image.global)?,
		))
	}

	pub fn to_image_bytes(&self) -> Result<Vec<u8>> {
		self.to_image().to_bytes()
	}

	pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
		Self::from_image(&LayeredImage::from_bytes(bytes)?)
	}
}
