// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use strata_type::{Name, ObjectId, Result, return_internal_error};

use super::field::FieldType;

/// Ids referenced by one field, sorted and deduplicated.
pub type RefIds = SmallVec<[ObjectId; 4]>;

/// Reduced field data of one object, one slot per field of its kind.
pub type ObjectData = Arc<[Datum]>;

/// Source text of an expression plus the objects it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
	pub text: String,
	pub refs: BTreeSet<ObjectId>,
}

impl Expression {
	pub fn new(text: impl Into<String>, refs: impl IntoIterator<Item = ObjectId>) -> Self {
		Self {
			text: text.into(),
			refs: refs.into_iter().collect(),
		}
	}
}

/// Field value as callers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
	Bool(bool),
	Int(i64),
	Str(String),
	Name(Name),
	Object(ObjectId),
	ObjectList(Vec<ObjectId>),
	ObjectSet(BTreeSet<ObjectId>),
	ObjectDict(Vec<(String, ObjectId)>),
	Expression(Expression),
	StrList(Vec<String>),
}

impl FieldValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			FieldValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<ObjectId> {
		match self {
			FieldValue::Object(id) => Some(*id),
			_ => None,
		}
	}

	pub fn as_object_list(&self) -> Option<&[ObjectId]> {
		match self {
			FieldValue::ObjectList(ids) => Some(ids),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::Str(s) => Some(s),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionDatum {
	pub text: Arc<str>,
	pub refs: Arc<[ObjectId]>,
}

/// Stored form of a field. Containers are shared between catalog versions
/// and are never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
	#[default]
	Absent,
	Bool(bool),
	Int(i64),
	Str(Arc<str>),
	Name(Name),
	Object(ObjectId),
	ObjectList(Arc<[ObjectId]>),
	/// Sorted, unique.
	ObjectSet(Arc<[ObjectId]>),
	ObjectDict(Arc<[(Arc<str>, ObjectId)]>),
	Expression(Arc<ExpressionDatum>),
	StrList(Arc<[Arc<str>]>),
}

static ABSENT: Datum = Datum::Absent;

impl Datum {
	pub fn is_absent(&self) -> bool {
		matches!(self, Datum::Absent)
	}

	pub fn as_name(&self) -> Option<&Name> {
		match self {
			Datum::Name(name) => Some(name),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Datum::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<ObjectId> {
		match self {
			Datum::Object(id) => Some(*id),
			_ => None,
		}
	}

	pub fn as_object_list(&self) -> Option<&[ObjectId]> {
		match self {
			Datum::ObjectList(ids) | Datum::ObjectSet(ids) => Some(ids),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Datum::Str(s) => Some(s),
			_ => None,
		}
	}
}

/// Slot `index` of `data`. Vectors written before a field was registered
/// are shorter than the class; their missing slots read as absent.
pub fn datum_at(data: &[Datum], index: usize) -> &Datum {
	data.get(index).unwrap_or(&ABSENT)
}

/// Normalizes a field value into its stored form.
pub fn reduce(ty: &FieldType, value: FieldValue) -> Result<Datum> {
	let datum = match (ty, value) {
		(FieldType::Bool, FieldValue::Bool(b)) => Datum::Bool(b),
		(FieldType::Int, FieldValue::Int(i)) => Datum::Int(i),
		(FieldType::Str, FieldValue::Str(s)) => Datum::Str(Arc::from(s)),
		(FieldType::Name, FieldValue::Name(name)) => Datum::Name(name),
		(FieldType::Object, FieldValue::Object(id)) => Datum::Object(id),
		(FieldType::ObjectList, FieldValue::ObjectList(ids)) => Datum::ObjectList(Arc::from(ids)),
		(FieldType::ObjectSet, FieldValue::ObjectSet(ids)) => Datum::ObjectSet(ids.into_iter().collect()),
		(FieldType::ObjectDict, FieldValue::ObjectDict(entries)) => {
			Datum::ObjectDict(entries.into_iter().map(|(key, id)| (Arc::from(key), id)).collect())
		}
		(FieldType::Expression, FieldValue::Expression(expr)) => Datum::Expression(Arc::new(ExpressionDatum {
			text: Arc::from(expr.text),
			refs: expr.refs.into_iter().collect(),
		})),
		(FieldType::StrList, FieldValue::StrList(items)) => {
			Datum::StrList(items.into_iter().map(Arc::<str>::from).collect())
		}
		(ty, value) => {
			return_internal_error!("cannot store {:?} in a field of type {}", value, ty.name())
		}
	};
	Ok(datum)
}

/// Rebuilds the caller-facing value of a stored field. Absent slots have no
/// value.
pub fn restore(datum: &Datum) -> Option<FieldValue> {
	let value = match datum {
		Datum::Absent => return None,
		Datum::Bool(b) => FieldValue::Bool(*b),
		Datum::Int(i) => FieldValue::Int(*i),
		Datum::Str(s) => FieldValue::Str(s.to_string()),
		Datum::Name(name) => FieldValue::Name(name.clone()),
		Datum::Object(id) => FieldValue::Object(*id),
		Datum::ObjectList(ids) => FieldValue::ObjectList(ids.to_vec()),
		Datum::ObjectSet(ids) => FieldValue::ObjectSet(ids.iter().copied().collect()),
		Datum::ObjectDict(entries) => {
			FieldValue::ObjectDict(entries.iter().map(|(key, id)| (key.to_string(), *id)).collect())
		}
		Datum::Expression(expr) => FieldValue::Expression(Expression {
			text: expr.text.to_string(),
			refs: expr.refs.iter().copied().collect(),
		}),
		Datum::StrList(items) => FieldValue::StrList(items.iter().map(|s| s.to_string()).collect()),
	};
	Some(value)
}

/// Ids of the objects a stored field points at.
pub fn referenced_ids(datum: &Datum) -> RefIds {
	let mut ids: RefIds = match datum {
		Datum::Object(id) => return smallvec![*id],
		Datum::ObjectSet(ids) => return ids.iter().copied().collect(),
		Datum::ObjectList(ids) => ids.iter().copied().collect(),
		Datum::ObjectDict(entries) => entries.iter().map(|(_, id)| *id).collect(),
		Datum::Expression(expr) => return expr.refs.iter().copied().collect(),
		_ => return RefIds::new(),
	};
	ids.sort_unstable();
	ids.dedup();
	ids
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(n: u128) -> ObjectId {
		ObjectId::from_u128(n)
	}

	#[test]
	fn test_object_set_is_canonical() {
		let value = FieldValue::ObjectSet([id(3), id(1), id(2)].into_iter().collect());
		let datum = reduce(&FieldType::ObjectSet, value.clone()).unwrap();
		assert_eq!(datum, Datum::ObjectSet(Arc::from(vec![id(1), id(2), id(3)])));
		assert_eq!(restore(&datum), Some(value));
	}

	#[test]
	fn test_object_list_keeps_order_and_duplicates() {
		let value = FieldValue::ObjectList(vec![id(2), id(1), id(2)]);
		let datum = reduce(&FieldType::ObjectList, value.clone()).unwrap();
		assert_eq!(restore(&datum), Some(value));
		assert_eq!(referenced_ids(&datum).as_slice(), &[id(1), id(2)]);
	}

	#[test]
	fn test_object_dict_round_trip() {
		let value = FieldValue::ObjectDict(vec![("b".to_string(), id(9)), ("a".to_string(), id(4))]);
		let datum = reduce(&FieldType::ObjectDict, value.clone()).unwrap();
		assert_eq!(restore(&datum), Some(value));
		assert_eq!(referenced_ids(&datum).as_slice(), &[id(4), id(9)]);
	}

	#[test]
	fn test_expression_refs() {
		let value = FieldValue::Expression(Expression::new("len(.name) > 0", [id(7), id(5)]));
		let datum = reduce(&FieldType::Expression, value.clone()).unwrap();
		assert_eq!(referenced_ids(&datum).as_slice(), &[id(5), id(7)]);
		assert_eq!(restore(&datum), Some(value));
	}

	#[test]
	fn test_values_are_stored_as_given() {
		for (ty, value) in [
			(FieldType::Object, FieldValue::Object(id(4))),
			(FieldType::StrList, FieldValue::StrList(vec!["b".to_string(), "a".to_string(), "b".to_string()])),
			(FieldType::Int, FieldValue::Int(-42)),
			(FieldType::Str, FieldValue::Str("héllo".to_string())),
			(FieldType::Str, FieldValue::Str(String::new())),
			(FieldType::Bool, FieldValue::Bool(false)),
			(FieldType::Name, FieldValue::Name(Name::parse("m::X"))),
		] {
			let datum = reduce(&ty, value.clone()).unwrap();
			assert_eq!(restore(&datum), Some(value));
		}
	}

	#[test]
	fn test_plain_fields_have_no_refs() {
		let datum = reduce(&FieldType::Str, FieldValue::Str("abc".to_string())).unwrap();
		assert!(referenced_ids(&datum).is_empty());
		assert!(referenced_ids(&Datum::Absent).is_empty());
		assert_eq!(referenced_ids(&Datum::Object(id(1))).as_slice(), &[id(1)]);
	}

	#[test]
	fn test_type_mismatch_is_internal_error() {
		let err = reduce(&FieldType::ObjectList, FieldValue::Bool(true)).unwrap_err();
		assert!(err.is_internal());
	}

	#[test]
	fn test_datum_at_reads_short_vectors_as_absent() {
		let data: ObjectData = Arc::from(vec![Datum::Bool(true)]);
		assert_eq!(datum_at(&data, 0), &Datum::Bool(true));
		assert!(datum_at(&data, 5).is_absent());
	}
}
