// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{error::diagnostic::Diagnostic, fragment::Fragment};

pub fn serde_serialize_error(reason: String) -> Diagnostic {
	Diagnostic {
		code: "IMAGE_001".to_string(),
		statement: None,
		message: format!("catalog image serialization error: {}", reason),
		column: None,
		fragment: Fragment::None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn serde_deserialize_error(reason: String) -> Diagnostic {
	Diagnostic {
		code: "IMAGE_002".to_string(),
		statement: None,
		message: format!("catalog image deserialization error: {}", reason),
		column: None,
		fragment: Fragment::None,
		label: None,
		help: Some("the image is truncated or was not produced by this catalog version".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn postcard_error(err: postcard::Error) -> Diagnostic {
	match err {
		postcard::Error::SerializeBufferFull
		| postcard::Error::SerializeSeqLengthUnknown
		| postcard::Error::SerdeSerCustom => serde_serialize_error(err.to_string()),
		_ => serde_deserialize_error(err.to_string()),
	}
}
