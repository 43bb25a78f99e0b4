// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// #![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(not(debug_assertions), deny(warnings))]
// #![cfg_attr(not(debug_assertions), deny(clippy::unwrap_used))]
// #![cfg_attr(not(debug_assertions), deny(clippy::expect_used))]

pub use error::{Error, diagnostic::Diagnostic};
pub use fragment::{Fragment, StatementColumn, StatementLine};
pub use id::ObjectId;
pub use name::{Name, QualName, UnqualName};

pub mod error;
pub mod fragment;
pub mod id;
pub mod name;
pub mod util;

pub type Result<T> = std::result::Result<T, Error>;
