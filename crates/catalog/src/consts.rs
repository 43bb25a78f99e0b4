// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Root of the standard library.
pub const STD_MODULE: &str = "std";

/// Root module that every extension installs its modules under.
pub const EXT_MODULE: &str = "ext";

/// Pseudo-module that forces resolution against `std`, ignoring aliases.
pub const STD_SENTINEL_MODULE: &str = "__std__";

pub const STD_MODULES: &[&str] = &[
	"std",
	"schema",
	"std::math",
	"sys",
	"sys::perm",
	"cfg",
	"cfg::perm",
	"std::cal",
	"std::net",
	"std::net::http",
	"std::net::perm",
	"std::pg",
	"std::_test",
	"std::fts",
	"std::lang",
	"std::lang::go",
	"std::lang::js",
	"std::lang::py",
	"std::lang::rs",
	"ext",
	"std::enc",
];

/// Modules that never exist as objects; qualified names under them skip the
/// module presence check.
pub const SPECIAL_MODULES: &[&str] = &["__derived__", "__ext_casts__", "__ext_index_matches__"];

pub fn is_std_module(module: &str) -> bool {
	STD_MODULES.contains(&module)
}

pub fn is_special_module(module: &str) -> bool {
	SPECIAL_MODULES.contains(&module)
}
