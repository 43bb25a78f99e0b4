// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Prefixes `word` with the matching English indefinite article.
pub fn add_a(word: &str) -> String {
	match word.chars().next() {
		Some(c) if "aeiouAEIOU".contains(c) => format!("an {}", word),
		_ => format!("a {}", word),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_add_a() {
		assert_eq!(add_a("object type"), "an object type");
		assert_eq!(add_a("scalar type"), "a scalar type");
		assert_eq!(add_a("Extension"), "an Extension");
	}
}
