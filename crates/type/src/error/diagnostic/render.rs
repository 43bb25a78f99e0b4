// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use crate::error::diagnostic::Diagnostic;

pub trait DiagnosticRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String;
}

pub struct DefaultRenderer;

impl DiagnosticRenderer for DefaultRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String {
		let mut output = String::new();
		render_nested(&mut output, diagnostic, 0);
		output
	}
}

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		DefaultRenderer.render(diagnostic)
	}
}

fn get_line(source: &str, line: u32) -> &str {
	source.lines().nth(line.saturating_sub(1) as usize).unwrap_or("")
}

fn render_nested(output: &mut String, d: &Diagnostic, depth: usize) {
	let indent = "  ".repeat(depth);

	let _ = writeln!(output, "{}error[{}]: {}", indent, d.code, d.message);

	if let (Some(line), Some(column)) = (d.fragment.line(), d.fragment.column()) {
		let line_number_width = line.to_string().len().max(2);
		let source = d.statement.as_deref().map(|s| get_line(s, *line)).unwrap_or(d.fragment.text());
		let offset = if d.statement.is_some() {
			column.saturating_sub(1) as usize
		} else {
			0
		};

		let _ = writeln!(output, "{} {:>width$} │ {}", indent, *line, source, width = line_number_width);
		let _ = writeln!(
			output,
			"{} {:>width$} │ {}{}",
			indent,
			"",
			" ".repeat(offset),
			"^".repeat(d.fragment.text().chars().count().max(1)),
			width = line_number_width
		);
		if let Some(label) = &d.label {
			let _ = writeln!(output, "{} {:>width$} = {}", indent, "", label, width = line_number_width);
		}
	} else if let Some(label) = &d.label {
		let _ = writeln!(output, "{}  = {}", indent, label);
	}

	if let Some(column) = &d.column {
		let _ = writeln!(output, "\n{}note: field `{}` of {}", indent, column.name, column.kind);
	}

	if let Some(help) = &d.help {
		let _ = writeln!(output, "\n{}help: {}", indent, help);
	}

	for note in &d.notes {
		let _ = writeln!(output, "\n{}note: {}", indent, note);
	}

	if let Some(cause) = &d.cause {
		let _ = writeln!(output, "\n{}caused by:", indent);
		render_nested(output, cause, depth + 1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fragment::Fragment;

	fn diagnostic(fragment: Fragment) -> Diagnostic {
		Diagnostic {
			code: "CATALOG_004".to_string(),
			statement: None,
			message: "object type 'default::User' does not exist".to_string(),
			column: None,
			fragment,
			label: Some("unknown object".to_string()),
			help: Some("check the name".to_string()),
			notes: vec![],
			cause: None,
		}
	}

	#[test]
	fn test_render_without_fragment() {
		let out = DefaultRenderer::render_string(&diagnostic(Fragment::None));
		assert!(out.starts_with("error[CATALOG_004]: object type 'default::User' does not exist"));
		assert!(out.contains("= unknown object"));
		assert!(out.contains("help: check the name"));
	}

	#[test]
	fn test_render_points_at_statement_column() {
		let mut d = diagnostic(Fragment::statement("User", 1, 8));
		d.with_statement("SELECT User".to_string());
		let out = DefaultRenderer::render_string(&d);
		assert!(out.contains(" 1 │ SELECT User"));
		assert!(out.contains("│        ^^^^"));
	}

	#[test]
	fn test_render_cause_is_nested() {
		let d = diagnostic(Fragment::None).with_cause(diagnostic(Fragment::None));
		let out = DefaultRenderer::render_string(&d);
		assert!(out.contains("caused by:"));
		assert!(out.contains("  error[CATALOG_004]"));
	}
}
