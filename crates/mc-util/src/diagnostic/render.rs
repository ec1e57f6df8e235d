//! Textual rendering of diagnostics (§6.4).
//!
//! Format:
//! ```text
//! <filename>:<line>:<col>: error: <kind-description>: <message>
//!   NN | <source line>
//!      |    ^
//! ```
//! The caret line copies any leading tab characters from the source line so
//! the caret still lines up under the offending column in a terminal that
//! renders tabs wider than one column.

use super::Diagnostic;

/// Render one diagnostic against the full source text of the file it came
/// from. `source` is the complete file contents; the relevant line is
/// extracted by 1-based line number.
pub fn render_diagnostic(diag: &Diagnostic, filename: &str, source: &str) -> String {
    let mut out = format!(
        "{}:{}:{}: {}: {}: {}",
        filename, diag.line, diag.column, diag.level, diag.kind, diag.message
    );

    if let Some(line_text) = source.lines().nth(diag.line.saturating_sub(1) as usize) {
        out.push('\n');
        out.push_str(&format!("{:>4} | {}\n", diag.line, line_text));

        let gutter = "     | ";
        out.push_str(gutter);
        let col = diag.column.saturating_sub(1) as usize;
        for ch in line_text.chars().take(col) {
            out.push(if ch == '\t' { '\t' } else { ' ' });
        }
        out.push('^');
    }

    for note in &diag.notes {
        out.push_str(&format!("\n  note: {note}"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticKind, Level};

    #[test]
    fn renders_filename_line_col_kind_and_message() {
        let diag = Diagnostic::new(Level::Error, DiagnosticKind::UndefinedSymbol, "undefined symbol `y`", 1, 1);
        let rendered = render_diagnostic(&diag, "main.m", "y = 1;\n");
        assert!(rendered.starts_with("main.m:1:1: error: undefined symbol: undefined symbol `y`"));
    }

    #[test]
    fn caret_lines_up_under_the_column() {
        let diag = Diagnostic::new(Level::Error, DiagnosticKind::TypeError, "expected `bool`, found `i32`", 2, 5);
        let rendered = render_diagnostic(&diag, "f.m", "line one\nif (x) {}\n");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "   2 | if (x) {}");
        assert_eq!(lines[2], "     |     ^");
    }

    #[test]
    fn preserves_leading_tabs_in_caret_line() {
        let diag = Diagnostic::new(Level::Error, DiagnosticKind::TypeError, "msg", 1, 3);
        let source = "\ty = 1;\n";
        let rendered = render_diagnostic(&diag, "f.m", source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[2].starts_with("     | \t^"));
    }
}
