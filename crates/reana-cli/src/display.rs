//! Colorized message, table, and JSON rendering.
//!
//! Messages carry a severity tag; tables use an uppercase header and no
//! borders; JSON is indented with two spaces and ends with a newline.

use std::io::Write;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::error::CliError;

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation completed.
    Success,
    /// Something worth the user's attention, execution continues.
    Warning,
    /// Operation failed.
    Error,
    /// Neutral information.
    Info,
}

impl Severity {
    const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Success => Some("SUCCESS"),
            Self::Warning => Some("WARNING"),
            Self::Error => Some("ERROR"),
            Self::Info => None,
        }
    }

    fn colorize(self, text: String) -> ColoredString {
        match self {
            Self::Success => text.green(),
            Self::Warning => text.yellow(),
            Self::Error => text.red(),
            Self::Info => text.normal(),
        }
    }
}

/// Write a severity-tagged message.
///
/// Tagged kinds render a bold `==> ` prefix (`  -> ` when indented), the
/// uppercase tag, and the colorized text. Info at top indent renders the
/// whole line bold without a tag; indented info renders plain.
pub fn message<W: Write>(
    writer: &mut W,
    text: &str,
    severity: Severity,
    indented: bool,
) -> Result<(), CliError> {
    let prefix = if indented { "  -> " } else { "==> " };
    match severity.tag() {
        Some(tag) => {
            write!(writer, "{}", prefix.bold())?;
            writeln!(writer, "{}", severity.colorize(format!("{tag}: {text}")))?;
        }
        None if indented => {
            writeln!(writer, "{prefix}{text}")?;
        }
        None => {
            writeln!(writer, "{}", format!("{prefix}{text}").bold())?;
        }
    }
    Ok(())
}

/// Write a borderless table with an uppercase header.
///
/// Column widths fit the widest cell; columns are separated by two spaces.
pub fn table<W: Write>(
    writer: &mut W,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<(), CliError> {
    let rendered_headers: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();
    let mut widths: Vec<usize> = rendered_headers.iter().map(String::len).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if index < widths.len() && cell.len() > widths[index] {
                widths[index] = cell.len();
            }
        }
    }

    write_row(writer, &rendered_headers, &widths)?;
    for row in rows {
        write_row(writer, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> Result<(), CliError> {
    let last = cells.len().saturating_sub(1);
    for (index, cell) in cells.iter().enumerate() {
        if index == last {
            // No trailing padding on the last column.
            write!(writer, "{cell}")?;
        } else {
            write!(writer, "{:<width$}  ", cell, width = widths[index])?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

/// Write a value as indented JSON with a trailing newline.
pub fn json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
    writeln!(writer)?;
    Ok(())
}

/// Colorize one diff line: `@` hunk markers cyan, removals red,
/// additions green, context unchanged.
#[must_use]
pub fn diff_line(line: &str) -> ColoredString {
    match line.chars().next() {
        Some('@') => line.cyan(),
        Some('-') => line.red(),
        Some('+') => line.green(),
        _ => line.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_message(text: &str, severity: Severity, indented: bool) -> String {
        let mut buf = Vec::new();
        message(&mut buf, text, severity, indented).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn error_message_is_tagged_and_prefixed() {
        let out = render_message("something failed", Severity::Error, false);
        assert!(out.contains("==> "));
        assert!(out.contains("ERROR: something failed"));
    }

    #[test]
    fn warning_message_is_tagged() {
        let out = render_message("careful", Severity::Warning, false);
        assert!(out.contains("WARNING: careful"));
    }

    #[test]
    fn indented_message_uses_arrow_prefix() {
        let out = render_message("File deleted", Severity::Success, true);
        assert!(out.contains("  -> "));
        assert!(out.contains("SUCCESS: File deleted"));
    }

    #[test]
    fn top_level_info_has_no_tag() {
        let out = render_message("Connecting", Severity::Info, false);
        assert!(out.contains("==> Connecting"));
        assert!(!out.contains("INFO"));
    }

    #[test]
    fn indented_info_is_plain() {
        let out = render_message("detail", Severity::Info, true);
        assert_eq!(out.trim_end(), "  -> detail");
    }

    #[test]
    fn table_uppercases_headers_and_aligns_columns() {
        let mut buf = Vec::new();
        table(
            &mut buf,
            &["name".into(), "status".into()],
            &[
                vec!["my_workflow".into(), "running".into()],
                vec!["w2".into(), "finished".into()],
            ],
        )
        .expect("write");
        let out = String::from_utf8(buf).expect("utf8");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("NAME         STATUS"));
        assert_eq!(lines.next(), Some("my_workflow  running"));
        assert_eq!(lines.next(), Some("w2           finished"));
    }

    #[test]
    fn json_is_indented_with_two_spaces() {
        let mut buf = Vec::new();
        json(&mut buf, &serde_json::json!({"name": "wf"})).expect("write");
        let out = String::from_utf8(buf).expect("utf8");
        assert_eq!(out, "{\n  \"name\": \"wf\"\n}\n");
    }

    #[test]
    fn diff_lines_are_colored_by_marker() {
        colored::control::set_override(true);
        assert!(diff_line("- v0.1").to_string().contains("\u{1b}[31m"));
        assert!(diff_line("+ v0.2").to_string().contains("\u{1b}[32m"));
        assert!(diff_line("@@ -1 +1 @@").to_string().contains("\u{1b}[36m"));
        assert_eq!(diff_line(" context").to_string(), " context".normal().to_string());
        colored::control::unset_override();
    }
}
