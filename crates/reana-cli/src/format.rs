//! `--format` parsing and table shaping.
//!
//! A format specification is a comma-separated list of `column[=value]`
//! tokens: columns select and reorder the output, values (where the
//! command enables them) keep only rows whose cell equals the literal.
//! Sorting is driven by the caller's sort column and direction, with
//! domain-aware orderings for dotted run numbers and human-readable sizes.

use std::collections::HashMap;
use std::io::Write;

use crate::display::{self, Severity};
use crate::error::CliError;
use crate::table::{Cell, Table};

/// One parsed `--format` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatToken {
    /// Column to select.
    pub column: String,
    /// Row filter literal, when given.
    pub value: Option<String>,
}

/// Parse a `--format` specification.
///
/// # Errors
///
/// Returns a usage error when a `column=value` token is given to a command
/// that only supports column selection.
pub fn parse_format(
    specification: Option<&str>,
    filtering_enabled: bool,
) -> Result<Vec<FormatToken>, CliError> {
    let Some(specification) = specification else {
        return Ok(Vec::new());
    };
    let mut tokens = Vec::new();
    for raw in specification.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let token = match raw.split_once('=') {
            Some((column, value)) => {
                if !filtering_enabled {
                    return Err(CliError::Usage(format!(
                        "Format option '{raw}' is not valid: this command supports column selection only"
                    )));
                }
                FormatToken { column: column.to_owned(), value: Some(value.to_owned()) }
            }
            None => FormatToken { column: raw.to_owned(), value: None },
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// Apply a parsed format specification to a table: select the columns in
/// token order, then drop the rows whose cells miss the given literals.
///
/// # Errors
///
/// Returns a validation error listing the available columns when a token
/// names a column outside the table's header.
pub fn apply_format(table: &Table, tokens: &[FormatToken]) -> Result<Table, CliError> {
    if tokens.is_empty() {
        return Ok(table.clone());
    }
    let columns: Vec<String> = tokens.iter().map(|t| t.column.clone()).collect();
    let mut shaped = table.select(&columns)?;
    for token in tokens {
        if let Some(value) = &token.value {
            shaped.filter_rows(&token.column, |cell| cell.matches(value))?;
        }
    }
    Ok(shaped)
}

/// Sort key with nulls first, numbers before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Null,
    Number(i64),
    Text(String),
}

/// Map a dotted run number to its sortable integer form.
///
/// `major[.minor]` becomes `major * 1000 + minor`, so runs sort by major
/// first and minor second as long as minors stay below 1000.
#[must_use]
pub fn run_number_key(value: &str) -> i64 {
    let (major, minor) = match value.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (value, ""),
    };
    let major: i64 = major.trim().parse().unwrap_or(0);
    let minor: i64 = minor.trim().parse().unwrap_or(0);
    major * 1000 + minor
}

/// Sort the table by `column` with the given direction.
///
/// Two domain orderings apply: `run_number` sorts by its dotted integer
/// form, and `size` sorts through `human_sizes` (rendered string back to
/// raw bytes) when the caller renders sizes human-readably. An unknown
/// sort column is non-fatal: a warning is written and the table is left
/// unsorted.
pub fn sort_table<W: Write>(
    writer: &mut W,
    table: &mut Table,
    column: &str,
    descending: bool,
    human_sizes: Option<&HashMap<String, i64>>,
) -> Result<(), CliError> {
    if !table.headers().iter().any(|h| h == column) {
        display::message(
            writer,
            &format!("Sort operation is not possible on column '{column}'"),
            Severity::Warning,
            false,
        )?;
        return Ok(());
    }

    if column == "run_number" {
        table.sort_by_key(column, descending, |cell| match cell {
            Cell::Null => SortKey::Null,
            other => SortKey::Number(run_number_key(&other.render())),
        })?;
    } else if let Some(sizes) = human_sizes.filter(|_| column == "size") {
        let sizes = sizes.clone();
        table.sort_by_key(column, descending, move |cell| match cell {
            Cell::Null => SortKey::Null,
            other => SortKey::Number(sizes.get(&other.render()).copied().unwrap_or(-1)),
        })?;
    } else {
        table.sort_by_key(column, descending, |cell| match cell {
            Cell::Null => SortKey::Null,
            Cell::Int(i) => SortKey::Number(*i),
            Cell::Bool(b) => SortKey::Number(i64::from(*b)),
            other => SortKey::Text(other.render()),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn parse_selects_columns_in_order() {
        let tokens = parse_format(Some("status,name"), true).expect("parse");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].column, "status");
        assert_eq!(tokens[1].column, "name");
        assert_eq!(tokens[0].value, None);
    }

    #[test]
    fn parse_reads_filter_values() {
        let tokens = parse_format(Some("status=running"), true).expect("parse");
        assert_eq!(tokens[0].value.as_deref(), Some("running"));
    }

    #[test]
    fn parse_rejects_values_when_filtering_disabled() {
        let err = parse_format(Some("status=running"), false).expect_err("must fail");
        assert!(err.to_string().contains("column selection only"));
    }

    #[test]
    fn parse_accepts_bare_columns_when_filtering_disabled() {
        let tokens = parse_format(Some("status,name"), false).expect("parse");
        assert_eq!(tokens.len(), 2);
    }

    fn sample() -> Table {
        let mut table = Table::new(&["name", "run_number", "status"]);
        for (name, run, status) in [
            ("one", "1", "running"),
            ("two", "2.2", "finished"),
            ("three", "10", "running"),
        ] {
            table
                .append_row(vec![name.into(), run.into(), status.into()])
                .expect("row");
        }
        table
    }

    #[test]
    fn format_output_columns_follow_token_order() {
        let table = sample();
        let tokens = parse_format(Some("status,name"), true).expect("parse");
        let shaped = apply_format(&table, &tokens).expect("apply");
        assert_eq!(shaped.headers(), ["status", "name"]);
    }

    #[test]
    fn format_value_keeps_only_matching_rows() {
        let table = sample();
        let tokens = parse_format(Some("name,status=running"), true).expect("parse");
        let shaped = apply_format(&table, &tokens).expect("apply");
        assert_eq!(shaped.row_count(), 2);
        assert_eq!(shaped.to_rows()[0][0], "one");
        assert_eq!(shaped.to_rows()[1][0], "three");
    }

    #[test]
    fn format_unknown_column_is_an_error() {
        let table = sample();
        let tokens = parse_format(Some("bogus"), true).expect("parse");
        let err = apply_format(&table, &tokens).expect_err("must fail");
        assert!(err.to_string().contains("Available columns"));
    }

    #[test_case("1", 1000)]
    #[test_case("1.15", 1015)]
    #[test_case("2.2", 2002)]
    #[test_case("2.10", 2010)]
    #[test_case("9.1", 9001)]
    #[test_case("10", 10000)]
    #[test_case("", 0)]
    fn run_number_keys(value: &str, expected: i64) {
        assert_eq!(run_number_key(value), expected);
    }

    #[test]
    fn run_number_sort_matches_dotted_integer_order() {
        let mut table = Table::new(&["run_number"]);
        for value in ["1", "2.2", "10", "9.1", "1.15", "2.10"] {
            table.append_row(vec![value.into()]).expect("row");
        }
        let mut warnings = Vec::new();
        sort_table(&mut warnings, &mut table, "run_number", false, None).expect("sort");
        let sorted: Vec<String> = table.to_rows().into_iter().map(|r| r[0].clone()).collect();
        assert_eq!(sorted, ["1", "1.15", "2.2", "2.10", "9.1", "10"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn human_size_sort_uses_raw_byte_map() {
        let mut table = Table::new(&["name", "size"]);
        for (name, size) in [("a", "1 KiB"), ("b", "2 MiB"), ("c", "512 B")] {
            table.append_row(vec![name.into(), size.into()]).expect("row");
        }
        let sizes: HashMap<String, i64> = [
            ("1 KiB".to_owned(), 1024),
            ("2 MiB".to_owned(), 2 * 1024 * 1024),
            ("512 B".to_owned(), 512),
        ]
        .into_iter()
        .collect();
        let mut warnings = Vec::new();
        sort_table(&mut warnings, &mut table, "size", false, Some(&sizes)).expect("sort");
        let names: Vec<String> = table.to_rows().into_iter().map(|r| r[0].clone()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn unknown_sort_column_warns_and_leaves_table_unsorted() {
        let mut table = sample();
        let mut warnings = Vec::new();
        sort_table(&mut warnings, &mut table, "bogus", false, None).expect("no-op");
        let text = String::from_utf8(warnings).expect("utf8");
        assert!(text.contains("Sort operation is not possible on column 'bogus'"));
        assert_eq!(table.to_rows()[0][0], "one");
    }
}
