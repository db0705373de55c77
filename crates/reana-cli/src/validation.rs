//! Client-side input validators.

use std::fs::File;
use std::path::Path;

use crate::error::CliError;

/// Require a non-empty value after whitespace trimming.
///
/// # Errors
///
/// Returns a validation error naming the key.
pub fn not_empty(key: &str, value: &str) -> Result<(), CliError> {
    if value.trim().is_empty() {
        return Err(CliError::Validation(format!("{key} must not be empty")));
    }
    Ok(())
}

/// Require one of a closed set of values.
///
/// # Errors
///
/// Returns a validation error listing the allowed values.
pub fn choice(key: &str, value: &str, allowed: &[&str]) -> Result<(), CliError> {
    if !allowed.contains(&value) {
        return Err(CliError::Validation(format!(
            "Invalid value '{value}' for {key}. Available values are: {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Require at least one of a named flag set to be present.
///
/// # Errors
///
/// Returns a usage error naming the flags.
pub fn at_least_one(flags: &[(&str, bool)]) -> Result<(), CliError> {
    if flags.iter().any(|(_, present)| *present) {
        return Ok(());
    }
    let names: Vec<&str> = flags.iter().map(|(name, _)| *name).collect();
    Err(CliError::Usage(format!(
        "At least one of the options: {} is required",
        names.join(", ")
    )))
}

/// Require an existing, readable, regular file.
///
/// # Errors
///
/// Returns a validation error describing what is wrong with the path.
pub fn readable_file(path: &Path) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::Validation(format!(
            "File {} does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(CliError::Validation(format!(
            "{} is a directory, expected a file",
            path.display()
        )));
    }
    File::open(path).map_err(|e| {
        CliError::Validation(format!("File {} is not readable: {e}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn not_empty_rejects_whitespace() {
        assert!(not_empty("workflow name", "  ").is_err());
        assert!(not_empty("workflow name", "myanalysis").is_ok());
    }

    #[test]
    fn choice_lists_allowed_values() {
        let err = choice("report", "bogus", &["limit", "usage"]).expect_err("must fail");
        assert!(err.to_string().contains("limit, usage"));
        assert!(choice("report", "usage", &["limit", "usage"]).is_ok());
    }

    #[test]
    fn at_least_one_requires_a_flag() {
        let err = at_least_one(&[("--env", false), ("--file", false)]).expect_err("must fail");
        assert!(err.to_string().contains("--env, --file"));
        assert!(at_least_one(&[("--env", true), ("--file", false)]).is_ok());
    }

    #[test]
    fn readable_file_accepts_regular_files() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "content").expect("write");
        assert!(readable_file(file.path()).is_ok());
    }

    #[test]
    fn readable_file_rejects_missing_path() {
        let err = readable_file(Path::new("/definitely/not/here.yaml")).expect_err("must fail");
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn readable_file_rejects_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = readable_file(dir.path()).expect_err("must fail");
        assert!(err.to_string().contains("is a directory"));
    }
}
