//! `key=value` filter parsing and projection.
//!
//! Each command declares its filter keys as either single-valued (the last
//! occurrence wins) or multi-valued (occurrences append in order). A subset
//! of the parsed keys can be projected to the JSON object the server
//! accepts as its `search` parameter.

use std::collections::BTreeMap;

use crate::error::CliError;

/// Parsed `key=value` filters, split into single- and multi-valued keys.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    single: BTreeMap<String, String>,
    multi: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    /// Parse raw `key=value` strings against the command's key declaration.
    ///
    /// # Errors
    ///
    /// Returns a usage error for malformed input and a validation error
    /// listing the allowed keys for an unknown key.
    pub fn parse(
        inputs: &[String],
        single_keys: &[&str],
        multi_keys: &[&str],
    ) -> Result<Self, CliError> {
        let mut set = Self::default();
        for input in inputs {
            let Some((key, value)) = input.split_once('=') else {
                return Err(CliError::Usage(
                    "Wrong input format. Please use --filter filter_name=filter_value".into(),
                ));
            };
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(CliError::Usage(
                    "Wrong input format. Please use --filter filter_name=filter_value".into(),
                ));
            }
            if single_keys.contains(&key) {
                set.single.insert(key.to_owned(), value.to_owned());
            } else if multi_keys.contains(&key) {
                set.multi.entry(key.to_owned()).or_default().push(value.to_owned());
            } else {
                let mut allowed: Vec<&str> =
                    single_keys.iter().chain(multi_keys).copied().collect();
                allowed.sort_unstable();
                return Err(CliError::Validation(format!(
                    "Filter '{key}' is not valid. Available filters are: {}",
                    allowed.join(", ")
                )));
            }
        }
        Ok(set)
    }

    /// Value of a single-valued key.
    #[must_use]
    pub fn single(&self, key: &str) -> Option<&str> {
        self.single.get(key).map(String::as_str)
    }

    /// Values of a multi-valued key, in order of appearance.
    #[must_use]
    pub fn multi(&self, key: &str) -> &[String] {
        self.multi.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether no filter was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.is_empty()
    }

    /// Check every value of `key` against a closed vocabulary.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing the allowed values.
    pub fn validate_choices(&self, key: &str, allowed: &[&str]) -> Result<(), CliError> {
        let singles = self.single.get(key).map(std::slice::from_ref).unwrap_or(&[]);
        let values = singles.iter().chain(self.multi(key));
        for value in values {
            if !allowed.contains(&value.as_str()) {
                return Err(CliError::Validation(format!(
                    "Input '{value}' is not valid. Available values are: {}",
                    allowed.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Project the chosen keys to the server's `search` JSON object.
    ///
    /// Every included key maps to a list of values; single-valued keys
    /// contribute a one-element list. Returns `None` when no included key
    /// carries a value.
    #[must_use]
    pub fn to_search_json(&self, keys: &[&str]) -> Option<String> {
        let mut object = BTreeMap::new();
        for &key in keys {
            if let Some(value) = self.single.get(key) {
                object.insert(key, vec![value.clone()]);
            } else if let Some(values) = self.multi.get(key) {
                if !values.is_empty() {
                    object.insert(key, values.clone());
                }
            }
        }
        if object.is_empty() {
            None
        } else {
            serde_json::to_string(&object).ok()
        }
    }
}
