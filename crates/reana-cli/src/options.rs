//! Operational-option catalog and input-parameter validation.
//!
//! Operational options are backend tunables consumed by the workflow
//! engine at start time. The catalog maps each option to the engines that
//! understand it and to the canonical key each engine expects on the wire
//! (some options change key, e.g. `TARGET` for CWL).

use std::collections::BTreeMap;

use crate::error::CliError;

/// Option name → (engine, canonical server key) pairs.
const OPERATIONAL_OPTIONS: &[(&str, &[(&str, &str)])] = &[
    ("CACHE", &[("serial", "CACHE")]),
    ("FROM", &[("yadage", "from")]),
    ("TARGET", &[("cwl", "--target"), ("yadage", "target")]),
    ("toplevel", &[("yadage", "toplevel")]),
];

/// Validate operational options against the catalog for the given engine
/// and rewrite them to the engine's canonical keys.
///
/// # Errors
///
/// Unknown options and options the engine does not understand are hard
/// errors.
pub fn validate_operational_options(
    engine: &str,
    options: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, serde_json::Value>, CliError> {
    let mut translated = BTreeMap::new();
    for (name, value) in options {
        let Some((_, engines)) =
            OPERATIONAL_OPTIONS.iter().find(|(known, _)| *known == name.as_str())
        else {
            return Err(CliError::Validation(format!(
                "Operational option '{name}' not supported"
            )));
        };
        let Some((_, canonical)) = engines.iter().find(|(known, _)| *known == engine) else {
            return Err(CliError::Validation(format!(
                "Operational option '{name}' not supported for {engine} workflows"
            )));
        };
        translated.insert(
            (*canonical).to_owned(),
            serde_json::Value::String(value.clone()),
        );
    }
    Ok(translated)
}

/// Check supplied input parameters against the parameter set declared in
/// the workflow specification.
///
/// Known parameters pass through unchanged; unknown ones are dropped and
/// returned separately so the caller can warn about them.
#[must_use]
pub fn validate_input_parameters(
    given: &BTreeMap<String, String>,
    declared: &BTreeMap<String, serde_json::Value>,
) -> (BTreeMap<String, serde_json::Value>, Vec<String>) {
    let mut accepted = BTreeMap::new();
    let mut rejected = Vec::new();
    for (name, value) in given {
        if declared.contains_key(name) {
            accepted.insert(name.clone(), serde_json::Value::String(value.clone()));
        } else {
            rejected.push(name.clone());
        }
    }
    (accepted, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect()
    }

    #[test]
    fn known_option_passes_for_matching_engine() {
        let translated = validate_operational_options("serial", &options(&[("CACHE", "off")]))
            .expect("validate");
        assert_eq!(translated.get("CACHE"), Some(&serde_json::json!("off")));
    }

    #[test]
    fn target_is_rewritten_for_cwl() {
        let translated =
            validate_operational_options("cwl", &options(&[("TARGET", "gendata")]))
                .expect("validate");
        assert_eq!(translated.get("--target"), Some(&serde_json::json!("gendata")));
        assert!(!translated.contains_key("TARGET"));
    }

    #[test]
    fn target_keeps_lowercase_key_for_yadage() {
        let translated =
            validate_operational_options("yadage", &options(&[("TARGET", "fitdata")]))
                .expect("validate");
        assert_eq!(translated.get("target"), Some(&serde_json::json!("fitdata")));
    }

    #[test]
    fn unknown_option_is_a_hard_error() {
        let err = validate_operational_options("serial", &options(&[("TURBO", "on")]))
            .expect_err("must fail");
        assert!(err.to_string().contains("'TURBO' not supported"));
    }

    #[test]
    fn option_for_wrong_engine_is_a_hard_error() {
        let err = validate_operational_options("serial", &options(&[("toplevel", "x")]))
            .expect_err("must fail");
        assert!(err.to_string().contains("not supported for serial workflows"));
    }

    #[test]
    fn unknown_input_parameters_are_dropped_and_reported() {
        let declared: BTreeMap<String, serde_json::Value> =
            [("events".to_owned(), serde_json::json!(1000))].into_iter().collect();
        let given = options(&[("events", "500"), ("luminosity", "3")]);
        let (accepted, rejected) = validate_input_parameters(&given, &declared);
        assert_eq!(accepted.get("events"), Some(&serde_json::json!("500")));
        assert!(!accepted.contains_key("luminosity"));
        assert_eq!(rejected, ["luminosity"]);
    }
}
