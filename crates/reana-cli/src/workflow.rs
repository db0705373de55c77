//! Workflow reference and status helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CliError;

/// Timestamp format used by the server.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Split a workflow reference into `(name, run_number)`.
///
/// Only the first `.` separates; anything after it is the run number and
/// may itself contain dots. A reference without a `.` has an empty run
/// number.
#[must_use]
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('.') {
        Some((name, run_number)) => (name, run_number),
        None => (reference, ""),
    }
}

/// Join a name and run number back into a reference.
#[must_use]
pub fn join_reference(name: &str, run_number: &str) -> String {
    if run_number.is_empty() {
        name.to_owned()
    } else {
        format!("{name}.{run_number}")
    }
}

/// Elapsed run time in whole seconds.
///
/// Returns `None` when the run never started. A missing finish timestamp
/// falls back to the stop timestamp; when both are missing the run is
/// still going and `now` is used.
#[must_use]
pub fn duration_seconds(
    started: Option<&str>,
    finished: Option<&str>,
    stopped: Option<&str>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let start = parse_timestamp(started?)?;
    let end = finished
        .or(stopped)
        .and_then(parse_timestamp)
        .unwrap_or_else(|| now.naive_utc());
    Some((end - start).num_seconds())
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

/// Phrase describing a status change, e.g. `myanalysis.1 has been stopped`.
///
/// # Errors
///
/// Returns a validation error for a status outside the known vocabulary.
pub fn status_change_message(workflow: &str, status: &str) -> Result<String, CliError> {
    let verb = match status {
        "finished" | "failed" => "has",
        "created" | "stopped" | "queued" | "deleted" => "has been",
        "running" | "pending" => "is",
        other => {
            return Err(CliError::Validation(format!("unrecognised status {other}")));
        }
    };
    Ok(format!("{workflow} {verb} {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("myanalysis", "myanalysis", ""; "bare name")]
    #[test_case("myanalysis.12", "myanalysis", "12"; "simple run number")]
    #[test_case("myanalysis.12.3", "myanalysis", "12.3"; "dotted run number")]
    #[test_case("my.analysis.12", "my", "analysis.12"; "first dot splits")]
    fn split_takes_first_dot(reference: &str, name: &str, run_number: &str) {
        assert_eq!(split_reference(reference), (name, run_number));
    }

    #[test]
    fn split_join_round_trips() {
        for reference in ["myanalysis", "myanalysis.12", "myanalysis.12.3"] {
            let (name, run_number) = split_reference(reference);
            let joined = join_reference(name, run_number);
            assert_eq!(split_reference(&joined), (name, run_number));
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 8, 10, 19, 0, 0).single().expect("timestamp")
    }

    #[test]
    fn duration_between_start_and_finish() {
        let seconds = duration_seconds(
            Some("2022-08-10T17:14:12"),
            Some("2022-08-10T18:04:52"),
            None,
            now(),
        );
        assert_eq!(seconds, Some(3040));
    }

    #[test]
    fn duration_without_start_is_null() {
        assert_eq!(duration_seconds(None, Some("2022-08-10T18:04:52"), None, now()), None);
    }

    #[test]
    fn duration_falls_back_to_stop_time() {
        let seconds = duration_seconds(
            Some("2022-08-10T17:00:00"),
            None,
            Some("2022-08-10T17:30:00"),
            now(),
        );
        assert_eq!(seconds, Some(1800));
    }

    #[test]
    fn duration_of_running_workflow_uses_wall_clock() {
        let seconds = duration_seconds(Some("2022-08-10T18:00:00"), None, None, now());
        assert_eq!(seconds, Some(3600));
    }

    #[test]
    fn status_change_phrasing() {
        assert_eq!(status_change_message("wf", "running").expect("phrase"), "wf is running");
        assert_eq!(
            status_change_message("wf", "deleted").expect("phrase"),
            "wf has been deleted"
        );
        assert_eq!(status_change_message("wf", "finished").expect("phrase"), "wf has finished");
        assert_eq!(status_change_message("wf", "failed").expect("phrase"), "wf has failed");
    }

    #[test]
    fn status_change_rejects_unknown_status() {
        let err = status_change_message("wf", "bogus").expect_err("must fail");
        assert!(err.to_string().contains("unrecognised status bogus"));
    }
}
