//! Workflow log commands, including the live follow loop.

use std::io::Write;
use std::time::Duration;

use reana_api::ops::GetLogsResponse;
use reana_api::types::{LogBundle, LogsPayload, RunStatus};

use crate::cli::LogsArgs;
use crate::client::ReanaClient;
use crate::commands::execution;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::filter::FilterSet;
use crate::workflow::status_change_message;

/// Poll cadence used when `--interval` is below one second.
const DEFAULT_INTERVAL: i64 = 10;

/// Canonical compute-backend names, keyed by their lowercase form.
const COMPUTE_BACKENDS: &[(&str, &str)] = &[
    ("kubernetes", "Kubernetes"),
    ("htcondor", "HTCondor"),
    ("slurm", "Slurm"),
];

/// Handler for the logs command.
pub struct LogsCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> LogsCommand<'a> {
    /// Creates a new logs command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the logs command.
    ///
    /// # Errors
    ///
    /// Returns error on invalid filters or failed requests.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &LogsArgs,
    ) -> Result<(), CliError> {
        let filters = FilterSet::parse(
            &args.filter,
            &["compute_backend", "docker_img", "status"],
            &["step"],
        )?;
        let statuses: Vec<&str> = RunStatus::ALL.iter().map(RunStatus::as_str).collect();
        filters.validate_choices("status", &statuses)?;

        let backend = match filters.single("compute_backend") {
            Some(value) => Some(canonical_backend(value)?),
            None => None,
        };

        if args.follow {
            return self.follow(out, workflow, args, &filters).await;
        }

        let payload = fetch_logs(self.client, workflow).await?;
        let bundle = filter_bundle(payload.logs, &filters, backend);

        if args.json {
            display::json(out, &bundle)?;
        } else {
            render_bundle(out, &bundle, filters.is_empty())?;
        }
        Ok(())
    }

    /// Poll logs at a bounded cadence until the workflow (or the selected
    /// step) reaches a terminal status, emitting only new log bytes.
    async fn follow<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &LogsArgs,
        filters: &FilterSet,
    ) -> Result<(), CliError> {
        let steps = filters.multi("step");
        if steps.len() > 1 {
            display::message(
                out,
                &format!(
                    "Only one step can be followed, ignoring: {}",
                    steps[1..].join(", ")
                ),
                Severity::Warning,
                false,
            )?;
        }
        let step = steps.first().cloned();

        let interval = if args.interval < 1 { DEFAULT_INTERVAL } else { args.interval };
        let interval = Duration::from_secs(interval.unsigned_abs());
        let mut previous = String::new();

        loop {
            let payload = fetch_logs(self.client, workflow).await?;
            if !payload.live_logs_enabled {
                return Err(CliError::Validation(
                    "Live logs are not enabled on this cluster, please rerun without --follow"
                        .into(),
                ));
            }

            let (current, status) = match &step {
                Some(step) => {
                    let job = payload
                        .logs
                        .job_logs
                        .values()
                        .find(|job| job.job_name == *step);
                    match job {
                        Some(job) => (job.logs.clone(), job.status.parse::<RunStatus>().ok()),
                        None => (String::new(), None),
                    }
                }
                None => {
                    let status =
                        execution::fetch_status(self.client, workflow).await?.status;
                    (
                        payload.logs.workflow_logs.clone().unwrap_or_default(),
                        Some(status),
                    )
                }
            };

            let suffix = new_suffix(&previous, &current);
            if !suffix.is_empty() {
                out.write_all(suffix.as_bytes())?;
                out.flush()?;
            }
            previous = current;

            if let Some(status) = status.filter(RunStatus::is_terminal) {
                let subject = step.as_deref().unwrap_or(workflow);
                let message = status_change_message(subject, status.as_str())?;
                display::message(out, &message, Severity::Info, false)?;
                return Ok(());
            }

            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    display::message(out, "Interrupted, stopping the follow.", Severity::Warning, false)?;
                    return Err(CliError::Silent);
                }
            }
        }
    }
}

async fn fetch_logs(client: &ReanaClient, workflow: &str) -> Result<LogsPayload, CliError> {
    match client.get_logs(workflow).await? {
        GetLogsResponse::Ok(payload) => Ok(payload),
        GetLogsResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
        GetLogsResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
        GetLogsResponse::NotFound(msg) => Err(CliError::server(404, msg)),
        GetLogsResponse::ServerError(msg) => Err(CliError::server(500, msg)),
    }
}

/// Resolve a compute-backend filter value to its canonical name.
fn canonical_backend(value: &str) -> Result<&'static str, CliError> {
    let lowered = value.to_lowercase();
    COMPUTE_BACKENDS
        .iter()
        .find(|(key, canonical)| *key == lowered || canonical.to_lowercase() == lowered)
        .map(|(_, canonical)| *canonical)
        .ok_or_else(|| {
            let available: Vec<&str> =
                COMPUTE_BACKENDS.iter().map(|(key, _)| *key).collect();
            CliError::Validation(format!(
                "Input '{value}' is not valid. Available values are: {}",
                available.join(", ")
            ))
        })
}

/// Apply the client-side job filters to the log bundle.
fn filter_bundle(
    mut bundle: LogBundle,
    filters: &FilterSet,
    backend: Option<&'static str>,
) -> LogBundle {
    let steps = filters.multi("step");
    let docker_img = filters.single("docker_img");
    let status = filters.single("status");

    bundle.job_logs.retain(|_, job| {
        if !steps.is_empty() && !steps.iter().any(|step| *step == job.job_name) {
            return false;
        }
        if let Some(backend) = backend {
            if job.compute_backend != backend {
                return false;
            }
        }
        if let Some(docker_img) = docker_img {
            if job.docker_img != docker_img {
                return false;
            }
        }
        if let Some(status) = status {
            if job.status != status {
                return false;
            }
        }
        true
    });
    bundle
}

/// Render the human view of a log bundle.
fn render_bundle<W: Write>(
    out: &mut W,
    bundle: &LogBundle,
    include_engine_logs: bool,
) -> Result<(), CliError> {
    if include_engine_logs {
        if let Some(logs) = bundle.workflow_logs.as_deref().filter(|logs| !logs.is_empty()) {
            display::message(out, "Workflow engine logs", Severity::Info, false)?;
            writeln!(out, "{logs}")?;
        }
        if let Some(logs) = bundle.engine_specific.as_deref().filter(|logs| !logs.is_empty()) {
            display::message(out, "Engine internal logs", Severity::Info, false)?;
            writeln!(out, "{logs}")?;
        }
    }

    for (job_id, job) in &bundle.job_logs {
        display::message(
            out,
            &format!("Step: {} ({job_id})", job.job_name),
            Severity::Info,
            false,
        )?;
        display::message(out, &format!("Workflow ID: {}", job.workflow_uuid), Severity::Info, true)?;
        display::message(
            out,
            &format!("Compute backend: {}", job.compute_backend),
            Severity::Info,
            true,
        )?;
        display::message(out, &format!("Job ID: {}", job.backend_job_id), Severity::Info, true)?;
        display::message(out, &format!("Docker image: {}", job.docker_img), Severity::Info, true)?;
        display::message(out, &format!("Command: {}", job.cmd), Severity::Info, true)?;
        display::message(out, &format!("Status: {}", job.status), Severity::Info, true)?;
        display::message(
            out,
            &format!("Started: {}", job.started_at.as_deref().unwrap_or("-")),
            Severity::Info,
            true,
        )?;
        display::message(
            out,
            &format!("Finished: {}", job.finished_at.as_deref().unwrap_or("-")),
            Severity::Info,
            true,
        )?;
        if !job.logs.is_empty() {
            writeln!(out, "{}", job.logs)?;
        }
    }
    Ok(())
}

/// New bytes since the previous poll: the suffix when the stream only
/// grew, the whole buffer when the server truncated it.
fn new_suffix<'a>(previous: &str, current: &'a str) -> &'a str {
    current.strip_prefix(previous).unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_api::types::JobLog;
    use std::collections::BTreeMap;

    fn job(name: &str, backend: &str, image: &str, status: &str) -> JobLog {
        JobLog {
            workflow_uuid: "8fc7b5e9-b32a-4b26-a7c2-ff3b1d5ce4e3".to_owned(),
            job_name: name.to_owned(),
            compute_backend: backend.to_owned(),
            backend_job_id: format!("{name}-backend-id"),
            docker_img: image.to_owned(),
            cmd: "run".to_owned(),
            status: status.to_owned(),
            logs: format!("logs of {name}\n"),
            started_at: None,
            finished_at: None,
        }
    }

    fn bundle() -> LogBundle {
        let mut job_logs = BTreeMap::new();
        job_logs.insert("1".to_owned(), job("gendata", "Kubernetes", "img-a", "finished"));
        job_logs.insert("2".to_owned(), job("fitdata", "HTCondor", "img-b", "running"));
        LogBundle { workflow_logs: Some("engine\n".to_owned()), engine_specific: None, job_logs }
    }

    fn filters(inputs: &[&str]) -> FilterSet {
        let owned: Vec<String> = inputs.iter().map(|&s| s.to_owned()).collect();
        FilterSet::parse(&owned, &["compute_backend", "docker_img", "status"], &["step"])
            .expect("parse")
    }

    #[test]
    fn suffix_is_emitted_once() {
        assert_eq!(new_suffix("line one\n", "line one\nline two\n"), "line two\n");
        assert_eq!(new_suffix("", "line one\n"), "line one\n");
        assert_eq!(new_suffix("same\n", "same\n"), "");
    }

    #[test]
    fn truncated_stream_is_reemitted_in_full() {
        assert_eq!(new_suffix("long old buffer\n", "short\n"), "short\n");
    }

    #[test]
    fn step_filter_keeps_named_jobs() {
        let filtered = filter_bundle(bundle(), &filters(&["step=gendata"]), None);
        assert_eq!(filtered.job_logs.len(), 1);
        assert_eq!(filtered.job_logs["1"].job_name, "gendata");
    }

    #[test]
    fn backend_filter_uses_canonical_names() {
        let backend = canonical_backend("kubernetes").expect("canonical");
        let filtered = filter_bundle(bundle(), &filters(&[]), Some(backend));
        assert_eq!(filtered.job_logs.len(), 1);
        assert_eq!(filtered.job_logs["1"].compute_backend, "Kubernetes");
    }

    #[test]
    fn unknown_backend_is_rejected_with_choices() {
        let err = canonical_backend("cloudfoundry").expect_err("must fail");
        assert!(err.to_string().contains("kubernetes, htcondor, slurm"));
    }

    #[test]
    fn status_and_image_filters_compose() {
        let filtered =
            filter_bundle(bundle(), &filters(&["status=running", "docker_img=img-b"]), None);
        assert_eq!(filtered.job_logs.len(), 1);
        assert_eq!(filtered.job_logs["2"].job_name, "fitdata");
    }

    #[test]
    fn rendered_bundle_contains_job_fields() {
        let mut out = Vec::new();
        render_bundle(&mut out, &bundle(), true).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Workflow engine logs"));
        assert!(text.contains("Step: gendata (1)"));
        assert!(text.contains("Compute backend: Kubernetes"));
        assert!(text.contains("logs of fitdata"));
    }
}
