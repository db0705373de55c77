//! Shared payload types for the REANA REST API.
//!
//! Every field that the server may omit is an `Option` (or carries
//! `#[serde(default)]`), so payloads with unknown or missing fields decode
//! without error; unknown fields are ignored by serde's default behavior.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Workflow has been created but not started.
    Created,
    /// Workflow is executing.
    Running,
    /// Workflow is queued for execution.
    Queued,
    /// Workflow is waiting for resources.
    Pending,
    /// Workflow completed successfully.
    Finished,
    /// Workflow failed.
    Failed,
    /// Workflow was stopped by the user.
    Stopped,
    /// Workflow was deleted.
    Deleted,
}

impl RunStatus {
    /// All statuses, in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Created,
        Self::Running,
        Self::Queued,
        Self::Pending,
        Self::Finished,
        Self::Failed,
        Self::Stopped,
        Self::Deleted,
    ];

    /// Whether the run can make no further progress.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Failed | Self::Stopped | Self::Deleted
        )
    }

    /// Whether the run may still change state.
    #[must_use]
    pub const fn is_progressing(&self) -> bool {
        !self.is_terminal()
    }

    /// Lowercase name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ApiError::Decoding(format!("unknown workflow status: {s}")))
    }
}

/// Generic `{"message": ...}` body used by most error responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerMessage {
    /// Human-readable message supplied by the server.
    #[serde(default)]
    pub message: String,
}

/// A byte quantity rendered both ways by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanSize {
    /// Rendered form, e.g. `12.3 MiB`.
    #[serde(default)]
    pub human_readable: String,
    /// Exact byte count.
    #[serde(default)]
    pub raw: i64,
}

/// Per-state job counter inside a progress report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCounter {
    /// Number of jobs in this state.
    #[serde(default)]
    pub total: i64,
}

/// Execution progress of a workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowProgress {
    /// Wall-clock start of the run.
    pub run_started_at: Option<String>,
    /// Wall-clock end of the run.
    pub run_finished_at: Option<String>,
    /// Wall-clock stop of the run, when stopped early.
    pub run_stopped_at: Option<String>,
    /// Total number of jobs.
    pub total: Option<JobCounter>,
    /// Jobs finished so far.
    pub finished: Option<JobCounter>,
    /// Jobs currently running.
    pub running: Option<JobCounter>,
    /// Jobs that failed.
    pub failed: Option<JobCounter>,
    /// Command currently executing, if the engine reports one.
    pub current_command: Option<String>,
    /// Step currently executing, if the engine reports one.
    pub current_step_name: Option<String>,
}

/// A workflow as returned by the list and status operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow UUID.
    pub id: String,
    /// Bare workflow name, without the run number.
    pub name: String,
    /// Dotted run number (`12` or `12.3`).
    #[serde(default)]
    pub run_number: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Current status.
    pub status: RunStatus,
    /// Owner of the workflow, when shared listings include it.
    pub user: Option<String>,
    /// Workspace size, when requested.
    pub size: Option<HumanSize>,
    /// Execution progress, when requested.
    pub progress: Option<WorkflowProgress>,
    /// URL of the launcher that submitted the workflow, if any.
    pub launcher_url: Option<String>,
    /// Session URI when an interactive session is attached.
    pub session_uri: Option<String>,
    /// Session status when an interactive session is attached.
    pub session_status: Option<String>,
}

/// Page of workflows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowList {
    /// Workflows on this page.
    #[serde(default)]
    pub items: Vec<Workflow>,
    /// Total number of matching workflows.
    pub total: Option<i64>,
    /// Whether another page follows.
    pub has_next: Option<bool>,
    /// Whether a page precedes this one.
    pub has_prev: Option<bool>,
}

/// Logs of a single job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobLog {
    /// UUID of the owning workflow.
    #[serde(default)]
    pub workflow_uuid: String,
    /// Step name of the job.
    #[serde(default)]
    pub job_name: String,
    /// Compute backend the job ran on.
    #[serde(default)]
    pub compute_backend: String,
    /// Backend-specific job identifier.
    #[serde(default)]
    pub backend_job_id: String,
    /// Container image the job ran in.
    #[serde(default)]
    pub docker_img: String,
    /// Command executed by the job.
    #[serde(default)]
    pub cmd: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
    /// Captured log text.
    #[serde(default)]
    pub logs: String,
    /// Start timestamp, if the job started.
    pub started_at: Option<String>,
    /// Finish timestamp, if the job finished.
    pub finished_at: Option<String>,
}

/// Structured log payload of a workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogBundle {
    /// Workflow-engine log, if any.
    pub workflow_logs: Option<String>,
    /// Engine-internal log, if any.
    pub engine_specific: Option<String>,
    /// Per-job logs, keyed by job id.
    #[serde(default)]
    pub job_logs: BTreeMap<String, JobLog>,
}

/// Response body of the logs operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsPayload {
    /// UUID of the workflow.
    #[serde(default)]
    pub workflow_id: String,
    /// The structured logs.
    #[serde(default)]
    pub logs: LogBundle,
    /// Whether the cluster serves live logs for running workflows.
    #[serde(default = "default_true")]
    pub live_logs_enabled: bool,
}

const fn default_true() -> bool {
    true
}

/// Response body of the status operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Workflow UUID.
    pub id: String,
    /// Bare workflow name.
    pub name: String,
    /// Dotted run number.
    #[serde(default)]
    pub run_number: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Current status.
    pub status: RunStatus,
    /// Owner of the workflow.
    pub user: Option<String>,
    /// Execution progress.
    pub progress: Option<WorkflowProgress>,
}

/// Response body of the parameters operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParametersPayload {
    /// Workflow UUID.
    #[serde(default)]
    pub id: String,
    /// Bare workflow name.
    #[serde(default)]
    pub name: String,
    /// Workflow engine type (`serial`, `cwl`, `yadage`, `snakemake`).
    #[serde(rename = "type", default)]
    pub engine: String,
    /// Declared input parameters with their default values.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// `inputs` or `outputs` section of a workflow specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationIo {
    /// Individual files.
    #[serde(default)]
    pub files: Vec<String>,
    /// Whole directories.
    #[serde(default)]
    pub directories: Vec<String>,
}

/// `workflow` section of a workflow specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationWorkflow {
    /// Workflow engine type.
    #[serde(rename = "type", default)]
    pub engine: String,
}

/// The stored workflow specification, as the server parsed it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSpecification {
    /// Declared inputs.
    pub inputs: Option<SpecificationIo>,
    /// Declared outputs.
    pub outputs: Option<SpecificationIo>,
    /// Engine section.
    #[serde(default)]
    pub workflow: SpecificationWorkflow,
}

/// Response body of the specification operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationPayload {
    /// The stored specification.
    #[serde(default)]
    pub specification: WorkflowSpecification,
}

/// Response body of the diff operation.
///
/// Section values are heterogeneous arrays of diff lines; they are kept as
/// raw JSON here and shaped by the caller (the `workflow` section is
/// renamed to `specification` before display).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffPayload {
    /// Per-section specification differences.
    pub reana_specification: Option<serde_json::Value>,
    /// Workspace listing differences.
    pub workspace_listing: Option<serde_json::Value>,
}

/// A workspace file entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path of the file relative to the workspace root.
    #[serde(default)]
    pub name: String,
    /// Last modification timestamp.
    #[serde(rename = "last-modified")]
    pub last_modified: Option<String>,
    /// File size.
    pub size: Option<HumanSize>,
}

/// Page of workspace files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    /// Files on this page.
    #[serde(default)]
    pub items: Vec<FileInfo>,
    /// Total number of matching files.
    pub total: Option<i64>,
}

/// A deleted workspace file with the bytes it freed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletedFile {
    /// Freed bytes.
    #[serde(default)]
    pub size: i64,
}

/// A workspace file that could not be deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailedFile {
    /// Reason for the failure.
    #[serde(default)]
    pub error: String,
}

/// Response body of the delete-file operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFilePayload {
    /// Successfully deleted files, keyed by workspace path.
    #[serde(default)]
    pub deleted: BTreeMap<String, DeletedFile>,
    /// Files that failed to delete, keyed by workspace path.
    #[serde(default)]
    pub failed: BTreeMap<String, FailedFile>,
}

/// A workspace file retention rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionRule {
    /// Rule identifier.
    #[serde(default)]
    pub id: String,
    /// Glob describing the files the rule applies to.
    #[serde(default)]
    pub workspace_files: String,
    /// Days after which the files become deletable.
    #[serde(default)]
    pub retention_days: i64,
    /// Timestamp at which the rule will be applied, if scheduled.
    pub apply_on: Option<String>,
    /// Rule status (`created`, `active`, `applied`).
    #[serde(default)]
    pub status: String,
}

/// Response body of the retention-rules operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionRulesPayload {
    /// Workflow UUID.
    #[serde(default)]
    pub workflow_id: String,
    /// Workflow name.
    #[serde(default)]
    pub workflow_name: String,
    /// The rules.
    #[serde(default)]
    pub retention_rules: Vec<RetentionRule>,
}

/// Response body of the open-session operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenSessionPayload {
    /// Path of the session, relative to the server root.
    #[serde(default)]
    pub path: String,
    /// Expiration timestamp, if the cluster expires sessions.
    pub expiration_date: Option<String>,
}

/// One user a workflow is shared with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareEntry {
    /// Email of the user.
    #[serde(default)]
    pub user_email: String,
    /// When the share expires, if ever.
    pub valid_until: Option<String>,
}

/// Response body of the share-status operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareStatusPayload {
    /// Workflow UUID.
    #[serde(default)]
    pub workflow_id: String,
    /// Users the workflow is shared with.
    #[serde(default)]
    pub shared_with: Vec<ShareEntry>,
}

/// Type of a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretType {
    /// Injected as an environment variable.
    Env,
    /// Mounted as a file.
    File,
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => write!(f, "env"),
            Self::File => write!(f, "file"),
        }
    }
}

/// A secret as listed by the server (value never included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    /// Secret name.
    pub name: String,
    /// Secret type.
    #[serde(rename = "type")]
    pub secret_type: SecretType,
}

/// A secret value submitted to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretValue {
    /// Base64-encoded value.
    pub value: String,
    /// Secret type.
    #[serde(rename = "type")]
    pub secret_type: SecretType,
}

/// A quota metric (`usage`, `limit`) of one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaMetric {
    /// Rendered form.
    #[serde(default)]
    pub human_readable: String,
    /// Raw numeric value.
    #[serde(default)]
    pub raw: f64,
}

/// Quota state of one resource.
///
/// `health` is carried separately from the metric map, so the stats never
/// contain it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaResource {
    /// Health classification (`healthy`, `warning`, `critical`).
    pub health: Option<String>,
    /// Metrics by name.
    #[serde(flatten)]
    pub stats: BTreeMap<String, QuotaMetric>,
}

/// Response body of the user-info operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayload {
    /// Email of the authenticated user.
    #[serde(default)]
    pub email: String,
    /// Quota per resource name.
    #[serde(default)]
    pub quota: BTreeMap<String, QuotaResource>,
}

/// Response body of the ping operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingPayload {
    /// Email of the authenticated user, when the token is valid.
    pub email: Option<String>,
    /// Version of the server.
    pub reana_server_version: Option<String>,
}

/// One entry of the cluster information map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoItem {
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Value; may be a scalar or a list.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Response body of the info operation.
pub type InfoPayload = BTreeMap<String, InfoItem>;

/// Response body of the create-workflow operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWorkflowPayload {
    /// Server message.
    #[serde(default)]
    pub message: String,
    /// UUID of the new workflow.
    #[serde(default)]
    pub workflow_id: String,
    /// Full name (`name.run_number`) of the new workflow.
    #[serde(default)]
    pub workflow_name: String,
}

/// Response body of the set-status operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusPayload {
    /// Server message.
    #[serde(default)]
    pub message: String,
    /// UUID of the workflow.
    #[serde(default)]
    pub workflow_id: String,
    /// Name of the workflow.
    #[serde(default)]
    pub workflow_name: String,
    /// Status after the transition.
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_terminal_partition() {
        for status in RunStatus::ALL {
            assert_ne!(status.is_terminal(), status.is_progressing());
        }
        assert!(RunStatus::Finished.is_terminal());
        assert!(RunStatus::Deleted.is_terminal());
        assert!(RunStatus::Pending.is_progressing());
        assert!(RunStatus::Created.is_progressing());
    }

    #[test]
    fn run_status_round_trips_through_str() {
        for status in RunStatus::ALL {
            let parsed: RunStatus = status.as_str().parse().expect("round trip");
            assert_eq!(parsed, status);
        }
        assert!("bogus".parse::<RunStatus>().is_err());
    }

    #[test]
    fn workflow_decodes_with_unknown_fields() {
        let raw = r#"{
            "id": "8fc7b5e9-b32a-4b26-a7c2-ff3b1d5ce4e3",
            "name": "my_workflow",
            "run_number": "12",
            "created": "2022-08-10T17:14:12",
            "status": "running",
            "brand_new_server_field": {"ignored": true}
        }"#;
        let workflow: Workflow = serde_json::from_str(raw).expect("decode");
        assert_eq!(workflow.name, "my_workflow");
        assert_eq!(workflow.status, RunStatus::Running);
        assert!(workflow.size.is_none());
    }

    #[test]
    fn quota_resource_extracts_health_from_stats() {
        let raw = r#"{
            "health": "healthy",
            "usage": {"human_readable": "2 GiB", "raw": 2147483648},
            "limit": {"human_readable": "10 GiB", "raw": 10737418240}
        }"#;
        let resource: QuotaResource = serde_json::from_str(raw).expect("decode");
        assert_eq!(resource.health.as_deref(), Some("healthy"));
        assert!(resource.stats.contains_key("usage"));
        assert!(resource.stats.contains_key("limit"));
        assert!(!resource.stats.contains_key("health"));
    }

    #[test]
    fn logs_payload_defaults_live_logs_on() {
        let payload: LogsPayload = serde_json::from_str(r#"{"workflow_id": "x"}"#).expect("decode");
        assert!(payload.live_logs_enabled);
    }

    #[test]
    fn file_info_reads_dashed_key() {
        let raw = r#"{"name": "results/plot.png", "last-modified": "2022-08-10T17:14:12", "size": {"human_readable": "12 KiB", "raw": 12288}}"#;
        let file: FileInfo = serde_json::from_str(raw).expect("decode");
        assert_eq!(file.last_modified.as_deref(), Some("2022-08-10T17:14:12"));
        assert_eq!(file.size.as_ref().map(|s| s.raw), Some(12288));
    }
}
