//! Endpoint table and per-operation request/response bindings.
//!
//! One block per server operation: the endpoint constant (method + path
//! template), a parameter struct covering path/query/body fields, and a
//! closed response enum with a `decode` constructor that discriminates by
//! HTTP status code. Status codes outside an operation's set decode to
//! [`ApiError::UnexpectedStatus`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{
    CreateWorkflowPayload, DeleteFilePayload, DiffPayload, FileList, InfoPayload, LogsPayload,
    OpenSessionPayload, ParametersPayload, PingPayload, RetentionRulesPayload, Secret,
    SecretValue, ServerMessage, SetStatusPayload, ShareStatusPayload, SpecificationPayload,
    StatusPayload, UserPayload, WorkflowList,
};

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

/// A server endpoint: method plus path template.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    /// HTTP method.
    pub method: Method,
    /// Path template with `{placeholder}` segments.
    pub path: &'static str,
}

impl Endpoint {
    /// Substitute path parameters into the template.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmptyPathParameter`] when a value is empty;
    /// passing one is a programming error in the caller.
    pub fn render(&self, params: &[(&'static str, &str)]) -> Result<String, ApiError> {
        let mut path = self.path.to_owned();
        for (key, value) in params {
            if value.is_empty() {
                return Err(ApiError::EmptyPathParameter(key));
            }
            path = path.replace(&format!("{{{key}}}"), value);
        }
        Ok(path)
    }
}

/// GET `/api/ping`.
pub const PING: Endpoint = Endpoint { method: Method::Get, path: "/api/ping" };
/// GET `/api/info`.
pub const INFO: Endpoint = Endpoint { method: Method::Get, path: "/api/info" };
/// GET `/api/workflows`.
pub const LIST_WORKFLOWS: Endpoint = Endpoint { method: Method::Get, path: "/api/workflows" };
/// POST `/api/workflows`.
pub const CREATE_WORKFLOW: Endpoint = Endpoint { method: Method::Post, path: "/api/workflows" };
/// GET `/api/workflows/{workflow_id_or_name}/status`.
pub const GET_STATUS: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/status" };
/// PUT `/api/workflows/{workflow_id_or_name}/status`.
pub const SET_STATUS: Endpoint =
    Endpoint { method: Method::Put, path: "/api/workflows/{workflow_id_or_name}/status" };
/// GET `/api/workflows/{workflow_id_or_name}/logs`.
pub const GET_LOGS: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/logs" };
/// GET `/api/workflows/{workflow_id_or_name}/parameters`.
pub const GET_PARAMETERS: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/parameters" };
/// GET `/api/workflows/{workflow_id_or_name}/specification`.
pub const GET_SPECIFICATION: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/specification" };
/// GET `/api/workflows/{workflow_id_or_name_a}/diff/{workflow_id_or_name_b}`.
pub const DIFF_WORKFLOWS: Endpoint = Endpoint {
    method: Method::Get,
    path: "/api/workflows/{workflow_id_or_name_a}/diff/{workflow_id_or_name_b}",
};
/// GET `/api/workflows/{workflow_id_or_name}/workspace`.
pub const LIST_FILES: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/workspace" };
/// POST `/api/workflows/{workflow_id_or_name}/workspace`.
pub const UPLOAD_FILE: Endpoint =
    Endpoint { method: Method::Post, path: "/api/workflows/{workflow_id_or_name}/workspace" };
/// GET `/api/workflows/{workflow_id_or_name}/workspace/{file_name}`.
pub const DOWNLOAD_FILE: Endpoint = Endpoint {
    method: Method::Get,
    path: "/api/workflows/{workflow_id_or_name}/workspace/{file_name}",
};
/// DELETE `/api/workflows/{workflow_id_or_name}/workspace/{file_name}`.
pub const DELETE_FILE: Endpoint = Endpoint {
    method: Method::Delete,
    path: "/api/workflows/{workflow_id_or_name}/workspace/{file_name}",
};
/// PUT `/api/workflows/{workflow_id_or_name}/workspace/move`.
pub const MOVE_FILES: Endpoint =
    Endpoint { method: Method::Put, path: "/api/workflows/{workflow_id_or_name}/workspace/move" };
/// POST `/api/workflows/{workflow_id_or_name}/prune`.
pub const PRUNE_WORKSPACE: Endpoint =
    Endpoint { method: Method::Post, path: "/api/workflows/{workflow_id_or_name}/prune" };
/// GET `/api/workflows/{workflow_id_or_name}/retention_rules`.
pub const GET_RETENTION_RULES: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/retention_rules" };
/// POST `/api/workflows/{workflow_id_or_name}/open/{interactive_session_type}`.
pub const OPEN_SESSION: Endpoint = Endpoint {
    method: Method::Post,
    path: "/api/workflows/{workflow_id_or_name}/open/{interactive_session_type}",
};
/// DELETE `/api/workflows/{workflow_id_or_name}/close`.
pub const CLOSE_SESSION: Endpoint =
    Endpoint { method: Method::Delete, path: "/api/workflows/{workflow_id_or_name}/close" };
/// POST `/api/workflows/{workflow_id_or_name}/share`.
pub const SHARE_WORKFLOW: Endpoint =
    Endpoint { method: Method::Post, path: "/api/workflows/{workflow_id_or_name}/share" };
/// POST `/api/workflows/{workflow_id_or_name}/unshare`.
pub const UNSHARE_WORKFLOW: Endpoint =
    Endpoint { method: Method::Post, path: "/api/workflows/{workflow_id_or_name}/unshare" };
/// GET `/api/workflows/{workflow_id_or_name}/share-status`.
pub const SHARE_STATUS: Endpoint =
    Endpoint { method: Method::Get, path: "/api/workflows/{workflow_id_or_name}/share-status" };
/// GET `/api/secrets`.
pub const LIST_SECRETS: Endpoint = Endpoint { method: Method::Get, path: "/api/secrets" };
/// POST `/api/secrets`.
pub const ADD_SECRETS: Endpoint = Endpoint { method: Method::Post, path: "/api/secrets" };
/// DELETE `/api/secrets`.
pub const DELETE_SECRETS: Endpoint = Endpoint { method: Method::Delete, path: "/api/secrets" };
/// GET `/api/you`.
pub const USER_INFO: Endpoint = Endpoint { method: Method::Get, path: "/api/you" };

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decoding(e.to_string()))
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        query.push((key, value.to_owned()));
    }
}

fn push_bool(query: &mut Vec<(&'static str, String)>, key: &'static str, value: bool) {
    // Booleans travel as literal `true`/`false`.
    query.push((key, if value { "true" } else { "false" }.to_owned()));
}

// ---------------------------------------------------------------------------
// ping / info
// ---------------------------------------------------------------------------

/// Response of the ping operation.
#[derive(Debug)]
pub enum PingResponse {
    /// 200.
    Ok(PingPayload),
    /// 500.
    ServerError(ServerMessage),
}

impl PingResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the info operation.
#[derive(Debug)]
pub enum InfoResponse {
    /// 200.
    Ok(InfoPayload),
    /// 500.
    ServerError(ServerMessage),
}

impl InfoResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// list workflows
// ---------------------------------------------------------------------------

/// Parameters of the list-workflows operation.
#[derive(Debug, Clone, Default)]
pub struct ListWorkflowsParams {
    /// Restrict the listing to runs of this workflow.
    pub workflow_id_or_name: Option<String>,
    /// JSON search object built from client-side filters.
    pub search: Option<String>,
    /// Sort order understood by the server (`asc`/`desc`).
    pub sort: Option<String>,
    /// Statuses to include; empty means all non-deleted.
    pub status: Vec<String>,
    /// Page number.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
    /// Ask the server for progress information.
    pub include_progress: bool,
    /// Ask the server for workspace sizes.
    pub include_workspace_size: bool,
}

impl ListWorkflowsParams {
    /// Encode the query string pairs.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "workflow_id_or_name", self.workflow_id_or_name.as_deref());
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "sort", self.sort.as_deref());
        for status in &self.status {
            query.push(("status", status.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size", size.to_string()));
        }
        push_bool(&mut query, "include_progress", self.include_progress);
        push_bool(&mut query, "include_workspace_size", self.include_workspace_size);
        query
    }
}

/// Response of the list-workflows operation.
#[derive(Debug)]
pub enum ListWorkflowsResponse {
    /// 200.
    Ok(WorkflowList),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl ListWorkflowsResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// create workflow
// ---------------------------------------------------------------------------

/// Body of the create-workflow operation.
///
/// The specification travels as the raw text of the user's file; the
/// server parses and validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowBody {
    /// Requested workflow name.
    pub workflow_name: String,
    /// Raw specification document.
    pub specification: String,
}

/// Response of the create-workflow operation.
#[derive(Debug)]
pub enum CreateWorkflowResponse {
    /// 201.
    Created(CreateWorkflowPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl CreateWorkflowResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            201 => Ok(Self::Created(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// workflow status
// ---------------------------------------------------------------------------

/// Response of the get-status operation.
#[derive(Debug)]
pub enum GetStatusResponse {
    /// 200.
    Ok(StatusPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl GetStatusResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Target of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Start (or restart, when the body sets the restart flag).
    Start,
    /// Stop a running workflow.
    Stop,
    /// Mark the workflow deleted.
    Deleted,
}

impl StatusTransition {
    /// Wire form of the transition.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Deleted => "deleted",
        }
    }
}

/// Body of the set-status operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusChangeBody {
    /// Input parameters overriding the stored defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub input_parameters: BTreeMap<String, serde_json::Value>,
    /// Operational options, already translated to engine keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub operational_options: BTreeMap<String, serde_json::Value>,
    /// Restart the workflow instead of starting a fresh run.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub restart: bool,
    /// Delete all runs sharing the workflow name.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all_runs: bool,
    /// Also delete the workspace.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub workspace: bool,
}

/// Response of the set-status operation.
#[derive(Debug)]
pub enum SetStatusResponse {
    /// 200.
    Ok(SetStatusPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 409 — the transition is not valid from the current state.
    Conflict(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl SetStatusResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// logs / parameters / specification / diff
// ---------------------------------------------------------------------------

/// Response of the get-logs operation.
#[derive(Debug)]
pub enum GetLogsResponse {
    /// 200.
    Ok(LogsPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl GetLogsResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the get-parameters operation.
#[derive(Debug)]
pub enum GetParametersResponse {
    /// 200.
    Ok(ParametersPayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl GetParametersResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the get-specification operation.
#[derive(Debug)]
pub enum GetSpecificationResponse {
    /// 200.
    Ok(SpecificationPayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl GetSpecificationResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Parameters of the diff operation.
#[derive(Debug, Clone, Default)]
pub struct DiffParams {
    /// Only compare the specifications, not the workspaces.
    pub brief: bool,
    /// Unified-diff context lines.
    pub context_lines: Option<i64>,
}

impl DiffParams {
    /// Encode the query string pairs.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_bool(&mut query, "brief", self.brief);
        if let Some(lines) = self.context_lines {
            query.push(("context_lines", lines.to_string()));
        }
        query
    }
}

/// Response of the diff operation.
#[derive(Debug)]
pub enum DiffResponse {
    /// 200.
    Ok(DiffPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl DiffResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// workspace files
// ---------------------------------------------------------------------------

/// Parameters of the list-files operation.
#[derive(Debug, Clone, Default)]
pub struct ListFilesParams {
    /// Glob restricting the listing.
    pub file_name: Option<String>,
    /// JSON search object built from client-side filters.
    pub search: Option<String>,
    /// Page number.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
}

impl ListFilesParams {
    /// Encode the query string pairs.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "file_name", self.file_name.as_deref());
        push_opt(&mut query, "search", self.search.as_deref());
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size", size.to_string()));
        }
        query
    }
}

/// Response of the list-files operation.
#[derive(Debug)]
pub enum ListFilesResponse {
    /// 200.
    Ok(FileList),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl ListFilesResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the upload-file operation.
#[derive(Debug)]
pub enum UploadFileResponse {
    /// 200.
    Ok(ServerMessage),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl UploadFileResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// A downloaded file, possibly a zip bundling several workspace files.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Server-supplied file name, from the content disposition.
    pub name: Option<String>,
    /// Whether the content is a zip archive bundling multiple files.
    pub zipped: bool,
    /// Raw content bytes.
    pub content: Vec<u8>,
}

/// Response of the download-file operation.
#[derive(Debug)]
pub enum DownloadFileResponse {
    /// 200 — raw bytes, not JSON.
    Ok(DownloadedFile),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl DownloadFileResponse {
    /// Discriminate a raw response. `zipped` and `name` come from the
    /// `Content-Type` and `Content-Disposition` headers.
    pub fn decode(
        status: u16,
        zipped: bool,
        name: Option<String>,
        body: Vec<u8>,
    ) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(DownloadedFile { name, zipped, content: body })),
            403 => Ok(Self::Forbidden(decode_json(&body)?)),
            404 => Ok(Self::NotFound(decode_json(&body)?)),
            500 => Ok(Self::ServerError(decode_json(&body)?)),
            _ => Err(ApiError::unexpected(status, &body)),
        }
    }
}

/// Response of the delete-file operation.
#[derive(Debug)]
pub enum DeleteFileResponse {
    /// 200 — per-path delete results.
    Ok(DeleteFilePayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl DeleteFileResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Parameters of the move-files operation.
#[derive(Debug, Clone)]
pub struct MoveFilesParams {
    /// Source path inside the workspace.
    pub source: String,
    /// Target path inside the workspace.
    pub target: String,
}

impl MoveFilesParams {
    /// Encode the query string pairs.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![("source", self.source.clone()), ("target", self.target.clone())]
    }
}

/// Response of the move-files operation.
#[derive(Debug)]
pub enum MoveFilesResponse {
    /// 200.
    Ok(ServerMessage),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 409 — target exists or workflow is running.
    Conflict(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl MoveFilesResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Parameters of the prune operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneParams {
    /// Also delete declared input files.
    pub include_inputs: bool,
    /// Also delete declared output files.
    pub include_outputs: bool,
}

impl PruneParams {
    /// Encode the query string pairs.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_bool(&mut query, "include_inputs", self.include_inputs);
        push_bool(&mut query, "include_outputs", self.include_outputs);
        query
    }
}

/// Response of the prune operation.
#[derive(Debug)]
pub enum PruneResponse {
    /// 200.
    Ok(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 409 — workspace cannot be pruned in the current state.
    Conflict(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl PruneResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the retention-rules operation.
#[derive(Debug)]
pub enum RetentionRulesResponse {
    /// 200.
    Ok(RetentionRulesPayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl RetentionRulesResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// interactive sessions
// ---------------------------------------------------------------------------

/// Body of the open-session operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenSessionBody {
    /// Container image to run the session with; server default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Response of the open-session operation.
#[derive(Debug)]
pub enum OpenSessionResponse {
    /// 200.
    Ok(OpenSessionPayload),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 409 — a session is already open.
    Conflict(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl OpenSessionResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the close-session operation.
#[derive(Debug)]
pub enum CloseSessionResponse {
    /// 200.
    Ok(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404 — workflow unknown or no open session.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl CloseSessionResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// sharing
// ---------------------------------------------------------------------------

/// Body of the share operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareBody {
    /// Email of the user to share with.
    pub user_email_to_share_with: String,
    /// Message shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Expiration date of the share.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

/// Body of the unshare operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnshareBody {
    /// Email of the user to unshare from.
    pub user_email_to_unshare_with: String,
}

/// Response of the share and unshare operations.
#[derive(Debug)]
pub enum ShareResponse {
    /// 200.
    Ok(ServerMessage),
    /// 400.
    BadRequest(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 409 — already shared / not shared.
    Conflict(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl ShareResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            400 => Ok(Self::BadRequest(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the share-status operation.
#[derive(Debug)]
pub enum ShareStatusResponse {
    /// 200.
    Ok(ShareStatusPayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 404.
    NotFound(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl ShareStatusResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// secrets
// ---------------------------------------------------------------------------

/// Body of the add-secrets operation: secret name to value.
pub type AddSecretsBody = BTreeMap<String, SecretValue>;

/// Response of the list-secrets operation.
#[derive(Debug)]
pub enum ListSecretsResponse {
    /// 200.
    Ok(Vec<Secret>),
    /// 403.
    Forbidden(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl ListSecretsResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the add-secrets operation.
#[derive(Debug)]
pub enum AddSecretsResponse {
    /// 201.
    Created(ServerMessage),
    /// 403.
    Forbidden(ServerMessage),
    /// 409 — names that already exist; nothing was added.
    Conflict(Vec<String>),
    /// 500.
    ServerError(ServerMessage),
}

impl AddSecretsResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            201 => Ok(Self::Created(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            409 => Ok(Self::Conflict(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

/// Response of the delete-secrets operation.
#[derive(Debug)]
pub enum DeleteSecretsResponse {
    /// 200 — names that were deleted.
    Ok(Vec<String>),
    /// 403.
    Forbidden(ServerMessage),
    /// 404 — names that do not exist; nothing was deleted.
    NotFound(Vec<String>),
    /// 500.
    ServerError(ServerMessage),
}

impl DeleteSecretsResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            404 => Ok(Self::NotFound(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

// ---------------------------------------------------------------------------
// user info / quota
// ---------------------------------------------------------------------------

/// Response of the user-info operation.
#[derive(Debug)]
pub enum UserInfoResponse {
    /// 200.
    Ok(UserPayload),
    /// 403.
    Forbidden(ServerMessage),
    /// 500.
    ServerError(ServerMessage),
}

impl UserInfoResponse {
    /// Discriminate a raw response.
    pub fn decode(status: u16, body: &[u8]) -> Result<Self, ApiError> {
        match status {
            200 => Ok(Self::Ok(decode_json(body)?)),
            403 => Ok(Self::Forbidden(decode_json(body)?)),
            500 => Ok(Self::ServerError(decode_json(body)?)),
            _ => Err(ApiError::unexpected(status, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_render_substitutes_parameters() {
        let path = GET_STATUS
            .render(&[("workflow_id_or_name", "myanalysis.12")])
            .expect("render");
        assert_eq!(path, "/api/workflows/myanalysis.12/status");
    }

    #[test]
    fn endpoint_render_rejects_empty_parameter() {
        let err = GET_STATUS.render(&[("workflow_id_or_name", "")]);
        assert!(matches!(err, Err(ApiError::EmptyPathParameter(_))));
    }

    #[test]
    fn endpoint_render_substitutes_two_parameters() {
        let path = DIFF_WORKFLOWS
            .render(&[
                ("workflow_id_or_name_a", "a.1"),
                ("workflow_id_or_name_b", "b.2"),
            ])
            .expect("render");
        assert_eq!(path, "/api/workflows/a.1/diff/b.2");
    }

    #[test]
    fn list_params_encode_booleans_literally() {
        let params = ListWorkflowsParams {
            include_progress: true,
            ..ListWorkflowsParams::default()
        };
        let query = params.query();
        assert!(query.contains(&("include_progress", "true".to_owned())));
        assert!(query.contains(&("include_workspace_size", "false".to_owned())));
    }

    #[test]
    fn list_params_skip_unset_options() {
        let query = ListWorkflowsParams::default().query();
        assert!(query.iter().all(|(key, _)| *key != "search"));
        assert!(query.iter().all(|(key, _)| *key != "page"));
    }

    #[test]
    fn list_params_repeat_statuses() {
        let params = ListWorkflowsParams {
            status: vec!["running".into(), "finished".into()],
            ..ListWorkflowsParams::default()
        };
        let statuses: Vec<_> = params
            .query()
            .into_iter()
            .filter(|(key, _)| *key == "status")
            .map(|(_, value)| value)
            .collect();
        assert_eq!(statuses, ["running", "finished"]);
    }

    #[test]
    fn set_status_decodes_conflict() {
        let body = br#"{"message": "Workflow is already finished"}"#;
        let response = SetStatusResponse::decode(409, body).expect("decode");
        assert!(matches!(response, SetStatusResponse::Conflict(_)));
    }

    #[test]
    fn unknown_status_code_is_an_error() {
        let err = GetLogsResponse::decode(418, b"teapot");
        assert!(matches!(err, Err(ApiError::UnexpectedStatus { status: 418, .. })));
    }

    #[test]
    fn delete_secrets_not_found_lists_names() {
        let response =
            DeleteSecretsResponse::decode(404, br#"["alpha", "beta"]"#).expect("decode");
        match response {
            DeleteSecretsResponse::NotFound(names) => assert_eq!(names, ["alpha", "beta"]),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn status_change_body_skips_empty_sections() {
        let body = StatusChangeBody::default();
        let encoded = serde_json::to_string(&body).expect("encode");
        assert_eq!(encoded, "{}");
    }
}
