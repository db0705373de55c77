//! HTTP client for REANA server operations.
//!
//! One method per server operation. Each method renders the endpoint's
//! path template, attaches the `access_token` query parameter, submits the
//! request with per-request timeouts, and hands the raw status and body to
//! the operation's typed response decoder from `reana-api`.
//!
//! TLS certificate verification is DISABLED unless the context asks for
//! it: REANA clusters commonly run with self-signed certificates, and the
//! `--verify-tls` flag re-enables verification.

use std::time::Duration;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tracing::debug;

use reana_api::ops::{
    self, AddSecretsBody, AddSecretsResponse, CloseSessionResponse, CreateWorkflowBody,
    CreateWorkflowResponse, DeleteFileResponse, DeleteSecretsResponse, DiffParams, DiffResponse,
    DownloadFileResponse, Endpoint, GetLogsResponse, GetParametersResponse,
    GetSpecificationResponse, GetStatusResponse, InfoResponse, ListFilesParams,
    ListFilesResponse, ListSecretsResponse, ListWorkflowsParams, ListWorkflowsResponse, Method,
    MoveFilesParams, MoveFilesResponse, OpenSessionBody, OpenSessionResponse, PingResponse,
    PruneParams, PruneResponse, RetentionRulesResponse, SetStatusResponse, ShareBody,
    ShareResponse, ShareStatusResponse, StatusChangeBody, StatusTransition, UnshareBody,
    UploadFileResponse, UserInfoResponse,
};

use crate::config::Context;
use crate::error::CliError;

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// REANA server client, bound to one server URL and access token.
pub struct ReanaClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for ReanaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReanaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ReanaClient {
    /// Build a client from the resolved connection context.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the HTTP client cannot be built.
    pub fn new(context: &Context) -> Result<Self, CliError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!context.verify_tls)
            .build()
            .map_err(|e| CliError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: context.server_url.trim_end_matches('/').to_owned(),
            access_token: context.access_token.clone(),
        })
    }

    /// Server URL the client is bound to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token the client authenticates with.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    fn connection_error(&self) -> CliError {
        let host = reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .unwrap_or_else(|| self.base_url.clone());
        CliError::Connection { host }
    }

    async fn execute(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<(u16, Vec<u8>), CliError> {
        let (status, _, _, bytes) = self.execute_raw(endpoint, path, query, body, None).await?;
        Ok((status, bytes))
    }

    async fn execute_raw(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&'static str, String)],
        json_body: Option<serde_json::Value>,
        raw_body: Option<Vec<u8>>,
    ) -> Result<(u16, Option<String>, Option<String>, Vec<u8>), CliError> {
        let url = format!("{}{}", self.base_url, path);
        let method = match endpoint.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        debug!(%url, method = %method, "submitting request");

        let mut request = self
            .http
            .request(method, &url)
            .query(&[("access_token", self.access_token.as_str())]);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = json_body {
            request = request.json(&body);
        }
        if let Some(body) = raw_body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|_| self.connection_error())?;
        let status = response.status().as_u16();
        let content_type = header_value(&response, CONTENT_TYPE);
        let disposition = header_value(&response, CONTENT_DISPOSITION);
        let bytes = response
            .bytes()
            .await
            .map_err(|_| self.connection_error())?
            .to_vec();
        debug!(status, bytes = bytes.len(), "received response");
        Ok((status, content_type, disposition, bytes))
    }

    /// Check the connection and the access token.
    pub async fn ping(&self) -> Result<PingResponse, CliError> {
        let path = ops::PING.render(&[])?;
        let (status, body) = self.execute(ops::PING, &path, &[], None).await?;
        Ok(PingResponse::decode(status, &body)?)
    }

    /// Fetch the cluster information map.
    pub async fn info(&self) -> Result<InfoResponse, CliError> {
        let path = ops::INFO.render(&[])?;
        let (status, body) = self.execute(ops::INFO, &path, &[], None).await?;
        Ok(InfoResponse::decode(status, &body)?)
    }

    /// List workflows.
    pub async fn list_workflows(
        &self,
        params: &ListWorkflowsParams,
    ) -> Result<ListWorkflowsResponse, CliError> {
        let path = ops::LIST_WORKFLOWS.render(&[])?;
        let (status, body) = self
            .execute(ops::LIST_WORKFLOWS, &path, &params.query(), None)
            .await?;
        Ok(ListWorkflowsResponse::decode(status, &body)?)
    }

    /// Create a workflow from a raw specification document.
    pub async fn create_workflow(
        &self,
        body: &CreateWorkflowBody,
    ) -> Result<CreateWorkflowResponse, CliError> {
        let path = ops::CREATE_WORKFLOW.render(&[])?;
        let body = serde_json::to_value(body)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::CREATE_WORKFLOW, &path, &[], Some(body))
            .await?;
        Ok(CreateWorkflowResponse::decode(status, &body)?)
    }

    /// Fetch the status of a workflow.
    pub async fn get_status(&self, workflow: &str) -> Result<GetStatusResponse, CliError> {
        let path = ops::GET_STATUS.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self.execute(ops::GET_STATUS, &path, &[], None).await?;
        Ok(GetStatusResponse::decode(status, &body)?)
    }

    /// Request a status transition, optionally with a start body.
    pub async fn set_status(
        &self,
        workflow: &str,
        transition: StatusTransition,
        body: Option<&StatusChangeBody>,
    ) -> Result<SetStatusResponse, CliError> {
        let path = ops::SET_STATUS.render(&[("workflow_id_or_name", workflow)])?;
        let query = vec![("status", transition.as_str().to_owned())];
        let body = match body {
            Some(body) => Some(
                serde_json::to_value(body)
                    .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?,
            ),
            None => None,
        };
        let (status, body) = self.execute(ops::SET_STATUS, &path, &query, body).await?;
        Ok(SetStatusResponse::decode(status, &body)?)
    }

    /// Fetch the structured logs of a workflow.
    pub async fn get_logs(&self, workflow: &str) -> Result<GetLogsResponse, CliError> {
        let path = ops::GET_LOGS.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self.execute(ops::GET_LOGS, &path, &[], None).await?;
        Ok(GetLogsResponse::decode(status, &body)?)
    }

    /// Fetch the declared input parameters of a workflow.
    pub async fn get_parameters(&self, workflow: &str) -> Result<GetParametersResponse, CliError> {
        let path = ops::GET_PARAMETERS.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self.execute(ops::GET_PARAMETERS, &path, &[], None).await?;
        Ok(GetParametersResponse::decode(status, &body)?)
    }

    /// Fetch the stored specification of a workflow.
    pub async fn get_specification(
        &self,
        workflow: &str,
    ) -> Result<GetSpecificationResponse, CliError> {
        let path = ops::GET_SPECIFICATION.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self
            .execute(ops::GET_SPECIFICATION, &path, &[], None)
            .await?;
        Ok(GetSpecificationResponse::decode(status, &body)?)
    }

    /// Compare two workflows.
    pub async fn diff(
        &self,
        workflow_a: &str,
        workflow_b: &str,
        params: &DiffParams,
    ) -> Result<DiffResponse, CliError> {
        let path = ops::DIFF_WORKFLOWS.render(&[
            ("workflow_id_or_name_a", workflow_a),
            ("workflow_id_or_name_b", workflow_b),
        ])?;
        let (status, body) = self
            .execute(ops::DIFF_WORKFLOWS, &path, &params.query(), None)
            .await?;
        Ok(DiffResponse::decode(status, &body)?)
    }

    /// List workspace files.
    pub async fn list_files(
        &self,
        workflow: &str,
        params: &ListFilesParams,
    ) -> Result<ListFilesResponse, CliError> {
        let path = ops::LIST_FILES.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self
            .execute(ops::LIST_FILES, &path, &params.query(), None)
            .await?;
        Ok(ListFilesResponse::decode(status, &body)?)
    }

    /// Upload one file into the workspace.
    pub async fn upload_file(
        &self,
        workflow: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<UploadFileResponse, CliError> {
        let path = ops::UPLOAD_FILE.render(&[("workflow_id_or_name", workflow)])?;
        let query = vec![("file_name", file_name.to_owned())];
        let (status, _, _, body) = self
            .execute_raw(ops::UPLOAD_FILE, &path, &query, None, Some(content))
            .await?;
        Ok(UploadFileResponse::decode(status, &body)?)
    }

    /// Download a workspace file or glob; a glob matching several files
    /// arrives as a zip archive.
    pub async fn download_file(
        &self,
        workflow: &str,
        file_name: &str,
    ) -> Result<DownloadFileResponse, CliError> {
        let path = ops::DOWNLOAD_FILE.render(&[
            ("workflow_id_or_name", workflow),
            ("file_name", file_name),
        ])?;
        let (status, content_type, disposition, body) = self
            .execute_raw(ops::DOWNLOAD_FILE, &path, &[], None, None)
            .await?;
        let zipped = content_type.as_deref().is_some_and(|ct| ct.contains("zip"));
        let name = disposition.as_deref().and_then(disposition_filename);
        Ok(DownloadFileResponse::decode(status, zipped, name, body)?)
    }

    /// Delete a workspace file or glob.
    pub async fn delete_file(
        &self,
        workflow: &str,
        file_name: &str,
    ) -> Result<DeleteFileResponse, CliError> {
        let path = ops::DELETE_FILE.render(&[
            ("workflow_id_or_name", workflow),
            ("file_name", file_name),
        ])?;
        let (status, body) = self.execute(ops::DELETE_FILE, &path, &[], None).await?;
        Ok(DeleteFileResponse::decode(status, &body)?)
    }

    /// Move files within the workspace.
    pub async fn move_files(
        &self,
        workflow: &str,
        params: &MoveFilesParams,
    ) -> Result<MoveFilesResponse, CliError> {
        let path = ops::MOVE_FILES.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self
            .execute(ops::MOVE_FILES, &path, &params.query(), None)
            .await?;
        Ok(MoveFilesResponse::decode(status, &body)?)
    }

    /// Prune the workspace.
    pub async fn prune_workspace(
        &self,
        workflow: &str,
        params: &PruneParams,
    ) -> Result<PruneResponse, CliError> {
        let path = ops::PRUNE_WORKSPACE.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self
            .execute(ops::PRUNE_WORKSPACE, &path, &params.query(), None)
            .await?;
        Ok(PruneResponse::decode(status, &body)?)
    }

    /// Fetch the retention rules of the workspace.
    pub async fn get_retention_rules(
        &self,
        workflow: &str,
    ) -> Result<RetentionRulesResponse, CliError> {
        let path = ops::GET_RETENTION_RULES.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self
            .execute(ops::GET_RETENTION_RULES, &path, &[], None)
            .await?;
        Ok(RetentionRulesResponse::decode(status, &body)?)
    }

    /// Open an interactive session on the workspace.
    pub async fn open_session(
        &self,
        workflow: &str,
        session_type: &str,
        body: &OpenSessionBody,
    ) -> Result<OpenSessionResponse, CliError> {
        let path = ops::OPEN_SESSION.render(&[
            ("workflow_id_or_name", workflow),
            ("interactive_session_type", session_type),
        ])?;
        let body = serde_json::to_value(body)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::OPEN_SESSION, &path, &[], Some(body))
            .await?;
        Ok(OpenSessionResponse::decode(status, &body)?)
    }

    /// Close the workspace's interactive session.
    pub async fn close_session(&self, workflow: &str) -> Result<CloseSessionResponse, CliError> {
        let path = ops::CLOSE_SESSION.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self.execute(ops::CLOSE_SESSION, &path, &[], None).await?;
        Ok(CloseSessionResponse::decode(status, &body)?)
    }

    /// Share the workflow with one user.
    pub async fn share_workflow(
        &self,
        workflow: &str,
        body: &ShareBody,
    ) -> Result<ShareResponse, CliError> {
        let path = ops::SHARE_WORKFLOW.render(&[("workflow_id_or_name", workflow)])?;
        let body = serde_json::to_value(body)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::SHARE_WORKFLOW, &path, &[], Some(body))
            .await?;
        Ok(ShareResponse::decode(status, &body)?)
    }

    /// Revoke one user's access to the workflow.
    pub async fn unshare_workflow(
        &self,
        workflow: &str,
        body: &UnshareBody,
    ) -> Result<ShareResponse, CliError> {
        let path = ops::UNSHARE_WORKFLOW.render(&[("workflow_id_or_name", workflow)])?;
        let body = serde_json::to_value(body)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::UNSHARE_WORKFLOW, &path, &[], Some(body))
            .await?;
        Ok(ShareResponse::decode(status, &body)?)
    }

    /// Show with whom the workflow is shared.
    pub async fn share_status(&self, workflow: &str) -> Result<ShareStatusResponse, CliError> {
        let path = ops::SHARE_STATUS.render(&[("workflow_id_or_name", workflow)])?;
        let (status, body) = self.execute(ops::SHARE_STATUS, &path, &[], None).await?;
        Ok(ShareStatusResponse::decode(status, &body)?)
    }

    /// List the user's secrets.
    pub async fn list_secrets(&self) -> Result<ListSecretsResponse, CliError> {
        let path = ops::LIST_SECRETS.render(&[])?;
        let (status, body) = self.execute(ops::LIST_SECRETS, &path, &[], None).await?;
        Ok(ListSecretsResponse::decode(status, &body)?)
    }

    /// Add secrets.
    pub async fn add_secrets(
        &self,
        secrets: &AddSecretsBody,
        overwrite: bool,
    ) -> Result<AddSecretsResponse, CliError> {
        let path = ops::ADD_SECRETS.render(&[])?;
        let query = vec![("overwrite", if overwrite { "true" } else { "false" }.to_owned())];
        let body = serde_json::to_value(secrets)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::ADD_SECRETS, &path, &query, Some(body))
            .await?;
        Ok(AddSecretsResponse::decode(status, &body)?)
    }

    /// Delete secrets by name.
    pub async fn delete_secrets(
        &self,
        names: &[String],
    ) -> Result<DeleteSecretsResponse, CliError> {
        let path = ops::DELETE_SECRETS.render(&[])?;
        let body = serde_json::to_value(names)
            .map_err(|e| CliError::Format(format!("request encoding failed: {e}")))?;
        let (status, body) = self
            .execute(ops::DELETE_SECRETS, &path, &[], Some(body))
            .await?;
        Ok(DeleteSecretsResponse::decode(status, &body)?)
    }

    /// Fetch the user's quota.
    pub async fn user_info(&self) -> Result<UserInfoResponse, CliError> {
        let path = ops::USER_INFO.render(&[])?;
        let (status, body) = self.execute(ops::USER_INFO, &path, &[], None).await?;
        Ok(UserInfoResponse::decode(status, &body)?)
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Extract the filename from a `Content-Disposition` header value.
fn disposition_filename(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let part = part.trim();
        part.strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_is_extracted() {
        assert_eq!(
            disposition_filename("attachment; filename=plot.png"),
            Some("plot.png".to_owned())
        );
        assert_eq!(
            disposition_filename(r#"attachment; filename="results.zip""#),
            Some("results.zip".to_owned())
        );
        assert_eq!(disposition_filename("inline"), None);
    }

    #[test]
    fn client_debug_hides_the_token() {
        let context = Context {
            server_url: "https://reana.example.org".into(),
            access_token: "super-secret".into(),
            verify_tls: false,
        };
        let client = ReanaClient::new(&context).expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("reana.example.org"));
        assert!(!debug.contains("super-secret"));
    }
}
