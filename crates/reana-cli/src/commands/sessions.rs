//! Interactive session commands.

use std::io::Write;

use reana_api::ops::{CloseSessionResponse, InfoResponse, OpenSessionBody, OpenSessionResponse};

use crate::cli::OpenArgs;
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::validation;

/// Session types the client knows how to open.
const SESSION_TYPES: &[&str] = &["jupyter"];

/// Cluster-information key advertising the session inactivity limit.
const INACTIVITY_KEY: &str = "maximum_interactive_session_inactivity_period";

/// Handler for the open command.
pub struct OpenCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> OpenCommand<'a> {
    /// Creates a new open command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the open command.
    ///
    /// # Errors
    ///
    /// Returns error for unknown session types or failed requests.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &OpenArgs,
    ) -> Result<(), CliError> {
        validation::choice("interactive session type", &args.session_type, SESSION_TYPES)?;

        let body = OpenSessionBody { image: args.image.clone() };
        match self.client.open_session(workflow, &args.session_type, &body).await? {
            OpenSessionResponse::Ok(payload) => {
                display::message(
                    out,
                    "Interactive session opened successfully",
                    Severity::Success,
                    false,
                )?;
                writeln!(
                    out,
                    "{}{}?token={}",
                    self.client.base_url(),
                    payload.path,
                    self.client.access_token()
                )?;
                writeln!(out, "It could take several minutes to start the interactive session.")?;
                self.warn_about_inactivity(out).await?;
                Ok(())
            }
            OpenSessionResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
            OpenSessionResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            OpenSessionResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            OpenSessionResponse::Conflict(msg) => Err(CliError::server(409, msg)),
            OpenSessionResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }

    /// Warn when the cluster closes idle sessions automatically.
    async fn warn_about_inactivity<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let InfoResponse::Ok(info) = self.client.info().await? else {
            return Ok(());
        };
        let days = info
            .get(INACTIVITY_KEY)
            .map(|item| &item.value)
            .and_then(|value| match value {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        if let Some(days) = days {
            display::message(
                out,
                &format!(
                    "Please note that it will be automatically closed after {days} days of inactivity."
                ),
                Severity::Warning,
                false,
            )?;
        }
        Ok(())
    }
}

/// Handler for the close command.
pub struct CloseCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> CloseCommand<'a> {
    /// Creates a new close command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the close command.
    ///
    /// # Errors
    ///
    /// Returns error if no session is open or the request fails.
    pub async fn execute<W: Write>(&self, out: &mut W, workflow: &str) -> Result<(), CliError> {
        match self.client.close_session(workflow).await? {
            CloseSessionResponse::Ok(_) => {
                display::message(
                    out,
                    &format!("Interactive session for workflow {workflow} was successfully closed"),
                    Severity::Success,
                    false,
                )?;
                Ok(())
            }
            CloseSessionResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            CloseSessionResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            CloseSessionResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}
