//! Workspace file retention commands.

use std::io::Write;

use reana_api::ops::{PruneParams, PruneResponse, RetentionRulesResponse};

use crate::cli::{PruneArgs, RetentionRulesArgs};
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::format;
use crate::table::Table;

/// Handler for the prune command.
pub struct PruneCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> PruneCommand<'a> {
    /// Creates a new prune command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the prune command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &PruneArgs,
    ) -> Result<(), CliError> {
        let params = PruneParams {
            include_inputs: args.include_inputs,
            include_outputs: args.include_outputs,
        };
        match self.client.prune_workspace(workflow, &params).await? {
            PruneResponse::Ok(msg) => {
                let text = if msg.message.is_empty() {
                    "The workspace has been correctly pruned.".to_owned()
                } else {
                    msg.message
                };
                display::message(out, &text, Severity::Success, false)?;
                Ok(())
            }
            PruneResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            PruneResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            PruneResponse::Conflict(msg) => Err(CliError::server(409, msg)),
            PruneResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the retention-rules-list command.
pub struct RetentionRulesListCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> RetentionRulesListCommand<'a> {
    /// Creates a new retention-rules-list command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the retention-rules-list command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &RetentionRulesArgs,
    ) -> Result<(), CliError> {
        match self.client.get_retention_rules(workflow).await? {
            RetentionRulesResponse::Ok(payload) => {
                let mut table =
                    Table::new(&["workspace_files", "retention_days", "apply_on", "status"]);
                for rule in payload.retention_rules {
                    table.append_row(vec![
                        rule.workspace_files.into(),
                        rule.retention_days.into(),
                        rule.apply_on.into(),
                        rule.status.into(),
                    ])?;
                }

                let tokens = format::parse_format(args.format.as_deref(), true)?;
                let table = format::apply_format(&table, &tokens)?;

                if args.json {
                    display::json(out, &table.to_json_rows())?;
                } else {
                    display::table(out, table.headers(), &table.to_rows())?;
                }
                Ok(())
            }
            RetentionRulesResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            RetentionRulesResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            RetentionRulesResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}
