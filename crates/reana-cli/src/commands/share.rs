//! Workflow sharing commands.

use std::io::Write;

use reana_api::ops::{ShareBody, ShareResponse, ShareStatusResponse, UnshareBody};

use crate::cli::{ShareAddArgs, ShareRemoveArgs, ShareStatusArgs};
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::table::Table;

/// Handler for the share-add command.
pub struct ShareAddCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> ShareAddCommand<'a> {
    /// Creates a new share-add command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the share-add command.
    ///
    /// Sharing proceeds user by user; failures are reported per user and
    /// the overall exit status is non-zero when any share failed.
    ///
    /// # Errors
    ///
    /// Returns a silent error after reporting per-user failures.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &ShareAddArgs,
    ) -> Result<(), CliError> {
        let mut failed = false;
        for user in &args.users {
            let body = ShareBody {
                user_email_to_share_with: user.clone(),
                message: args.message.clone(),
                valid_until: args.valid_until.clone(),
            };
            match self.client.share_workflow(workflow, &body).await? {
                ShareResponse::Ok(_) => {
                    display::message(
                        out,
                        &format!("{workflow} is now read-only shared with {user}"),
                        Severity::Success,
                        false,
                    )?;
                }
                ShareResponse::BadRequest(msg)
                | ShareResponse::Forbidden(msg)
                | ShareResponse::NotFound(msg)
                | ShareResponse::Conflict(msg)
                | ShareResponse::ServerError(msg) => {
                    failed = true;
                    display::message(out, &msg.message, Severity::Error, false)?;
                }
            }
        }
        if failed { Err(CliError::Silent) } else { Ok(()) }
    }
}

/// Handler for the share-remove command.
pub struct ShareRemoveCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> ShareRemoveCommand<'a> {
    /// Creates a new share-remove command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the share-remove command.
    ///
    /// # Errors
    ///
    /// Returns a silent error after reporting per-user failures.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &ShareRemoveArgs,
    ) -> Result<(), CliError> {
        let mut failed = false;
        for user in &args.users {
            let body = UnshareBody { user_email_to_unshare_with: user.clone() };
            match self.client.unshare_workflow(workflow, &body).await? {
                ShareResponse::Ok(_) => {
                    display::message(
                        out,
                        &format!("{workflow} is no longer shared with {user}"),
                        Severity::Success,
                        false,
                    )?;
                }
                ShareResponse::BadRequest(msg)
                | ShareResponse::Forbidden(msg)
                | ShareResponse::NotFound(msg)
                | ShareResponse::Conflict(msg)
                | ShareResponse::ServerError(msg) => {
                    failed = true;
                    display::message(out, &msg.message, Severity::Error, false)?;
                }
            }
        }
        if failed { Err(CliError::Silent) } else { Ok(()) }
    }
}

/// Handler for the share-status command.
pub struct ShareStatusCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> ShareStatusCommand<'a> {
    /// Creates a new share-status command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the share-status command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &ShareStatusArgs,
    ) -> Result<(), CliError> {
        match self.client.share_status(workflow).await? {
            ShareStatusResponse::Ok(payload) => {
                if payload.shared_with.is_empty() && !args.json {
                    display::message(
                        out,
                        &format!("{workflow} is not shared with anyone"),
                        Severity::Info,
                        false,
                    )?;
                    return Ok(());
                }
                let mut table = Table::new(&["user_email", "valid_until"]);
                for entry in payload.shared_with {
                    table.append_row(vec![entry.user_email.into(), entry.valid_until.into()])?;
                }
                if args.json {
                    display::json(out, &table.to_json_rows())?;
                } else {
                    display::table(out, table.headers(), &table.to_rows())?;
                }
                Ok(())
            }
            ShareStatusResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            ShareStatusResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            ShareStatusResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}
