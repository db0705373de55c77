//! Workflow execution commands.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use chrono::Utc;

use reana_api::ops::{
    GetParametersResponse, GetStatusResponse, SetStatusResponse, StatusChangeBody,
    StatusTransition,
};
use reana_api::types::StatusPayload;

use crate::cli::{RestartArgs, StartArgs, StatusArgs};
use crate::client::ReanaClient;
use crate::commands::files;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::format;
use crate::options;
use crate::table::{Cell, Table};
use crate::workflow::{duration_seconds, status_change_message};

/// Poll cadence used when `--check-interval` is below one second.
const DEFAULT_CHECK_INTERVAL: i64 = 5;

/// Handler for the start command.
pub struct StartCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> StartCommand<'a> {
    /// Creates a new start command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the start command.
    ///
    /// # Errors
    ///
    /// Returns error on invalid parameters or options, failed requests,
    /// or a followed execution that does not finish.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &StartArgs,
    ) -> Result<(), CliError> {
        let body = build_status_change_body(
            self.client,
            out,
            workflow,
            &args.parameters,
            &args.options,
            false,
        )
        .await?;

        let payload = submit_transition(self.client, workflow, &body).await?;
        let message = status_change_message(workflow, payload.status.as_str())?;
        display::message(out, &message, Severity::Success, false)?;

        if args.follow {
            follow_execution(self.client, out, workflow, args.check_interval).await?;
        }
        Ok(())
    }
}

/// Handler for the restart command.
pub struct RestartCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> RestartCommand<'a> {
    /// Creates a new restart command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the restart command.
    ///
    /// # Errors
    ///
    /// Returns error on invalid parameters or options or failed requests.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &RestartArgs,
    ) -> Result<(), CliError> {
        let body = build_status_change_body(
            self.client,
            out,
            workflow,
            &args.parameters,
            &args.options,
            true,
        )
        .await?;

        let payload = submit_transition(self.client, workflow, &body).await?;
        let message = status_change_message(workflow, payload.status.as_str())?;
        display::message(out, &message, Severity::Success, false)?;
        Ok(())
    }
}

/// Handler for the stop command.
pub struct StopCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> StopCommand<'a> {
    /// Creates a new stop command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the stop command.
    ///
    /// # Errors
    ///
    /// Returns error if the transition fails.
    pub async fn execute<W: Write>(&self, out: &mut W, workflow: &str) -> Result<(), CliError> {
        match self
            .client
            .set_status(workflow, StatusTransition::Stop, None)
            .await?
        {
            SetStatusResponse::Ok(payload) => {
                let message = status_change_message(workflow, payload.status.as_str())?;
                display::message(out, &message, Severity::Success, false)?;
                Ok(())
            }
            SetStatusResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
            SetStatusResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            SetStatusResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            SetStatusResponse::Conflict(msg) => Err(CliError::server(409, msg)),
            SetStatusResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the status command.
pub struct StatusCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> StatusCommand<'a> {
    /// Creates a new status command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the status command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &StatusArgs,
    ) -> Result<(), CliError> {
        let payload = fetch_status(self.client, workflow).await?;
        let table = build_status_table(&payload, args.verbose)?;

        // The status table supports column selection only.
        let tokens = format::parse_format(args.format.as_deref(), false)?;
        let table = format::apply_format(&table, &tokens)?;

        if args.json {
            display::json(out, &table.to_json_rows())?;
        } else {
            display::table(out, table.headers(), &table.to_rows())?;
        }
        Ok(())
    }
}

/// Fetch the status payload of a workflow, translating error variants.
pub async fn fetch_status(
    client: &ReanaClient,
    workflow: &str,
) -> Result<StatusPayload, CliError> {
    match client.get_status(workflow).await? {
        GetStatusResponse::Ok(payload) => Ok(payload),
        GetStatusResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
        GetStatusResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
        GetStatusResponse::NotFound(msg) => Err(CliError::server(404, msg)),
        GetStatusResponse::ServerError(msg) => Err(CliError::server(500, msg)),
    }
}

fn build_status_table(payload: &StatusPayload, verbose: bool) -> Result<Table, CliError> {
    let mut headers = vec!["name", "run_number", "created", "status", "progress", "duration"];
    if verbose {
        headers.extend(["id", "user", "command"]);
    }

    let progress = payload.progress.as_ref();
    let jobs_progress = progress.and_then(|p| {
        let total = p.total.as_ref()?.total;
        let finished = p.finished.as_ref().map_or(0, |c| c.total);
        Some(format!("{finished}/{total}"))
    });
    let seconds = duration_seconds(
        progress.and_then(|p| p.run_started_at.as_deref()),
        progress.and_then(|p| p.run_finished_at.as_deref()),
        progress.and_then(|p| p.run_stopped_at.as_deref()),
        Utc::now(),
    );

    let mut row = vec![
        Cell::from(payload.name.clone()),
        Cell::from(payload.run_number.clone()),
        Cell::from(payload.created.clone()),
        Cell::from(payload.status.as_str()),
        Cell::from(jobs_progress),
        Cell::from(seconds),
    ];
    if verbose {
        row.push(Cell::from(payload.id.clone()));
        row.push(Cell::from(payload.user.clone()));
        row.push(Cell::from(
            progress.and_then(|p| p.current_command.clone()),
        ));
    }

    let mut table = Table::new(&headers);
    table.append_row(row)?;
    Ok(table)
}

/// Build the start/restart body: parse `key=value` inputs, then validate
/// operational options (hard failure) and input parameters (warn and drop)
/// against the server-reported workflow specification.
async fn build_status_change_body<W: Write>(
    client: &ReanaClient,
    out: &mut W,
    workflow: &str,
    parameters: &[String],
    operational_options: &[String],
    restart: bool,
) -> Result<StatusChangeBody, CliError> {
    let parameters = parse_assignments(parameters, "--parameter")?;
    let operational_options = parse_assignments(operational_options, "--option")?;

    let mut body = StatusChangeBody { restart, ..StatusChangeBody::default() };
    if parameters.is_empty() && operational_options.is_empty() {
        return Ok(body);
    }

    let declared = match client.get_parameters(workflow).await? {
        GetParametersResponse::Ok(payload) => payload,
        GetParametersResponse::Forbidden(msg) => return Err(CliError::server(403, msg)),
        GetParametersResponse::NotFound(msg) => return Err(CliError::server(404, msg)),
        GetParametersResponse::ServerError(msg) => return Err(CliError::server(500, msg)),
    };

    body.operational_options =
        options::validate_operational_options(&declared.engine, &operational_options)?;

    let (accepted, rejected) =
        options::validate_input_parameters(&parameters, &declared.parameters);
    for name in rejected {
        display::message(
            out,
            &format!("Given parameter - {name} is not in the workflow specification"),
            Severity::Warning,
            false,
        )?;
    }
    body.input_parameters = accepted;
    Ok(body)
}

fn parse_assignments(
    assignments: &[String],
    option_name: &str,
) -> Result<BTreeMap<String, String>, CliError> {
    let mut parsed = BTreeMap::new();
    for assignment in assignments {
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(CliError::Usage(format!(
                "Wrong input format. Please use {option_name} key=value"
            )));
        };
        parsed.insert(key.to_owned(), value.to_owned());
    }
    Ok(parsed)
}

async fn submit_transition(
    client: &ReanaClient,
    workflow: &str,
    body: &StatusChangeBody,
) -> Result<reana_api::types::SetStatusPayload, CliError> {
    match client
        .set_status(workflow, StatusTransition::Start, Some(body))
        .await?
    {
        SetStatusResponse::Ok(payload) => Ok(payload),
        SetStatusResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
        SetStatusResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
        SetStatusResponse::NotFound(msg) => Err(CliError::server(404, msg)),
        SetStatusResponse::Conflict(msg) => Err(CliError::server(409, msg)),
        SetStatusResponse::ServerError(msg) => Err(CliError::server(500, msg)),
    }
}

/// Follow a started workflow until it reaches a terminal status.
///
/// Emits a status-change message on every poll. A finished workflow lists
/// its output-file URLs; a deleted, failed, or stopped workflow ends the
/// follow with a non-zero exit status. An interrupt stops the loop
/// immediately.
async fn follow_execution<W: Write>(
    client: &ReanaClient,
    out: &mut W,
    workflow: &str,
    check_interval: i64,
) -> Result<(), CliError> {
    let interval = if check_interval < 1 { DEFAULT_CHECK_INTERVAL } else { check_interval };
    let interval = Duration::from_secs(interval.unsigned_abs());

    loop {
        let payload = fetch_status(client, workflow).await?;
        let status = payload.status;
        let message = status_change_message(workflow, status.as_str())?;
        display::message(out, &message, Severity::Info, false)?;

        if status == reana_api::types::RunStatus::Finished {
            display::message(out, "Listing workflow output files...", Severity::Info, false)?;
            files::list_output_urls(client, out, workflow).await?;
            return Ok(());
        }
        if status.is_terminal() {
            display::message(
                out,
                &format!("The workflow did not finish ({status})."),
                Severity::Error,
                false,
            )?;
            return Err(CliError::Silent);
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
