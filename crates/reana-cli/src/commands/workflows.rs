//! Workflow management commands.

use std::collections::HashMap;
use std::io::Write;

use chrono::Utc;

use reana_api::ops::{
    CreateWorkflowBody, CreateWorkflowResponse, DiffParams, DiffResponse, ListWorkflowsParams,
    ListWorkflowsResponse, SetStatusResponse, StatusChangeBody, StatusTransition,
};
use reana_api::types::{DiffPayload, RunStatus, Workflow};

use crate::cli::{CreateArgs, DeleteArgs, DiffArgs, ListArgs};
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::filter::FilterSet;
use crate::format;
use crate::table::{Cell, Table};
use crate::validation;
use crate::workflow::{duration_seconds, split_reference, status_change_message};

/// Handler for the list command.
pub struct ListCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> ListCommand<'a> {
    /// Creates a new list command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the list command.
    ///
    /// # Errors
    ///
    /// Returns error on invalid filters or failed requests.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &ListArgs) -> Result<(), CliError> {
        let filters = FilterSet::parse(&args.filter, &[], &["name", "status"])?;
        let statuses: Vec<&str> = RunStatus::ALL.iter().map(RunStatus::as_str).collect();
        filters.validate_choices("status", &statuses)?;

        let status_filter: Vec<String> = if filters.multi("status").is_empty() {
            if args.show_deleted_runs {
                // Deleted runs are excluded by the server unless named.
                statuses.iter().map(|&s| s.to_owned()).collect()
            } else {
                Vec::new()
            }
        } else {
            filters.multi("status").to_vec()
        };

        let params = ListWorkflowsParams {
            search: filters.to_search_json(&["name"]),
            status: status_filter,
            page: args.page,
            size: args.size,
            include_progress: true,
            include_workspace_size: args.include_workspace_size,
            ..ListWorkflowsParams::default()
        };

        let list = match self.client.list_workflows(&params).await? {
            ListWorkflowsResponse::Ok(list) => list,
            ListWorkflowsResponse::BadRequest(msg) => return Err(CliError::server(400, msg)),
            ListWorkflowsResponse::Forbidden(msg) => return Err(CliError::server(403, msg)),
            ListWorkflowsResponse::NotFound(msg) => return Err(CliError::server(404, msg)),
            ListWorkflowsResponse::ServerError(msg) => return Err(CliError::server(500, msg)),
        };

        let (mut table, human_sizes) = build_workflow_table(
            &list.items,
            args.include_workspace_size,
            args.include_duration,
            args.human_readable,
        )?;

        let human_sizes = args.human_readable.then_some(&human_sizes);
        format::sort_table(out, &mut table, &args.sort, !args.ascending, human_sizes)?;

        let tokens = format::parse_format(args.format.as_deref(), true)?;
        let table = format::apply_format(&table, &tokens)?;

        if args.json {
            display::json(out, &table.to_json_rows())?;
        } else {
            display::table(out, table.headers(), &table.to_rows())?;
        }
        Ok(())
    }
}

/// Build the listing table; returns the rendered-size → raw-bytes map used
/// for human-readable size sorting.
fn build_workflow_table(
    workflows: &[Workflow],
    include_workspace_size: bool,
    include_duration: bool,
    human_readable: bool,
) -> Result<(Table, HashMap<String, i64>), CliError> {
    let mut headers = vec!["name", "run_number", "created", "started", "ended", "status"];
    if include_workspace_size {
        headers.push("size");
    }
    if include_duration {
        headers.push("duration");
    }

    let mut table = Table::new(&headers);
    let mut human_sizes = HashMap::new();
    let now = Utc::now();

    for workflow in workflows {
        let progress = workflow.progress.as_ref();
        let started = progress.and_then(|p| p.run_started_at.clone());
        let ended = progress.and_then(|p| p.run_finished_at.clone());

        let mut row = vec![
            Cell::from(workflow.name.clone()),
            Cell::from(workflow.run_number.clone()),
            Cell::from(workflow.created.clone()),
            Cell::from(started.clone()),
            Cell::from(ended),
            Cell::from(workflow.status.as_str()),
        ];

        if include_workspace_size {
            let cell = match &workflow.size {
                Some(size) if human_readable => {
                    human_sizes.insert(size.human_readable.clone(), size.raw);
                    Cell::from(size.human_readable.clone())
                }
                Some(size) => Cell::from(size.raw),
                None => Cell::Null,
            };
            row.push(cell);
        }

        if include_duration {
            let seconds = duration_seconds(
                progress.and_then(|p| p.run_started_at.as_deref()),
                progress.and_then(|p| p.run_finished_at.as_deref()),
                progress.and_then(|p| p.run_stopped_at.as_deref()),
                now,
            );
            row.push(Cell::from(seconds));
        }

        table.append_row(row)?;
    }
    Ok((table, human_sizes))
}

/// Handler for the create command.
pub struct CreateCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> CreateCommand<'a> {
    /// Creates a new create command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the create command.
    ///
    /// # Errors
    ///
    /// Returns error when the specification file is unreadable or the
    /// server rejects the workflow.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &CreateArgs) -> Result<(), CliError> {
        validation::not_empty("workflow name", &args.name)?;
        validation::readable_file(&args.file)?;
        let specification = std::fs::read_to_string(&args.file)?;

        let body = CreateWorkflowBody {
            workflow_name: args.name.clone(),
            specification,
        };
        match self.client.create_workflow(&body).await? {
            CreateWorkflowResponse::Created(payload) => {
                let message = status_change_message(&payload.workflow_name, "created")?;
                display::message(out, &message, Severity::Success, false)?;
                Ok(())
            }
            CreateWorkflowResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
            CreateWorkflowResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            CreateWorkflowResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the delete command.
pub struct DeleteCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> DeleteCommand<'a> {
    /// Creates a new delete command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the delete command.
    ///
    /// # Errors
    ///
    /// Returns error if the transition fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &DeleteArgs,
    ) -> Result<(), CliError> {
        let body = StatusChangeBody {
            all_runs: args.include_all_runs,
            workspace: args.include_workspace,
            ..StatusChangeBody::default()
        };
        match self
            .client
            .set_status(workflow, StatusTransition::Deleted, Some(&body))
            .await?
        {
            SetStatusResponse::Ok(_) => {
                let message = if args.include_all_runs {
                    let (name, _) = split_reference(workflow);
                    format!("All workflows named '{name}' have been deleted")
                } else {
                    status_change_message(workflow, "deleted")?
                };
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

/// Handler for the diff command.
pub struct DiffCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> DiffCommand<'a> {
    /// Creates a new diff command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the diff command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &DiffArgs) -> Result<(), CliError> {
        let params = DiffParams { brief: args.brief, context_lines: args.context_lines };
        let payload = match self
            .client
            .diff(&args.workflow_a, &args.workflow_b, &params)
            .await?
        {
            DiffResponse::Ok(payload) => payload,
            DiffResponse::BadRequest(msg) => return Err(CliError::server(400, msg)),
            DiffResponse::Forbidden(msg) => return Err(CliError::server(403, msg)),
            DiffResponse::NotFound(msg) => return Err(CliError::server(404, msg)),
            DiffResponse::ServerError(msg) => return Err(CliError::server(500, msg)),
        };

        let (sections, workspace) = diff_sections(&payload);
        let mut printed = false;

        for (section, lines) in &sections {
            if lines.is_empty() {
                continue;
            }
            printed = true;
            display::message(
                out,
                &format!("Differences in workflow {section}"),
                Severity::Info,
                false,
            )?;
            for line in lines {
                writeln!(out, "{}", display::diff_line(line))?;
            }
        }

        if !workspace.is_empty() {
            printed = true;
            display::message(out, "Differences in workflow workspace", Severity::Info, false)?;
            for line in &workspace {
                writeln!(out, "{}", display::diff_line(line))?;
            }
        }

        if !printed {
            display::message(out, "No differences found.", Severity::Info, false)?;
        }
        Ok(())
    }
}

/// Shape the raw diff payload: decode the specification sections, rename
/// the `workflow` section to `specification`, and flatten every section
/// value into diff lines.
fn diff_sections(payload: &DiffPayload) -> (Vec<(String, Vec<String>)>, Vec<String>) {
    let mut sections = Vec::new();
    if let Some(serde_json::Value::Object(map)) = &payload.reana_specification {
        for (key, value) in map {
            let section = if key == "workflow" { "specification" } else { key.as_str() };
            sections.push((section.to_owned(), value_lines(value)));
        }
    }
    let workspace = payload.workspace_listing.as_ref().map_or_else(Vec::new, value_lines);
    (sections, workspace)
}

fn value_lines(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        serde_json::Value::String(s) if !s.is_empty() => {
            s.lines().map(str::to_owned).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_api::types::WorkflowProgress;

    fn workflow(name: &str, run_number: &str, status: RunStatus) -> Workflow {
        Workflow {
            id: format!("{name}-id"),
            name: name.to_owned(),
            run_number: run_number.to_owned(),
            created: "2022-08-10T17:14:12".to_owned(),
            status,
            user: None,
            size: None,
            progress: Some(WorkflowProgress {
                run_started_at: Some("2022-08-10T18:04:52".to_owned()),
                ..WorkflowProgress::default()
            }),
            launcher_url: None,
            session_uri: None,
            session_status: None,
        }
    }

    #[test]
    fn listing_table_has_default_columns() {
        let workflows = vec![
            workflow("my_workflow", "23", RunStatus::Finished),
            workflow("my_workflow2", "12", RunStatus::Running),
        ];
        let (table, _) = build_workflow_table(&workflows, false, false, false).expect("table");
        assert_eq!(
            table.headers(),
            ["name", "run_number", "created", "started", "ended", "status"]
        );
        let rows = table.to_rows();
        assert_eq!(
            rows[1],
            vec![
                "my_workflow2",
                "12",
                "2022-08-10T17:14:12",
                "2022-08-10T18:04:52",
                "-",
                "running"
            ]
        );
    }

    #[test]
    fn listing_table_collects_human_size_map() {
        let mut first = workflow("a", "1", RunStatus::Finished);
        first.size = Some(reana_api::types::HumanSize {
            human_readable: "2 KiB".to_owned(),
            raw: 2048,
        });
        let (table, sizes) = build_workflow_table(&[first], true, false, true).expect("table");
        assert!(table.headers().contains(&"size".to_owned()));
        assert_eq!(sizes.get("2 KiB"), Some(&2048));
    }

    #[test]
    fn diff_sections_rename_workflow_to_specification() {
        let payload = DiffPayload {
            reana_specification: Some(serde_json::json!({
                "workflow": ["@@ -1 +1 @@", "- v0.1", "+ v0.2"],
                "inputs": [],
            })),
            workspace_listing: Some(serde_json::json!("only in workspace a: plot.png")),
        };
        let (sections, workspace) = diff_sections(&payload);
        let names: Vec<&str> = sections.iter().map(|(name, _)| name.as_str()).collect();
        assert!(names.contains(&"specification"));
        assert!(!names.contains(&"workflow"));
        let spec_lines = &sections
            .iter()
            .find(|(name, _)| name == "specification")
            .expect("section")
            .1;
        assert_eq!(spec_lines[1], "- v0.1");
        assert_eq!(workspace, ["only in workspace a: plot.png"]);
    }

    #[test]
    fn empty_diff_payload_has_no_sections() {
        let (sections, workspace) = diff_sections(&DiffPayload::default());
        assert!(sections.is_empty());
        assert!(workspace.is_empty());
    }
}
