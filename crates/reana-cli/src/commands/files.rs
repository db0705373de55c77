//! Workspace file management commands.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use reana_api::ops::{
    DeleteFileResponse, DownloadFileResponse, DownloadedFile, GetSpecificationResponse,
    ListFilesParams, ListFilesResponse, MoveFilesParams, MoveFilesResponse, UploadFileResponse,
};
use reana_api::types::{FileList, SpecificationIo, WorkflowSpecification};

use crate::cli::{DownloadArgs, LsArgs, MvArgs, RmArgs, UploadArgs};
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::format;
use crate::table::{Cell, Table};

/// Handler for the ls command.
pub struct LsCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> LsCommand<'a> {
    /// Creates a new ls command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the ls command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &LsArgs,
    ) -> Result<(), CliError> {
        let params = ListFilesParams {
            file_name: args.source.clone(),
            page: args.page,
            size: args.size,
            ..ListFilesParams::default()
        };
        let list = fetch_files(self.client, workflow, &params).await?;

        let (mut table, human_sizes) = build_file_table(
            self.client,
            workflow,
            &list,
            args.url,
            args.human_readable,
        )?;

        if let Some(sort) = &args.sort {
            let human_sizes = args.human_readable.then_some(&human_sizes);
            format::sort_table(out, &mut table, sort, !args.ascending, human_sizes)?;
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
}

async fn fetch_files(
    client: &ReanaClient,
    workflow: &str,
    params: &ListFilesParams,
) -> Result<FileList, CliError> {
    match client.list_files(workflow, params).await? {
        ListFilesResponse::Ok(list) => Ok(list),
        ListFilesResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
        ListFilesResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
        ListFilesResponse::NotFound(msg) => Err(CliError::server(404, msg)),
        ListFilesResponse::ServerError(msg) => Err(CliError::server(500, msg)),
    }
}

fn build_file_table(
    client: &ReanaClient,
    workflow: &str,
    list: &FileList,
    with_urls: bool,
    human_readable: bool,
) -> Result<(Table, HashMap<String, i64>), CliError> {
    let mut headers = vec!["name", "size", "last-modified"];
    if with_urls {
        headers.push("url");
    }

    let mut table = Table::new(&headers);
    let mut human_sizes = HashMap::new();

    for file in &list.items {
        let size_cell = match &file.size {
            Some(size) if human_readable => {
                human_sizes.insert(size.human_readable.clone(), size.raw);
                Cell::from(size.human_readable.clone())
            }
            Some(size) => Cell::from(size.raw),
            None => Cell::Null,
        };
        let mut row = vec![
            Cell::from(file.name.clone()),
            size_cell,
            Cell::from(file.last_modified.clone()),
        ];
        if with_urls {
            row.push(Cell::from(workspace_url(client, workflow, &file.name)));
        }
        table.append_row(row)?;
    }
    Ok((table, human_sizes))
}

fn workspace_url(client: &ReanaClient, workflow: &str, file_name: &str) -> String {
    format!("{}/api/workflows/{workflow}/workspace/{file_name}", client.base_url())
}

/// Emit the workspace file listing with download URLs; used by the start
/// follow loop once a workflow finishes.
pub async fn list_output_urls<W: Write>(
    client: &ReanaClient,
    out: &mut W,
    workflow: &str,
) -> Result<(), CliError> {
    let list = fetch_files(client, workflow, &ListFilesParams::default()).await?;
    let (table, _) = build_file_table(client, workflow, &list, true, false)?;
    display::table(out, table.headers(), &table.to_rows())?;
    Ok(())
}

/// Handler for the mv command.
pub struct MvCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> MvCommand<'a> {
    /// Creates a new mv command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the mv command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &MvArgs,
    ) -> Result<(), CliError> {
        let params = MoveFilesParams { source: args.source.clone(), target: args.target.clone() };
        match self.client.move_files(workflow, &params).await? {
            MoveFilesResponse::Ok(_) => {
                display::message(
                    out,
                    &format!("{} was successfully moved to {}", args.source, args.target),
                    Severity::Success,
                    false,
                )?;
                Ok(())
            }
            MoveFilesResponse::BadRequest(msg) => Err(CliError::server(400, msg)),
            MoveFilesResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            MoveFilesResponse::NotFound(msg) => Err(CliError::server(404, msg)),
            MoveFilesResponse::Conflict(msg) => Err(CliError::server(409, msg)),
            MoveFilesResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the rm command.
pub struct RmCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> RmCommand<'a> {
    /// Creates a new rm command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the rm command.
    ///
    /// Deletion proceeds target by target; a target that fails or matches
    /// nothing is reported and makes the overall exit status non-zero,
    /// while other targets still go through. Freed bytes are accumulated
    /// across all successful deletions.
    ///
    /// # Errors
    ///
    /// Returns a silent error after reporting per-target failures.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &RmArgs,
    ) -> Result<(), CliError> {
        let mut freed: i64 = 0;
        let mut failed = false;

        for source in &args.sources {
            match self.client.delete_file(workflow, source).await? {
                DeleteFileResponse::Ok(payload) => {
                    if payload.deleted.is_empty() && payload.failed.is_empty() {
                        failed = true;
                        display::message(
                            out,
                            &format!("{source} did not match any file."),
                            Severity::Error,
                            false,
                        )?;
                        continue;
                    }
                    for (path, deleted) in &payload.deleted {
                        freed += deleted.size;
                        display::message(
                            out,
                            &format!("File {path} was successfully deleted."),
                            Severity::Success,
                            false,
                        )?;
                    }
                    for (path, failure) in &payload.failed {
                        failed = true;
                        display::message(
                            out,
                            &format!("Something went wrong while deleting {path}: {}", failure.error),
                            Severity::Error,
                            false,
                        )?;
                    }
                }
                DeleteFileResponse::Forbidden(msg)
                | DeleteFileResponse::NotFound(msg)
                | DeleteFileResponse::ServerError(msg) => {
                    failed = true;
                    display::message(out, &msg.message, Severity::Error, false)?;
                }
            }
        }

        if freed > 0 {
            display::message(out, &format!("{freed} bytes freed up."), Severity::Info, false)?;
        }
        if failed { Err(CliError::Silent) } else { Ok(()) }
    }
}

/// Handler for the upload command.
pub struct UploadCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> UploadCommand<'a> {
    /// Creates a new upload command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the upload command.
    ///
    /// With no arguments the declared workflow inputs are uploaded; each
    /// declared path must match its classification (a declared file that
    /// is a local directory is rejected, and vice versa). Directories are
    /// walked recursively; symbolic links are skipped with a note and
    /// duplicate paths are uploaded once.
    ///
    /// # Errors
    ///
    /// Returns error on classification mismatches, unreadable paths, or
    /// failed requests.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &UploadArgs,
    ) -> Result<(), CliError> {
        let paths = if args.paths.is_empty() {
            let specification = fetch_specification(self.client, workflow).await?;
            declared_inputs(&specification)?
        } else {
            args.paths.clone()
        };

        if paths.is_empty() {
            display::message(
                out,
                "No files to upload: the workflow declares no inputs.",
                Severity::Info,
                false,
            )?;
            return Ok(());
        }

        let files = collect_upload_files(out, &paths)?;
        for file in files {
            let content = std::fs::read(&file)?;
            let name = workspace_path(&file);
            match self.client.upload_file(workflow, &name, content).await? {
                UploadFileResponse::Ok(_) => {
                    display::message(
                        out,
                        &format!("File {name} was successfully uploaded."),
                        Severity::Success,
                        false,
                    )?;
                }
                UploadFileResponse::BadRequest(msg) => return Err(CliError::server(400, msg)),
                UploadFileResponse::Forbidden(msg) => return Err(CliError::server(403, msg)),
                UploadFileResponse::NotFound(msg) => return Err(CliError::server(404, msg)),
                UploadFileResponse::ServerError(msg) => return Err(CliError::server(500, msg)),
            }
        }
        Ok(())
    }
}

async fn fetch_specification(
    client: &ReanaClient,
    workflow: &str,
) -> Result<WorkflowSpecification, CliError> {
    match client.get_specification(workflow).await? {
        GetSpecificationResponse::Ok(payload) => Ok(payload.specification),
        GetSpecificationResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
        GetSpecificationResponse::NotFound(msg) => Err(CliError::server(404, msg)),
        GetSpecificationResponse::ServerError(msg) => Err(CliError::server(500, msg)),
    }
}

/// Inputs declared by the specification, with each path checked against
/// its declared classification.
fn declared_inputs(specification: &WorkflowSpecification) -> Result<Vec<String>, CliError> {
    let empty = SpecificationIo::default();
    let inputs = specification.inputs.as_ref().unwrap_or(&empty);

    for file in &inputs.files {
        if Path::new(file).is_dir() {
            return Err(CliError::Validation(format!(
                "{file} is declared as a file in the workflow specification but is a directory"
            )));
        }
    }
    for directory in &inputs.directories {
        let path = Path::new(directory);
        if path.exists() && !path.is_dir() {
            return Err(CliError::Validation(format!(
                "{directory} is declared as a directory in the workflow specification but is a file"
            )));
        }
    }

    Ok(inputs.files.iter().chain(&inputs.directories).cloned().collect())
}

/// Expand files and directories into the deduplicated list of regular
/// files to upload. Symbolic links are skipped with a note.
fn collect_upload_files<W: Write>(out: &mut W, paths: &[String]) -> Result<Vec<PathBuf>, CliError> {
    let mut collected = BTreeSet::new();

    for raw in paths {
        let path = Path::new(raw);
        if !path.exists() {
            return Err(CliError::Validation(format!("File {raw} does not exist")));
        }
        if path.is_dir() {
            for entry in walkdir::WalkDir::new(path) {
                let entry = entry.map_err(|e| {
                    CliError::Validation(format!("Cannot traverse {raw}: {e}"))
                })?;
                if entry.path_is_symlink() {
                    display::message(
                        out,
                        &format!(
                            "Symbolic links are not supported, skipping {}",
                            entry.path().display()
                        ),
                        Severity::Info,
                        false,
                    )?;
                    continue;
                }
                if entry.file_type().is_file() {
                    collected.insert(entry.path().to_path_buf());
                }
            }
        } else if path.is_symlink() {
            display::message(
                out,
                &format!("Symbolic links are not supported, skipping {raw}"),
                Severity::Info,
                false,
            )?;
        } else {
            crate::validation::readable_file(path)?;
            collected.insert(path.to_path_buf());
        }
    }

    Ok(collected.into_iter().collect())
}

/// Workspace path of a local file: the local path without a leading `./`.
fn workspace_path(path: &Path) -> String {
    let rendered = path.display().to_string();
    rendered.strip_prefix("./").unwrap_or(&rendered).to_owned()
}

/// Handler for the download command.
pub struct DownloadCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> DownloadCommand<'a> {
    /// Creates a new download command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the download command.
    ///
    /// With no arguments the declared workflow outputs are downloaded.
    /// When the output target is `-` the content goes to stdout; a zip
    /// archive bundling several files is streamed entry by entry with no
    /// separators. Otherwise each file lands under the output directory
    /// with the server-supplied name.
    ///
    /// # Errors
    ///
    /// Returns a silent error after reporting per-file failures.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        workflow: &str,
        args: &DownloadArgs,
    ) -> Result<(), CliError> {
        let files = if args.files.is_empty() {
            let specification = fetch_specification(self.client, workflow).await?;
            let empty = SpecificationIo::default();
            let outputs = specification.outputs.as_ref().unwrap_or(&empty);
            outputs.files.iter().chain(&outputs.directories).cloned().collect()
        } else {
            args.files.clone()
        };

        if files.is_empty() {
            display::message(
                out,
                "No files to download: the workflow declares no outputs.",
                Severity::Info,
                false,
            )?;
            return Ok(());
        }

        let mut failed = false;
        for file in &files {
            match self.client.download_file(workflow, file).await? {
                DownloadFileResponse::Ok(downloaded) => {
                    self.deliver(out, file, downloaded, &args.output_directory)?;
                }
                DownloadFileResponse::Forbidden(msg) => {
                    failed = true;
                    display::message(out, &msg.message, Severity::Error, false)?;
                }
                DownloadFileResponse::NotFound(_) => {
                    failed = true;
                    display::message(
                        out,
                        &format!("{file} did not match any file."),
                        Severity::Error,
                        false,
                    )?;
                }
                DownloadFileResponse::ServerError(msg) => {
                    failed = true;
                    display::message(out, &msg.message, Severity::Error, false)?;
                }
            }
        }
        if failed { Err(CliError::Silent) } else { Ok(()) }
    }

    fn deliver<W: Write>(
        &self,
        out: &mut W,
        requested: &str,
        downloaded: DownloadedFile,
        output_directory: &str,
    ) -> Result<(), CliError> {
        if output_directory == "-" {
            if downloaded.zipped {
                stream_zip_entries(out, &downloaded.content)?;
            } else {
                out.write_all(&downloaded.content)?;
            }
            return Ok(());
        }

        let name = downloaded.name.as_deref().unwrap_or(requested);
        let destination = Path::new(output_directory).join(name);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destination, &downloaded.content)?;
        display::message(
            out,
            &format!("File {name} was successfully downloaded to {}.", destination.display()),
            Severity::Success,
            false,
        )?;
        Ok(())
    }
}

/// Stream the entries of an in-memory zip archive in order, with no
/// separators between entries.
fn stream_zip_entries<W: Write>(out: &mut W, content: &[u8]) -> Result<(), CliError> {
    let reader = std::io::Cursor::new(content);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| CliError::Format(format!("cannot read downloaded archive: {e}")))?;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| CliError::Format(format!("cannot read archive entry: {e}")))?;
        if entry.is_dir() {
            continue;
        }
        std::io::copy(&mut entry, out)?;
    }
    Ok(())
}
