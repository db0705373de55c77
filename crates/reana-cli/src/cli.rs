//! Command-line argument parsing with clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

const COMMAND_GROUPS: &str = "\
Command groups:
  Configuration:              ping, info, version, completion
  Workflow management:        create, list, delete, diff
  Workflow execution:         start, restart, stop, status, logs
  Workflow sharing:           share-add, share-remove, share-status
  Workspace interactive:      open, close
  Workspace file management:  ls, mv, rm, upload, download
  Workspace file retention:   prune, retention-rules-list
  Secret management:          secrets-add, secrets-list, secrets-delete
  Quota:                      quota-show";

/// REANA command-line client.
#[derive(Parser, Debug, Clone)]
#[command(name = "reana-client")]
#[command(version, about = "REANA client for remote workflow execution", after_help = COMMAND_GROUPS)]
pub struct Cli {
    /// URL of the REANA server.
    #[arg(long, global = true, env = "REANA_SERVER_URL", value_name = "URL")]
    pub server_url: Option<String>,

    /// Access token of the current user.
    #[arg(short = 't', long, global = true, env = "REANA_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Name or UUID of the workflow, optionally with a run number
    /// (`myanalysis.42`).
    #[arg(short = 'w', long, global = true, env = "REANA_WORKON", value_name = "WORKFLOW")]
    pub workflow: Option<String>,

    /// Log verbosity.
    #[arg(short = 'l', long, global = true, value_enum, default_value_t = LogLevel::Warning)]
    pub loglevel: LogLevel,

    /// Execution profiling mode; writes `profile-<mode>.pprof` in the
    /// current directory.
    #[arg(long, global = true, value_enum, default_value_t = ProfileMode::None)]
    pub profile: ProfileMode,

    /// Verify the server's TLS certificate. Disabled by default because
    /// REANA clusters commonly run with self-signed certificates.
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log verbosity options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    /// Everything, including effective flag values.
    Debug,
    /// Informational messages.
    Info,
    /// Warnings and errors only.
    Warning,
}

/// Profiling mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileMode {
    /// No profiling.
    None,
    /// Sample the CPU and write a pprof profile on exit.
    Cpu,
    /// Heap profiling; not supported by this build and ignored with a
    /// warning.
    Heap,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check connection to the REANA server.
    Ping,

    /// Display cluster configuration values.
    Info(InfoArgs),

    /// Show client version.
    Version,

    /// Generate a shell completion script on stdout.
    Completion {
        /// Shell to generate the script for.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show user quota usage.
    QuotaShow(QuotaShowArgs),

    /// Create a new workflow from a specification file.
    Create(CreateArgs),

    /// List workflows.
    List(ListArgs),

    /// Delete a workflow.
    Delete(DeleteArgs),

    /// Show differences between two workflows.
    Diff(DiffArgs),

    /// Start previously created workflow.
    Start(StartArgs),

    /// Restart previously run workflow.
    Restart(RestartArgs),

    /// Stop a running workflow.
    Stop,

    /// Show workflow status.
    Status(StatusArgs),

    /// Show workflow logs.
    Logs(LogsArgs),

    /// Share the workflow with other users.
    ShareAdd(ShareAddArgs),

    /// Revoke access to the workflow from other users.
    ShareRemove(ShareRemoveArgs),

    /// Show with whom the workflow is shared.
    ShareStatus(ShareStatusArgs),

    /// Open an interactive session inside the workspace.
    Open(OpenArgs),

    /// Close the workspace's interactive session.
    Close,

    /// List workspace files.
    Ls(LsArgs),

    /// Move files within the workspace.
    Mv(MvArgs),

    /// Delete files from the workspace.
    Rm(RmArgs),

    /// Upload files and directories to the workspace.
    Upload(UploadArgs),

    /// Download workspace files.
    Download(DownloadArgs),

    /// Prune the workspace, removing intermediate files.
    Prune(PruneArgs),

    /// List the retention rules of the workspace.
    RetentionRulesList(RetentionRulesArgs),

    /// Add secrets from literals or files.
    SecretsAdd(SecretsAddArgs),

    /// List user secrets.
    SecretsList(SecretsListArgs),

    /// Delete user secrets.
    SecretsDelete(SecretsDeleteArgs),
}

impl Commands {
    /// Whether the command talks to the server at all.
    #[must_use]
    pub const fn needs_server(&self) -> bool {
        !matches!(self, Self::Version | Self::Completion { .. })
    }

    /// Whether the command addresses one specific workflow.
    #[must_use]
    pub const fn needs_workflow(&self) -> bool {
        matches!(
            self,
            Self::Delete(_)
                | Self::Start(_)
                | Self::Restart(_)
                | Self::Stop
                | Self::Status(_)
                | Self::Logs(_)
                | Self::ShareAdd(_)
                | Self::ShareRemove(_)
                | Self::ShareStatus(_)
                | Self::Open(_)
                | Self::Close
                | Self::Ls(_)
                | Self::Mv(_)
                | Self::Rm(_)
                | Self::Upload(_)
                | Self::Download(_)
                | Self::Prune(_)
                | Self::RetentionRulesList(_)
        )
    }
}

/// Arguments for the info command.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the quota-show command.
#[derive(Args, Debug, Clone)]
pub struct QuotaShowArgs {
    /// Show only this resource.
    #[arg(long, value_name = "RESOURCE")]
    pub resource: Option<String>,

    /// Report only one metric instead of the usage summary.
    #[arg(long, value_enum)]
    pub report: Option<QuotaReport>,
}

/// Quota metric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuotaReport {
    /// Configured limit.
    Limit,
    /// Current usage.
    Usage,
}

impl QuotaReport {
    /// Metric name inside the quota payload.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Usage => "usage",
        }
    }
}

/// Arguments for the create command.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Name of the workflow to create.
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: String,

    /// Path of the workflow specification file.
    #[arg(short = 'f', long = "file", value_name = "FILE", default_value = "reana.yaml")]
    pub file: std::path::PathBuf,
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filters in `key=value` form; repeatable. Available keys: name,
    /// status.
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filter: Vec<String>,

    /// Columns to display, comma separated; `column=value` keeps only
    /// matching rows.
    #[arg(long, value_name = "COLUMNS")]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Include deleted workflows in the listing.
    #[arg(long)]
    pub show_deleted_runs: bool,

    /// Column to sort by.
    #[arg(long, value_name = "COLUMN", default_value = "created")]
    pub sort: String,

    /// Sort ascending instead of descending.
    #[arg(long)]
    pub ascending: bool,

    /// Include the workspace size column.
    #[arg(long)]
    pub include_workspace_size: bool,

    /// Include the duration column.
    #[arg(long)]
    pub include_duration: bool,

    /// Show sizes in human-readable form.
    #[arg(short = 'r', long)]
    pub human_readable: bool,

    /// Page number.
    #[arg(long)]
    pub page: Option<i64>,

    /// Page size.
    #[arg(long)]
    pub size: Option<i64>,
}

/// Arguments for the delete command.
#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Delete all runs that share the workflow's name.
    #[arg(long)]
    pub include_all_runs: bool,

    /// Also delete the workspace.
    #[arg(long)]
    pub include_workspace: bool,
}

/// Arguments for the diff command.
#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// First workflow to compare.
    pub workflow_a: String,

    /// Second workflow to compare.
    pub workflow_b: String,

    /// Compare only the specifications, not the workspaces.
    #[arg(long)]
    pub brief: bool,

    /// Unified-diff context lines.
    #[arg(short = 'u', long, value_name = "LINES")]
    pub context_lines: Option<i64>,
}

/// Arguments for the start command.
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Input parameters in `key=value` form; repeatable.
    #[arg(short = 'p', long = "parameter", value_name = "KEY=VALUE")]
    pub parameters: Vec<String>,

    /// Operational options in `key=value` form; repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Follow the execution until it reaches a terminal status.
    #[arg(long)]
    pub follow: bool,

    /// Seconds between status polls while following.
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub check_interval: i64,
}

/// Arguments for the restart command.
#[derive(Args, Debug, Clone)]
pub struct RestartArgs {
    /// Input parameters in `key=value` form; repeatable.
    #[arg(short = 'p', long = "parameter", value_name = "KEY=VALUE")]
    pub parameters: Vec<String>,

    /// Operational options in `key=value` form; repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

/// Arguments for the status command.
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Columns to display, comma separated. Column selection only.
    #[arg(long, value_name = "COLUMNS")]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also show workflow id, owner, and current command.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Arguments for the logs command.
#[derive(Args, Debug, Clone)]
pub struct LogsArgs {
    /// Filters in `key=value` form; repeatable. Available keys:
    /// compute_backend, docker_img, status, step.
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filter: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Keep polling for new logs until the workflow finishes.
    #[arg(long)]
    pub follow: bool,

    /// Seconds between polls while following.
    #[arg(short = 'i', long, value_name = "SECONDS", default_value_t = 10)]
    pub interval: i64,
}

/// Arguments for the share-add command.
#[derive(Args, Debug, Clone)]
pub struct ShareAddArgs {
    /// Users to share the workflow with; repeatable.
    #[arg(short = 'u', long = "user", value_name = "EMAIL", required = true)]
    pub users: Vec<String>,

    /// Message shown to the users.
    #[arg(long)]
    pub message: Option<String>,

    /// Date until which the share is valid (`YYYY-MM-DD`).
    #[arg(long, value_name = "DATE")]
    pub valid_until: Option<String>,
}

/// Arguments for the share-remove command.
#[derive(Args, Debug, Clone)]
pub struct ShareRemoveArgs {
    /// Users to revoke access from; repeatable.
    #[arg(short = 'u', long = "user", value_name = "EMAIL", required = true)]
    pub users: Vec<String>,
}

/// Arguments for the share-status command.
#[derive(Args, Debug, Clone)]
pub struct ShareStatusArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the open command.
#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Type of the interactive session.
    #[arg(default_value = "jupyter")]
    pub session_type: String,

    /// Container image to run the session with.
    #[arg(short = 'i', long, value_name = "IMAGE")]
    pub image: Option<String>,
}

/// Arguments for the ls command.
#[derive(Args, Debug, Clone)]
pub struct LsArgs {
    /// Glob restricting the listing.
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Columns to display, comma separated; `column=value` keeps only
    /// matching rows.
    #[arg(long, value_name = "COLUMNS")]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show full download URLs instead of workspace paths.
    #[arg(long)]
    pub url: bool,

    /// Show sizes in human-readable form.
    #[arg(short = 'r', long)]
    pub human_readable: bool,

    /// Column to sort by.
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort ascending instead of descending.
    #[arg(long)]
    pub ascending: bool,

    /// Page number.
    #[arg(long)]
    pub page: Option<i64>,

    /// Page size.
    #[arg(long)]
    pub size: Option<i64>,
}

/// Arguments for the mv command.
#[derive(Args, Debug, Clone)]
pub struct MvArgs {
    /// Path to move from.
    pub source: String,

    /// Path to move to.
    pub target: String,
}

/// Arguments for the rm command.
#[derive(Args, Debug, Clone)]
pub struct RmArgs {
    /// Workspace paths or globs to delete.
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<String>,
}

/// Arguments for the upload command.
#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Files or directories to upload; defaults to the inputs declared in
    /// the workflow specification.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

/// Arguments for the download command.
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Workspace files to download; defaults to the outputs declared in
    /// the workflow specification.
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Directory to download into, or `-` for stdout.
    #[arg(short = 'o', long, value_name = "PATH", default_value = ".")]
    pub output_directory: String,
}

/// Arguments for the prune command.
#[derive(Args, Debug, Clone)]
pub struct PruneArgs {
    /// Also delete declared input files.
    #[arg(long)]
    pub include_inputs: bool,

    /// Also delete declared output files.
    #[arg(long)]
    pub include_outputs: bool,
}

/// Arguments for the retention-rules-list command.
#[derive(Args, Debug, Clone)]
pub struct RetentionRulesArgs {
    /// Columns to display, comma separated; `column=value` keeps only
    /// matching rows.
    #[arg(long, value_name = "COLUMNS")]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the secrets-add command.
#[derive(Args, Debug, Clone)]
pub struct SecretsAddArgs {
    /// Literal secrets in `NAME=VALUE` form; repeatable.
    #[arg(long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,

    /// File secrets, named by the file's basename; repeatable.
    #[arg(long = "file", value_name = "PATH")]
    pub file: Vec<std::path::PathBuf>,

    /// Overwrite secrets that already exist.
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the secrets-list command.
#[derive(Args, Debug, Clone)]
pub struct SecretsListArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the secrets-delete command.
#[derive(Args, Debug, Clone)]
pub struct SecretsDeleteArgs {
    /// Names of the secrets to delete.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_ping() {
        let cli = Cli::parse_from(["reana-client", "ping"]);
        assert!(matches!(cli.command, Commands::Ping));
    }

    #[test]
    fn cli_parses_global_workflow_flag_after_subcommand() {
        let cli = Cli::parse_from(["reana-client", "status", "-w", "myanalysis.3"]);
        assert_eq!(cli.workflow.as_deref(), Some("myanalysis.3"));
    }

    #[test]
    fn cli_parses_list_filters_and_format() {
        let cli = Cli::parse_from([
            "reana-client",
            "list",
            "--filter",
            "status=running",
            "--filter",
            "name=test",
            "--format",
            "name,status",
        ]);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.filter, ["status=running", "name=test"]);
                assert_eq!(args.format.as_deref(), Some("name,status"));
                assert_eq!(args.sort, "created");
                assert!(!args.json);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_kebab_case_command_names() {
        let cli = Cli::parse_from(["reana-client", "retention-rules-list"]);
        assert!(matches!(cli.command, Commands::RetentionRulesList(_)));
        let cli = Cli::parse_from(["reana-client", "quota-show"]);
        assert!(matches!(cli.command, Commands::QuotaShow(_)));
    }

    #[test]
    fn cli_parses_uppercase_loglevel() {
        let cli = Cli::parse_from(["reana-client", "-l", "DEBUG", "ping"]);
        assert_eq!(cli.loglevel, LogLevel::Debug);
        assert!(Cli::try_parse_from(["reana-client", "-l", "debug", "ping"]).is_err());
    }

    #[test]
    fn cli_parses_secrets_add_arguments() {
        let cli = Cli::parse_from([
            "reana-client",
            "secrets-add",
            "--env",
            "FOO=bar",
            "--file",
            "./pi.txt",
            "--overwrite",
        ]);
        match cli.command {
            Commands::SecretsAdd(args) => {
                assert_eq!(args.env, ["FOO=bar"]);
                assert_eq!(args.file.len(), 1);
                assert!(args.overwrite);
            }
            other => panic!("expected secrets-add, got {other:?}"),
        }
    }

    #[test]
    fn cli_requires_rm_sources() {
        assert!(Cli::try_parse_from(["reana-client", "rm"]).is_err());
    }

    #[test]
    fn cli_parses_download_stdout_target() {
        let cli = Cli::parse_from(["reana-client", "download", "plot.png", "-o", "-"]);
        match cli.command {
            Commands::Download(args) => {
                assert_eq!(args.files, ["plot.png"]);
                assert_eq!(args.output_directory, "-");
            }
            other => panic!("expected download, got {other:?}"),
        }
    }

    #[test]
    fn cli_logs_interval_default() {
        let cli = Cli::parse_from(["reana-client", "logs", "--follow"]);
        match cli.command {
            Commands::Logs(args) => {
                assert!(args.follow);
                assert_eq!(args.interval, 10);
            }
            other => panic!("expected logs, got {other:?}"),
        }
    }

    #[test]
    fn workflow_scoped_commands_are_flagged() {
        let cli = Cli::parse_from(["reana-client", "status"]);
        assert!(cli.command.needs_workflow());
        let cli = Cli::parse_from(["reana-client", "list"]);
        assert!(!cli.command.needs_workflow());
        let cli = Cli::parse_from(["reana-client", "version"]);
        assert!(!cli.command.needs_server());
    }
}
