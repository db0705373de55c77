//! REANA client binary entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use reana_cli::cli::{Cli, Commands, LogLevel, ProfileMode};
use reana_cli::client::ReanaClient;
use reana_cli::commands::{
    CloseCommand, CreateCommand, DeleteCommand, DiffCommand, DownloadCommand, InfoCommand,
    ListCommand, LogsCommand, LsCommand, MvCommand, OpenCommand, PingCommand, PruneCommand,
    QuotaShowCommand, RestartCommand, RetentionRulesListCommand, RmCommand, SecretsAddCommand,
    SecretsDeleteCommand, SecretsListCommand, ShareAddCommand, ShareRemoveCommand,
    ShareStatusCommand, StartCommand, StatusCommand, StopCommand, UploadCommand,
};
use reana_cli::config::{self, Context};
use reana_cli::display::{self, Severity};
use reana_cli::error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(level_filter(cli.loglevel))
        .with_writer(io::stderr)
        .init();

    debug!(
        server_url = ?cli.server_url,
        workflow = ?cli.workflow,
        has_access_token = cli.access_token.is_some(),
        loglevel = ?cli.loglevel,
        verify_tls = cli.verify_tls,
        "resolved command-line options"
    );

    let profiler = start_profiler(cli.profile);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(&cli));
    write_profile(profiler);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Silent) => ExitCode::FAILURE,
        Err(e) => {
            let mut stderr = io::stderr().lock();
            let _ = display::message(&mut stderr, &e.to_string(), Severity::Error, false);
            ExitCode::FAILURE
        }
    }
}

const fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warning => LevelFilter::WARN,
    }
}

fn start_profiler(mode: ProfileMode) -> Option<pprof::ProfilerGuard<'static>> {
    match mode {
        ProfileMode::None => None,
        ProfileMode::Heap => {
            let mut stderr = io::stderr().lock();
            let _ = display::message(
                &mut stderr,
                "Heap profiling is not supported, running unprofiled.",
                Severity::Warning,
                false,
            );
            None
        }
        ProfileMode::Cpu => match pprof::ProfilerGuardBuilder::default().frequency(99).build() {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to start the CPU profiler: {e}");
                None
            }
        },
    }
}

fn write_profile(profiler: Option<pprof::ProfilerGuard<'static>>) {
    use pprof::protos::Message as _;

    let Some(guard) = profiler else { return };
    let report = match guard.report().build() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed to build the CPU profile: {e}");
            return;
        }
    };
    let profile = match report.pprof() {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("Failed to encode the CPU profile: {e}");
            return;
        }
    };
    let mut content = Vec::new();
    if let Err(e) = profile.write_to_vec(&mut content) {
        eprintln!("Failed to encode the CPU profile: {e}");
        return;
    }
    if let Err(e) = std::fs::write("profile-cpu.pprof", &content) {
        eprintln!("Failed to write profile-cpu.pprof: {e}");
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    // Commands that never touch the server.
    match &cli.command {
        Commands::Version => {
            writeln!(stdout, "{}", env!("CARGO_PKG_VERSION"))?;
            return Ok(());
        }
        Commands::Completion { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_owned();
            clap_complete::generate(*shell, &mut command, name, &mut stdout);
            return Ok(());
        }
        _ => {}
    }

    let context = Context::resolve(cli)?;
    let client = ReanaClient::new(&context)?;
    let workflow = if cli.command.needs_workflow() {
        Some(config::resolve_workflow(cli)?)
    } else {
        None
    };
    // Guarded by needs_workflow above.
    let workflow = workflow.as_deref().unwrap_or_default();

    match &cli.command {
        Commands::Ping => PingCommand::new(&client).execute(&mut stdout).await,
        Commands::Info(args) => InfoCommand::new(&client).execute(&mut stdout, args).await,
        Commands::QuotaShow(args) => {
            QuotaShowCommand::new(&client).execute(&mut stdout, args).await
        }
        Commands::Create(args) => CreateCommand::new(&client).execute(&mut stdout, args).await,
        Commands::List(args) => ListCommand::new(&client).execute(&mut stdout, args).await,
        Commands::Delete(args) => {
            DeleteCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Diff(args) => DiffCommand::new(&client).execute(&mut stdout, args).await,
        Commands::Start(args) => {
            StartCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Restart(args) => {
            RestartCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Stop => StopCommand::new(&client).execute(&mut stdout, workflow).await,
        Commands::Status(args) => {
            StatusCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Logs(args) => {
            LogsCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::ShareAdd(args) => {
            ShareAddCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::ShareRemove(args) => {
            ShareRemoveCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::ShareStatus(args) => {
            ShareStatusCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Open(args) => {
            OpenCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Close => CloseCommand::new(&client).execute(&mut stdout, workflow).await,
        Commands::Ls(args) => LsCommand::new(&client).execute(&mut stdout, workflow, args).await,
        Commands::Mv(args) => MvCommand::new(&client).execute(&mut stdout, workflow, args).await,
        Commands::Rm(args) => RmCommand::new(&client).execute(&mut stdout, workflow, args).await,
        Commands::Upload(args) => {
            UploadCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Download(args) => {
            DownloadCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::Prune(args) => {
            PruneCommand::new(&client).execute(&mut stdout, workflow, args).await
        }
        Commands::RetentionRulesList(args) => {
            RetentionRulesListCommand::new(&client)
                .execute(&mut stdout, workflow, args)
                .await
        }
        Commands::SecretsAdd(args) => {
            SecretsAddCommand::new(&client).execute(&mut stdout, args).await
        }
        Commands::SecretsList(args) => {
            SecretsListCommand::new(&client).execute(&mut stdout, args).await
        }
        Commands::SecretsDelete(args) => {
            SecretsDeleteCommand::new(&client).execute(&mut stdout, args).await
        }
        Commands::Version | Commands::Completion { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_maps_loglevels() {
        assert_eq!(level_filter(LogLevel::Debug), LevelFilter::DEBUG);
        assert_eq!(level_filter(LogLevel::Info), LevelFilter::INFO);
        assert_eq!(level_filter(LogLevel::Warning), LevelFilter::WARN);
    }

    #[tokio::test]
    async fn run_version_prints_without_server() {
        let cli = Cli::parse_from(["reana-client", "version"]);
        assert!(run(&cli).await.is_ok());
    }

    #[tokio::test]
    async fn run_ping_without_configuration_fails() {
        let mut cli = Cli::parse_from(["reana-client", "ping"]);
        cli.server_url = None;
        cli.access_token = None;
        let result = run(&cli).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[tokio::test]
    async fn run_status_without_workflow_fails() {
        let mut cli = Cli::parse_from([
            "reana-client",
            "--server-url",
            "https://localhost:30443",
            "-t",
            "token",
            "status",
        ]);
        cli.workflow = None;
        let result = run(&cli).await;
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
