//! Client configuration resolution.
//!
//! Every key resolves as: explicit flag > environment variable > default.
//! The environment fallback is bound at the argument-parser level
//! (`REANA_SERVER_URL`, `REANA_ACCESS_TOKEN`, `REANA_WORKON`), so this
//! module only checks presence per command and normalizes values.

use crate::cli::Cli;
use crate::error::CliError;

const SERVER_URL_HELP: &str = "REANA client is not connected to any REANA cluster. Please set the REANA_SERVER_URL environment variable to the URL of the cluster you would like to connect to, for example https://reana.cern.ch/";

const ACCESS_TOKEN_HELP: &str = "Please provide your access token by using the -t/--access-token option, or by setting the REANA_ACCESS_TOKEN environment variable";

const WORKFLOW_HELP: &str = "Workflow name must be provided either with the -w/--workflow option or with the REANA_WORKON environment variable";

/// Resolved per-invocation connection context.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL, without a trailing slash.
    pub server_url: String,
    /// Access token of the current user.
    pub access_token: String,
    /// Whether to verify the server's TLS certificate.
    pub verify_tls: bool,
}

impl Context {
    /// Resolve server URL and access token from the parsed command line.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a required value is missing.
    pub fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let server_url = cli
            .server_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CliError::Config(SERVER_URL_HELP.into()))?
            .trim_end_matches('/')
            .to_owned();
        let access_token = cli
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| CliError::Config(ACCESS_TOKEN_HELP.into()))?
            .to_owned();
        Ok(Self { server_url, access_token, verify_tls: cli.verify_tls })
    }
}

/// Resolve the selected workflow reference for workflow-scoped commands.
///
/// # Errors
///
/// Returns a configuration error when neither the flag nor `REANA_WORKON`
/// provides a value.
pub fn resolve_workflow(cli: &Cli) -> Result<String, CliError> {
    cli.workflow
        .as_deref()
        .map(str::trim)
        .filter(|workflow| !workflow.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Config(WORKFLOW_HELP.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn context_trims_trailing_slash() {
        let cli = parse(&[
            "reana-client",
            "--server-url",
            "https://reana.example.org/",
            "-t",
            "secret",
            "ping",
        ]);
        let context = Context::resolve(&cli).expect("resolve");
        assert_eq!(context.server_url, "https://reana.example.org");
        assert_eq!(context.access_token, "secret");
        assert!(!context.verify_tls);
    }

    #[test]
    fn missing_server_url_is_a_configuration_error() {
        let mut cli = parse(&["reana-client", "-t", "secret", "ping"]);
        // The parser may have picked the URL up from the environment.
        cli.server_url = None;
        let err = Context::resolve(&cli).expect_err("must fail");
        assert!(err.to_string().contains("REANA_SERVER_URL"));
    }

    #[test]
    fn missing_access_token_is_a_configuration_error() {
        let mut cli = parse(&["reana-client", "--server-url", "https://r.example", "ping"]);
        cli.access_token = None;
        let err = Context::resolve(&cli).expect_err("must fail");
        assert!(err.to_string().contains("REANA_ACCESS_TOKEN"));
    }

    #[test]
    fn missing_workflow_is_a_configuration_error() {
        let mut cli = parse(&["reana-client", "status"]);
        cli.workflow = None;
        let err = resolve_workflow(&cli).expect_err("must fail");
        assert!(err.to_string().contains("REANA_WORKON"));
    }

    #[test]
    fn workflow_flag_wins() {
        let cli = parse(&["reana-client", "-w", "myanalysis.2", "status"]);
        assert_eq!(resolve_workflow(&cli).expect("resolve"), "myanalysis.2");
    }
}
