//! Connection and cluster-information commands.

use std::io::Write;

use reana_api::ops::{InfoResponse, PingResponse};

use crate::cli::InfoArgs;
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;

/// Handler for the ping command.
pub struct PingCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> PingCommand<'a> {
    /// Creates a new ping command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the ping command.
    ///
    /// # Errors
    ///
    /// Returns error if the server cannot be reached or answers 5xx.
    pub async fn execute<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        match self.client.ping().await? {
            PingResponse::Ok(payload) => {
                writeln!(out, "REANA server: {}", self.client.base_url())?;
                writeln!(
                    out,
                    "REANA server version: {}",
                    payload.reana_server_version.as_deref().unwrap_or("-")
                )?;
                writeln!(out, "REANA client version: {}", env!("CARGO_PKG_VERSION"))?;
                writeln!(
                    out,
                    "Authenticated as: {}",
                    payload.email.as_deref().unwrap_or("-")
                )?;
                display::message(out, "Connected", Severity::Success, false)?;
                Ok(())
            }
            PingResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the info command.
pub struct InfoCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> InfoCommand<'a> {
    /// Creates a new info command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the info command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(&self, out: &mut W, args: &InfoArgs) -> Result<(), CliError> {
        match self.client.info().await? {
            InfoResponse::Ok(payload) => {
                if args.json {
                    display::json(out, &payload)?;
                    return Ok(());
                }
                for item in payload.values() {
                    writeln!(out, "{}: {}", item.title, render_value(&item.value))?;
                }
                Ok(())
            }
            InfoResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_owned(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_values_render_bare() {
        assert_eq!(render_value(&serde_json::json!("kubernetes")), "kubernetes");
        assert_eq!(render_value(&serde_json::json!(7)), "7");
        assert_eq!(render_value(&serde_json::json!(null)), "-");
    }

    #[test]
    fn list_values_render_comma_separated() {
        assert_eq!(
            render_value(&serde_json::json!(["kubernetes", "htcondor", "slurm"])),
            "kubernetes, htcondor, slurm"
        );
    }
}
