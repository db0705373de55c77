//! Secret management commands.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use reana_api::ops::{AddSecretsBody, AddSecretsResponse, DeleteSecretsResponse, ListSecretsResponse};
use reana_api::types::{SecretType, SecretValue};

use crate::cli::{SecretsAddArgs, SecretsDeleteArgs, SecretsListArgs};
use crate::client::ReanaClient;
use crate::display::{self, Severity};
use crate::error::CliError;
use crate::table::Table;
use crate::validation;

/// Handler for the secrets-list command.
pub struct SecretsListCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> SecretsListCommand<'a> {
    /// Creates a new secrets-list command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the secrets-list command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        args: &SecretsListArgs,
    ) -> Result<(), CliError> {
        match self.client.list_secrets().await? {
            ListSecretsResponse::Ok(secrets) => {
                let mut table = Table::new(&["name", "type"]);
                for secret in secrets {
                    table.append_row(vec![
                        secret.name.into(),
                        secret.secret_type.to_string().into(),
                    ])?;
                }
                if args.json {
                    display::json(out, &table.to_json_rows())?;
                } else {
                    display::table(out, table.headers(), &table.to_rows())?;
                }
                Ok(())
            }
            ListSecretsResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            ListSecretsResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the secrets-add command.
pub struct SecretsAddCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> SecretsAddCommand<'a> {
    /// Creates a new secrets-add command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the secrets-add command.
    ///
    /// # Errors
    ///
    /// Returns error on malformed literals, unreadable files, or when any
    /// secret already exists and `--overwrite` was not given.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        args: &SecretsAddArgs,
    ) -> Result<(), CliError> {
        validation::at_least_one(&[("--env", !args.env.is_empty()), ("--file", !args.file.is_empty())])?;

        let secrets = build_secrets(&args.env, &args.file)?;
        let names: Vec<String> = secrets.keys().cloned().collect();

        match self.client.add_secrets(&secrets, args.overwrite).await? {
            AddSecretsResponse::Created(_) => {
                display::message(
                    out,
                    &format!("Secrets {} were successfully uploaded.", names.join(", ")),
                    Severity::Success,
                    false,
                )?;
                Ok(())
            }
            AddSecretsResponse::Conflict(existing) => Err(CliError::Server {
                status: 409,
                message: format!(
                    "Secrets {} already exist. No secrets were added.",
                    existing.join(", ")
                ),
            }),
            AddSecretsResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            AddSecretsResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Handler for the secrets-delete command.
pub struct SecretsDeleteCommand<'a> {
    client: &'a ReanaClient,
}

impl<'a> SecretsDeleteCommand<'a> {
    /// Creates a new secrets-delete command handler.
    #[must_use]
    pub const fn new(client: &'a ReanaClient) -> Self {
        Self { client }
    }

    /// Executes the secrets-delete command.
    ///
    /// # Errors
    ///
    /// Returns error when any named secret does not exist; nothing is
    /// deleted in that case.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        args: &SecretsDeleteArgs,
    ) -> Result<(), CliError> {
        match self.client.delete_secrets(&args.names).await? {
            DeleteSecretsResponse::Ok(deleted) => {
                display::message(
                    out,
                    &format!("Secrets {} were successfully deleted.", deleted.join(", ")),
                    Severity::Success,
                    false,
                )?;
                Ok(())
            }
            DeleteSecretsResponse::NotFound(missing) => Err(CliError::Server {
                status: 404,
                message: format!(
                    "Secrets {} do not exist. Nothing was deleted.",
                    missing.join(", ")
                ),
            }),
            DeleteSecretsResponse::Forbidden(msg) => Err(CliError::server(403, msg)),
            DeleteSecretsResponse::ServerError(msg) => Err(CliError::server(500, msg)),
        }
    }
}

/// Build the request body from `NAME=VALUE` literals and file paths.
fn build_secrets(env: &[String], files: &[std::path::PathBuf]) -> Result<AddSecretsBody, CliError> {
    let mut secrets = BTreeMap::new();

    for literal in env {
        let Some((name, value)) = literal.split_once('=') else {
            return Err(CliError::Validation(format!(
                "Option \"{literal}\" is invalid: for literal strings use \"SECRET_NAME=VALUE\" format"
            )));
        };
        secrets.insert(
            name.to_owned(),
            SecretValue { value: BASE64.encode(value), secret_type: SecretType::Env },
        );
    }

    for path in files {
        validation::readable_file(path)?;
        let content = std::fs::read(path)?;
        let name = basename(path)?;
        secrets.insert(
            name,
            SecretValue { value: BASE64.encode(content), secret_type: SecretType::File },
        );
    }

    Ok(secrets)
}

fn basename(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::Validation(format!("Cannot derive a secret name from {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn env_secret_is_base64_encoded() {
        let secrets = build_secrets(&["FOO=bar".to_owned()], &[]).expect("build");
        let secret = secrets.get("FOO").expect("present");
        assert_eq!(secret.value, BASE64.encode("bar"));
        assert_eq!(secret.secret_type, SecretType::Env);
    }

    #[test]
    fn env_secret_value_may_contain_equals() {
        let secrets = build_secrets(&["KEY=a=b".to_owned()], &[]).expect("build");
        assert_eq!(secrets.get("KEY").expect("present").value, BASE64.encode("a=b"));
    }

    #[test]
    fn malformed_env_secret_is_rejected() {
        let err = build_secrets(&["NOVALUE".to_owned()], &[]).expect_err("must fail");
        assert!(err.to_string().contains("SECRET_NAME=VALUE"));
    }

    #[test]
    fn file_secret_takes_the_basename_and_encodes_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pi.txt");
        let mut file = std::fs::File::create(&path).expect("create");
        write!(file, "3.14").expect("write");

        let secrets = build_secrets(&[], &[path]).expect("build");
        let secret = secrets.get("pi.txt").expect("present");
        assert_eq!(secret.value, BASE64.encode("3.14"));
        assert_eq!(secret.secret_type, SecretType::File);
    }

    #[test]
    fn missing_file_secret_is_rejected() {
        let err = build_secrets(&[], &["/no/such/file".into()]).expect_err("must fail");
        assert!(err.to_string().contains("does not exist"));
    }
}
