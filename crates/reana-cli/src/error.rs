//! CLI error types.

use thiserror::Error;

use reana_api::types::ServerMessage;

/// CLI-specific errors. Every variant maps to exit code 1 at the root.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed command-line input.
    #[error("{0}")]
    Usage(String),

    /// Input rejected by a client-side validator.
    #[error("{0}")]
    Validation(String),

    /// The server could not be reached.
    #[error("'{host}' not found, please verify the provided server URL or check your internet connection")]
    Connection {
        /// Host part of the server URL.
        host: String,
    },

    /// Typed 4xx answer from the server.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message.
        message: String,
    },

    /// 5xx answer from the server.
    #[error("Error while querying: {payload}")]
    ServerInternal {
        /// Server-supplied payload.
        payload: String,
    },

    /// Output formatting failed.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request building or response decoding failed.
    #[error(transparent)]
    Api(#[from] reana_api::ApiError),

    /// The command already printed the complete error; carry only the
    /// non-zero exit status.
    #[error("command failed")]
    Silent,
}

impl CliError {
    /// Build the error for a typed server answer: 5xx becomes
    /// [`CliError::ServerInternal`], anything else surfaces the server's
    /// message verbatim.
    #[must_use]
    pub fn server(status: u16, message: ServerMessage) -> Self {
        if status >= 500 {
            Self::ServerInternal { payload: message.message }
        } else {
            Self::Server { status, message: message.message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_names_the_host() {
        let err = CliError::Connection { host: "reana.example.org".into() };
        assert_eq!(
            err.to_string(),
            "'reana.example.org' not found, please verify the provided server URL or check your internet connection"
        );
    }

    #[test]
    fn server_error_surfaces_message_verbatim() {
        let err = CliError::server(
            404,
            ServerMessage { message: "REANA_WORKON is not set".into() },
        );
        assert_eq!(err.to_string(), "REANA_WORKON is not set");
    }

    #[test]
    fn internal_server_error_wraps_payload() {
        let err = CliError::server(500, ServerMessage { message: "boom".into() });
        assert_eq!(err.to_string(), "Error while querying: boom");
    }
}
