//! Error types for the reana-api crate.

use thiserror::Error;

/// Errors that can occur while building requests or decoding responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Response payload could not be deserialized.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A path parameter was empty at substitution time.
    #[error("empty path parameter: {0}")]
    EmptyPathParameter(&'static str),

    /// The server answered with a status code the operation does not declare.
    #[error("unexpected response status {status}: {payload}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response payload, lossily decoded.
        payload: String,
    },
}

impl ApiError {
    /// Build an [`ApiError::UnexpectedStatus`] from raw response parts.
    #[must_use]
    pub fn unexpected(status: u16, body: &[u8]) -> Self {
        Self::UnexpectedStatus {
            status,
            payload: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_carries_payload() {
        let err = ApiError::unexpected(418, b"short and stout");
        assert_eq!(
            err.to_string(),
            "unexpected response status 418: short and stout"
        );
    }

    #[test]
    fn empty_path_parameter_display() {
        let err = ApiError::EmptyPathParameter("workflow_id_or_name");
        assert_eq!(
            err.to_string(),
            "empty path parameter: workflow_id_or_name"
        );
    }
}
