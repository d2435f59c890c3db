use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

/// Everything that can go wrong while answering a query.
///
/// A query Wolfram Alpha has no answer for is not an error: the spoken
/// endpoint reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Failed to send request to Wolfram Alpha: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wolfram Alpha {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response did not have the shape we expected (e.g. no `pods`).
    #[error("Unexpected Wolfram Alpha response: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Failed to write cached image {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SolverError {
    pub(crate) fn status(endpoint: &'static str, status: u16, body: &str) -> Self {
        Self::Status {
            endpoint,
            status,
            body: truncate_body(body),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = SolverError::status("spoken", 500, &body);

        let msg = err.to_string();
        assert!(msg.contains("spoken request failed with status 500"));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(250);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), 203);
    }
}
