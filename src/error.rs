//! Error types shared by every pipeline stage.
//!
//! Only [`NewsError::MissingCredential`] is fatal to a run. Every other
//! variant is produced by a fallible primitive (`search_news`, `ask`,
//! `download`, ...) and absorbed by the degrading operation that wraps it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("missing required API key: set the {var} environment variable")]
    MissingCredential { var: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("language model returned no text")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message_names_variable() {
        let err = NewsError::MissingCredential {
            var: "SERPAPI_API_KEY",
        };
        assert!(err.to_string().contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn test_status_error_message() {
        let err = NewsError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API returned status 503: unavailable");
    }
}
