use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the Snyk API.
///
/// Every client operation reports through this one type so callers can branch
/// on a failed check without inspecting message text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to fetch {resource}: HTTP {status}: {body}")]
    Status {
        resource: String,
        status: StatusCode,
        body: String,
    },

    #[error("request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response for {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
