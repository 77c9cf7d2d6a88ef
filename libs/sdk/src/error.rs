//! SDK error types.

use photon_api::{ApiError, Task};
use thiserror::Error;

/// Errors surfaced by the controller client.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The controller answered with an error status.
    ///
    /// When the error body embeds a (possibly partial) task, it is kept here
    /// so callers can still extract step errors from it.
    #[error("API error ({status}): {}", describe_errors(.errors))]
    Api {
        status: u16,
        errors: Vec<ApiError>,
        task: Option<Task>,
    },

    /// The request never produced a controller response.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid auth token")]
    InvalidToken,

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ApiClientError {
    pub fn api(status: u16, errors: Vec<ApiError>, task: Option<Task>) -> Self {
        Self::Api {
            status,
            errors,
            task,
        }
    }

    /// The partially-returned task attached to an API error, if any.
    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Api { task, .. } => task.as_ref(),
            _ => None,
        }
    }

    /// Structured errors attached to an API error.
    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            Self::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn describe_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
