//! Error handling for the cloud module

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the service on rejected requests.
#[derive(Serialize, Deserialize)]
struct RawError {
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum CloudError {
    /// Response body did not match the declared shape.
    #[error("Decoding error: {source} (body: {body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// A server-assigned identifier was empty or absent.
    #[error("Missing identifier: {0}")]
    MissingIdentifier(&'static str),
}

impl CloudError {
    pub async fn from_response(response: reqwest::Response) -> CloudError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        CloudError::Http { status, message }
    }

    /// HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn to_pretty(&self) -> Option<String> {
        match self {
            Self::Http { message: msg, .. } => {
                let parsed = serde_json::from_str::<RawError>(msg).ok()?;
                serde_json::to_string_pretty(&parsed).ok()
            }
            _ => None,
        }
    }
}
