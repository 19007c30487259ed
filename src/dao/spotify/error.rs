//! Error types shared by the Spotify adapters.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`SpotifyError`] failures.
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Failures that can occur while talking to the Spotify Web API.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Spotify client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send Spotify request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Spotify answered with an unexpected status code.
    #[error("unexpected Spotify response status {status} for `{path}`: {body}")]
    RequestStatus {
        path: String,
        status: StatusCode,
        body: String,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode Spotify response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The configured Connect device is not visible to the account.
    #[error("Spotify device `{name}` not found")]
    DeviceNotFound { name: String },
    /// No bearer token is available to authorize the request.
    #[error("missing Spotify access token")]
    MissingToken,
}

impl SpotifyError {
    /// Whether Spotify reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SpotifyError::RequestStatus {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }
}
