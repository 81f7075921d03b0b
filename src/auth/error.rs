//! Error taxonomy for authenticated fetches.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that end a [`fetch_authenticated`](super::AuthSession::fetch_authenticated) call.
///
/// None are retried by the session; a call either yields JSON or fails.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport, redirect-limit, or request-construction failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server returned neither JSON nor a recognizable login challenge.
    ///
    /// Usually means the portal contract changed, not that credentials are bad.
    #[error("no security information: {url} returned neither JSON nor a login challenge (HTTP {status})")]
    ChallengeAbsent {
        /// Final URL of the unexpected response.
        url: String,
        /// Its HTTP status code.
        status: u16,
    },

    /// The challenge element's text is not the expected JSON document.
    #[error("malformed login challenge: {source}")]
    MalformedChallenge {
        /// Decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The challenge's submit URL cannot be used as a request target.
    #[error("login challenge has an invalid submit URL: {url}")]
    InvalidChallengeUrl {
        /// The submit URL from the challenge.
        url: String,
    },

    /// After submitting credentials the server still did not return JSON.
    #[error("authentication failed: {url} did not return JSON after login (HTTP {status})")]
    AuthenticationFailed {
        /// Final URL reached after the login redirect chain.
        url: String,
        /// Its HTTP status code.
        status: u16,
    },

    /// The server declared JSON but the body does not parse.
    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        /// URL of the response.
        url: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
}

impl AuthError {
    /// Whether this failure happened below the session protocol (network, redirects).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
