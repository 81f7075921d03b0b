//! Error types for the request pipeline.

use thiserror::Error;

/// Errors raised while dispatching a request or following its redirects.
///
/// None of these are retried by the pipeline.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network-level failure (DNS resolution, connection refused, TLS, stream reset).
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the configured timeout.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// A URL (request or `Location`) could not be parsed or has no host.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
    },

    /// The descriptor has neither a full URL nor a host and path.
    #[error("request has no target: host and path are required")]
    MissingTarget,

    /// The redirect chain exceeded the configured hop limit.
    #[error("too many redirects (limit {limit}) following {url}")]
    TooManyRedirects {
        /// The redirect target that would have exceeded the limit.
        url: String,
        /// Maximum number of hops allowed.
        limit: usize,
    },

    /// The underlying transport client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    BodyEncoding(#[from] serde_urlencoded::ser::Error),
}

impl HttpError {
    /// Classifies a reqwest error for `url` into a timeout or transport failure.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a redirect limit error.
    pub fn too_many_redirects(url: impl Into<String>, limit: usize) -> Self {
        Self::TooManyRedirects {
            url: url.into(),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_redirects_display_includes_limit_and_url() {
        let error = HttpError::too_many_redirects("https://sso.example.com/loop", 10);
        let msg = error.to_string();
        assert!(msg.contains("limit 10"), "got: {msg}");
        assert!(msg.contains("https://sso.example.com/loop"), "got: {msg}");
    }

    #[test]
    fn test_invalid_url_display() {
        let error = HttpError::invalid_url("not a url");
        assert_eq!(error.to_string(), "invalid URL: not a url");
    }
}
