//! Request pipeline over a fail-fast reqwest transport.
//!
//! `HttpClient` dispatches one request at a time, buffers the whole body,
//! records `Set-Cookie` tokens into the caller's [`CookieJar`], and can follow
//! `302` redirects itself. reqwest's own redirect policy and cookie store are
//! disabled so every hop passes through the jar.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument};
use url::Url;

use super::cookies::{CookieJar, set_cookie_values};
use super::error::HttpError;
use super::request::{RequestDescriptor, RequestTarget};
use super::response::ResponseRecord;
use crate::user_agent;

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of redirect hops followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Transport settings for [`HttpClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Maximum redirect hops before [`HttpError::TooManyRedirects`].
    pub max_redirects: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// HTTP client implementing the cookie-aware request pipeline.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_redirects: usize,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with default timeouts and redirect limit.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_settings(ClientSettings::default())
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientBuild`] if the underlying client cannot be built.
    pub fn with_settings(settings: ClientSettings) -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.read_timeout_secs))
            .user_agent(user_agent::default_user_agent())
            .redirect(Policy::none())
            .gzip(true)
            .build()
            .map_err(HttpError::ClientBuild)?;
        Ok(Self {
            client,
            max_redirects: settings.max_redirects,
        })
    }

    /// Maximum number of redirect hops this client follows.
    #[must_use]
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Issues exactly one request and buffers its response.
    ///
    /// Cookies in `jar` for the target host are sent, and `Set-Cookie`
    /// tokens from the response are recorded under the *request* host once
    /// the body has been fully read.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on an unresolvable target, body encoding
    /// failure, or any transport failure. Non-2xx statuses are not errors.
    #[instrument(level = "debug", skip_all, fields(method = %request.method()))]
    pub async fn dispatch(
        &self,
        request: RequestDescriptor,
        jar: Option<&mut CookieJar>,
    ) -> Result<ResponseRecord, HttpError> {
        let prepared = request.prepare(jar.as_deref())?;
        let url = prepared.target.url();
        info!(
            method = %prepared.method,
            host = %prepared.target.host,
            path = %prepared.target.path,
            "Making request"
        );

        let mut builder = self
            .client
            .request(prepared.method, &url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| HttpError::from_reqwest(&url, error))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = buffer_body(response, &url).await?;
        debug!(status = status.as_u16(), bytes = body.len(), "response buffered");

        if let Some(jar) = jar {
            jar.record(&prepared.target.host, set_cookie_values(&headers));
        }

        Ok(ResponseRecord {
            url,
            status,
            headers,
            body,
        })
    }

    /// Dispatches `request`, then follows `302` redirects if it opted in.
    ///
    /// Each hop is a bare GET to the `Location` target (resolved against the
    /// current URL) that shares `jar`; the original headers and body are not
    /// resent. A `302` without `Location` is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::TooManyRedirects`] once the hop limit is
    /// exceeded, [`HttpError::InvalidUrl`] for an unusable `Location`, and
    /// any error from [`dispatch`](Self::dispatch).
    pub async fn dispatch_following_redirects(
        &self,
        request: RequestDescriptor,
        mut jar: Option<&mut CookieJar>,
    ) -> Result<ResponseRecord, HttpError> {
        let follow = request.follows_redirects();
        let mut response = self.dispatch(request, jar.as_deref_mut()).await?;
        let mut hops = 0_usize;

        while follow && response.is_found_redirect() {
            let Some(location) = response.location() else {
                debug!(url = %response.url, "redirect without Location; returning as-is");
                break;
            };
            let next = resolve_location(&response.url, location)?;
            if hops >= self.max_redirects {
                return Err(HttpError::too_many_redirects(next.url(), self.max_redirects));
            }
            hops += 1;
            debug!(hop = hops, host = %next.host, path = %next.path, "following redirect");

            let redirect = RequestDescriptor::get(next.url()).follow_redirects(true);
            response = self.dispatch(redirect, jar.as_deref_mut()).await?;
        }

        Ok(response)
    }
}

fn resolve_location(current_url: &str, location: &str) -> Result<RequestTarget, HttpError> {
    Url::parse(current_url)
        .and_then(|base| base.join(location))
        .ok()
        .as_ref()
        .and_then(RequestTarget::from_parsed)
        .ok_or_else(|| HttpError::invalid_url(location))
}

async fn buffer_body(response: Response, url: &str) -> Result<String, HttpError> {
    let mut stream = response.bytes_stream();
    let mut buffer = Vec::new();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|error| HttpError::from_reqwest(url, error))?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.read_timeout_secs, 30);
        assert_eq!(settings.max_redirects, 10);
    }

    #[test]
    fn test_with_settings_keeps_redirect_limit() {
        let client = HttpClient::with_settings(ClientSettings {
            max_redirects: 3,
            ..ClientSettings::default()
        })
        .unwrap();
        assert_eq!(client.max_redirects(), 3);
    }

    #[test]
    fn test_resolve_absolute_location() {
        let target = resolve_location("https://portal/data", "https://h2/p2?x=1").unwrap();
        assert_eq!(target.host, "h2");
        assert_eq!(target.path, "/p2?x=1");
    }

    #[test]
    fn test_resolve_relative_location_against_current_url() {
        let target = resolve_location("http://127.0.0.1:9000/a/b", "/login?service=x").unwrap();
        assert_eq!(target.host, "127.0.0.1");
        assert_eq!(target.port, Some(9000));
        assert_eq!(target.path, "/login?service=x");
    }

    #[test]
    fn test_resolve_location_without_host_is_invalid() {
        let result = resolve_location("https://portal/data", "mailto:ops@example.com");
        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }
}
