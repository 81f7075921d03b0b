//! Authenticated session over the SSO challenge protocol.
//!
//! One [`AuthSession`] serves one logical actor. `fetch_authenticated` takes
//! `&mut self`, so a session can never have two fetches in flight.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::challenge::{LoginChallenge, extract_challenge};
use super::error::AuthError;
use crate::http::{
    CookieJar, HttpClient, RequestBody, RequestDescriptor, RequestTarget, ResponseRecord,
};

/// Login form field carrying the challenge ticket.
pub const LOGIN_TICKET_FIELD: &str = "lt";

/// Username and password submitted to the SSO login form.
///
/// The password is redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password. Avoid logging the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Session owning credentials and the cookie jar that carries SSO state.
#[derive(Debug)]
pub struct AuthSession {
    client: HttpClient,
    credentials: Credentials,
    cookies: CookieJar,
}

impl AuthSession {
    /// Creates a session with an empty cookie jar.
    #[must_use]
    pub fn new(client: HttpClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            cookies: CookieJar::new(),
        }
    }

    /// The current credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Switches identity: replaces the credentials and discards all cookies.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        info!(username = %credentials.username(), "session identity changed; cookies cleared");
        self.credentials = credentials;
        self.cookies.reset();
    }

    /// Cookies accumulated so far.
    #[must_use]
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }

    /// The underlying request pipeline.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetches `request` as JSON, logging in through the SSO challenge if needed.
    ///
    /// The request always follows redirects and uses this session's jar. A
    /// JSON response returns immediately. Anything else must be a challenge
    /// page; its ticket and the credentials are posted to the challenge URL
    /// and that redirect chain must end in JSON.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Http`] for transport failures or too many redirects
    /// - [`AuthError::ChallengeAbsent`] when the first response is neither JSON nor a challenge
    /// - [`AuthError::MalformedChallenge`] / [`AuthError::InvalidChallengeUrl`] for a broken challenge
    /// - [`AuthError::AuthenticationFailed`] when login does not end in JSON
    /// - [`AuthError::InvalidJson`] when a JSON-typed body does not parse
    #[instrument(skip_all, fields(username = %self.credentials.username()))]
    pub async fn fetch_authenticated(
        &mut self,
        request: RequestDescriptor,
    ) -> Result<Value, AuthError> {
        let response = self
            .client
            .dispatch_following_redirects(request.follow_redirects(true), Some(&mut self.cookies))
            .await?;
        if response.is_json() {
            debug!(url = %response.url, "session already authenticated");
            return parse_json(&response);
        }

        let Some(challenge) = extract_challenge(&response.body)? else {
            warn!(
                url = %response.url,
                status = response.status.as_u16(),
                content_type = response.content_type().unwrap_or("<none>"),
                "response is neither JSON nor a login challenge"
            );
            return Err(AuthError::ChallengeAbsent {
                url: response.url,
                status: response.status.as_u16(),
            });
        };
        if challenge.needs_captcha == Some(true) {
            warn!("login challenge requests a captcha; login will likely fail");
        }

        let login = self.login_request(&challenge)?;
        info!("login challenge received; submitting credentials");
        let response = self
            .client
            .dispatch_following_redirects(login, Some(&mut self.cookies))
            .await?;
        if response.is_json() {
            info!(
                hosts = self.cookies.hosts().count(),
                cookies = self.cookies.len(),
                "authenticated"
            );
            return parse_json(&response);
        }

        warn!(
            url = %response.url,
            status = response.status.as_u16(),
            "login did not return JSON"
        );
        Err(AuthError::AuthenticationFailed {
            url: response.url,
            status: response.status.as_u16(),
        })
    }

    fn login_request(&self, challenge: &LoginChallenge) -> Result<RequestDescriptor, AuthError> {
        let target =
            RequestTarget::from_url(&challenge.url).map_err(|_| AuthError::InvalidChallengeUrl {
                url: challenge.url.clone(),
            })?;
        debug!(host = %target.host, path = %target.path, "login target");

        Ok(RequestDescriptor::post(target.url())
            .with_body(RequestBody::form([
                (LOGIN_TICKET_FIELD, challenge.lt.as_str()),
                ("username", self.credentials.username()),
                ("password", self.credentials.password()),
            ]))
            .follow_redirects(true))
    }
}

fn parse_json(response: &ResponseRecord) -> Result<Value, AuthError> {
    serde_json::from_str(&response.body).map_err(|source| AuthError::InvalidJson {
        url: response.url.clone(),
        source,
    })
}
