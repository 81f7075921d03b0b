//! Per-host session cookie store.
//!
//! Tokens are kept exactly as the server sent them (`name=value`, attributes
//! stripped) and replayed verbatim. There is no expiry, path, or domain
//! matching: a token recorded for a host is sent to that host until the jar
//! is reset.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::debug;

/// Separator used when joining tokens into a `Cookie` header value.
pub const COOKIE_TOKEN_SEPARATOR: &str = ";";

/// In-memory cookie tokens grouped by request host.
///
/// Token order is first-seen order and duplicates are dropped. Two tokens
/// with the same cookie name but different values are both kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    hosts: HashMap<String, Vec<String>>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records raw `Set-Cookie` header values for `host`.
    ///
    /// Each value is truncated at its first `;`. Malformed values are stored
    /// as whatever the truncation yields. Recording an empty iterator leaves
    /// the jar untouched (no empty host entry is created).
    pub fn record<I, S>(&mut self, host: &str, raw_set_cookie_headers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0_usize;
        for raw in raw_set_cookie_headers {
            let token = strip_cookie_attributes(raw.as_ref());
            let tokens = self.hosts.entry(host.to_string()).or_default();
            if !tokens.iter().any(|existing| existing == token) {
                tokens.push(token.to_string());
                added += 1;
            }
        }
        if added > 0 {
            debug!(host, added, "recorded session cookies");
        }
    }

    /// Returns the tokens recorded for `host` in first-seen order.
    #[must_use]
    pub fn tokens_for(&self, host: &str) -> &[String] {
        self.hosts.get(host).map_or(&[], Vec::as_slice)
    }

    /// Builds the jar's `Cookie` header value for `host`, if it has tokens.
    #[must_use]
    pub fn header_value_for(&self, host: &str) -> Option<String> {
        let tokens = self.tokens_for(host);
        if tokens.is_empty() {
            None
        } else {
            Some(tokens.join(COOKIE_TOKEN_SEPARATOR))
        }
    }

    /// Drops every recorded token for every host.
    pub fn reset(&mut self) {
        self.hosts.clear();
    }

    /// Returns `true` when no host has any token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Iterates over hosts that have at least one token.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// Total number of tokens across all hosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.values().map(Vec::len).sum()
    }
}

// Token values are session secrets; only show shape.
impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (host, tokens) in &self.hosts {
            map.entry(host, &format_args!("[{} REDACTED]", tokens.len()));
        }
        map.finish()
    }
}

/// Extracts stripped `name=value` tokens from a response's `Set-Cookie` headers.
#[must_use]
pub fn cookie_tokens(headers: &HeaderMap) -> Vec<String> {
    set_cookie_values(headers)
        .map(|raw| strip_cookie_attributes(&raw).to_string())
        .collect()
}

/// Raw `Set-Cookie` header values, lossily decoded.
pub(crate) fn set_cookie_values(headers: &HeaderMap) -> impl Iterator<Item = String> + '_ {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn strip_cookie_attributes(raw: &str) -> &str {
    raw.split(';').next().unwrap_or_default()
}
