//! Buffered response records.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION};

const JSON_MEDIA_TYPE: &str = "application/json";

/// A completed response whose body has been fully buffered.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    /// The URL that produced this response.
    pub url: String,
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers, including any `Location`, `Content-Type` and `Set-Cookie`.
    pub headers: HeaderMap,
    /// Body decoded as text (invalid UTF-8 is replaced).
    pub body: String,
}

impl ResponseRecord {
    /// The `Location` header, if present and valid text.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header_str(LOCATION)
    }

    /// The raw `Content-Type` header, if present and valid text.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(CONTENT_TYPE)
    }

    /// Whether the server declared a JSON payload.
    ///
    /// Only the media type is compared, case-insensitively; parameters such
    /// as `charset` are ignored. This accepts more than an exact
    /// `application/json` header match would.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|value| {
            value
                .split(';')
                .next()
                .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        })
    }

    /// Whether this is a `302 Found` redirect.
    #[must_use]
    pub fn is_found_redirect(&self) -> bool {
        self.status == StatusCode::FOUND
    }

    fn header_str(&self, name: reqwest::header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
