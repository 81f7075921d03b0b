//! Request descriptors and their normalization into a dispatchable request.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;
use url::Url;

use super::cookies::CookieJar;
use super::error::HttpError;

const DEFAULT_SCHEME: &str = "https";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// URL-encoded form fields, sent in insertion order.
    Form(Vec<(String, String)>),
    /// Pre-encoded bytes with an optional content type.
    Raw {
        /// Value for the `Content-Type` header, if any.
        content_type: Option<String>,
        /// Body bytes.
        bytes: Vec<u8>,
    },
}

impl RequestBody {
    /// Builds a form body from name/value pairs.
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Encodes the body and returns the headers the encoding requires.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::BodyEncoding`] if form fields cannot be encoded.
    pub fn encode(&self) -> Result<(HeaderMap, Vec<u8>), HttpError> {
        let mut headers = HeaderMap::new();
        match self {
            Self::Form(fields) => {
                let encoded = serde_urlencoded::to_string(fields)?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                Ok((headers, encoded.into_bytes()))
            }
            Self::Raw {
                content_type,
                bytes,
            } => {
                if let Some(content_type) = content_type {
                    match HeaderValue::from_str(content_type) {
                        Ok(value) => {
                            headers.insert(CONTENT_TYPE, value);
                        }
                        Err(_) => warn!(%content_type, "dropping invalid content type"),
                    }
                }
                Ok((headers, bytes.clone()))
            }
        }
    }
}

/// A fully resolved request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// URL scheme (`https` unless set otherwise).
    pub scheme: String,
    /// Host name without port; cookies are keyed by this.
    pub host: String,
    /// Explicit port, if any.
    pub port: Option<u16>,
    /// Path including any query string, always starting with `/`.
    pub path: String,
}

impl RequestTarget {
    /// Splits a URL into scheme, host, port and path-with-query.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the URL does not parse or has no host.
    pub fn from_url(raw: &str) -> Result<Self, HttpError> {
        let url = Url::parse(raw).map_err(|_| HttpError::invalid_url(raw))?;
        Self::from_parsed(&url).ok_or_else(|| HttpError::invalid_url(raw))
    }

    /// Splits an already parsed URL; `None` when it has no host.
    #[must_use]
    pub fn from_parsed(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        Some(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port: url.port(),
            path,
        })
    }

    /// Renders the target back into an absolute URL string.
    #[must_use]
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}{}", self.scheme, self.host, self.path),
            None => format!("{}://{}{}", self.scheme, self.host, self.path),
        }
    }
}

/// Description of a single HTTP request before dispatch.
///
/// Either a full `url` or both `host` and `path` must be set. When `url` is
/// set it wins over any explicit host, path, scheme or port.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Option<String>,
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    headers: HeaderMap,
    body: Option<RequestBody>,
    follow_redirects: bool,
}

impl RequestDescriptor {
    /// Creates an empty descriptor for `method`.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            url: None,
            scheme: DEFAULT_SCHEME.to_string(),
            host: None,
            port: None,
            path: None,
            headers: HeaderMap::new(),
            body: None,
            follow_redirects: false,
        }
    }

    /// Creates a GET descriptor for a full URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET).with_url(url)
    }

    /// Creates a POST descriptor for a full URL.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST).with_url(url)
    }

    /// Sets the convenience full URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the target host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the target path (including any query string).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the URL scheme used with an explicit host and path.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets an explicit port used with an explicit host and path.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Adds a request header, replacing any previous value for `name`.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a request body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Opts in to (or out of) following `302` redirects.
    #[must_use]
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Whether `302` redirects are followed.
    #[must_use]
    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// Caller-supplied headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to caller-supplied headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Resolves the target: the full URL if present, else host and path.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] for an unparseable full URL and
    /// [`HttpError::MissingTarget`] when host or path is absent.
    pub fn target(&self) -> Result<RequestTarget, HttpError> {
        if let Some(url) = &self.url {
            return RequestTarget::from_url(url);
        }
        let (Some(host), Some(path)) = (&self.host, &self.path) else {
            return Err(HttpError::MissingTarget);
        };
        let path = if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        };
        Ok(RequestTarget {
            scheme: self.scheme.clone(),
            host: host.clone(),
            port: self.port,
            path,
        })
    }

    /// Normalizes the descriptor into a dispatchable request.
    ///
    /// The jar's tokens for the target host are appended to any caller-set
    /// `Cookie` value by plain concatenation (no separator between the two).
    /// Headers produced by the body encoder replace caller headers of the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved or the body cannot
    /// be encoded.
    pub fn prepare(self, jar: Option<&CookieJar>) -> Result<PreparedRequest, HttpError> {
        let target = self.target()?;
        let mut headers = self.headers;

        if let Some(jar_cookies) = jar.and_then(|jar| jar.header_value_for(&target.host)) {
            let mut combined = headers
                .get(COOKIE)
                .map(|existing| String::from_utf8_lossy(existing.as_bytes()).into_owned())
                .unwrap_or_default();
            combined.push_str(&jar_cookies);
            match HeaderValue::from_str(&combined) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(_) => warn!(host = %target.host, "skipping unencodable cookie header"),
            }
        }

        let body = match &self.body {
            Some(body) => {
                let (body_headers, bytes) = body.encode()?;
                for (name, value) in &body_headers {
                    headers.insert(name.clone(), value.clone());
                }
                Some(bytes)
            }
            None => None,
        };

        Ok(PreparedRequest {
            method: self.method,
            target,
            headers,
            body,
            follow_redirects: self.follow_redirects,
        })
    }
}

/// A normalized request ready for the transport.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Resolved target.
    pub target: RequestTarget,
    /// Final headers, including `Cookie` and body headers.
    pub headers: HeaderMap,
    /// Encoded body bytes.
    pub body: Option<Vec<u8>>,
    /// Whether `302` redirects are followed.
    pub follow_redirects: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_split_into_host_and_path_with_query() {
        let target = RequestDescriptor::get("https://h/p?q=1").target().unwrap();
        assert_eq!(target.host, "h");
        assert_eq!(target.path, "/p?q=1");
        assert_eq!(target.scheme, "https");
        assert_eq!(target.port, None);
    }

    #[test]
    fn test_url_keeps_nested_service_query() {
        let url = "https://eu1-dsi-iam.3dexperience.3ds.com/3DPassport/login?service=https://eu2-supppd-realtime.3dexperience.3ds.com/react/";
        let target = RequestDescriptor::get(url).target().unwrap();
        assert_eq!(target.host, "eu1-dsi-iam.3dexperience.3ds.com");
        assert_eq!(
            target.path,
            "/3DPassport/login?service=https://eu2-supppd-realtime.3dexperience.3ds.com/react/"
        );
    }

    #[test]
    fn test_url_overrides_explicit_host_and_path() {
        let target = RequestDescriptor::new(Method::GET)
            .with_host("ignored.example.com")
            .with_path("/ignored")
            .with_url("http://127.0.0.1:8081/real")
            .target()
            .unwrap();
        assert_eq!(target.host, "127.0.0.1");
        assert_eq!(target.port, Some(8081));
        assert_eq!(target.path, "/real");
        assert_eq!(target.url(), "http://127.0.0.1:8081/real");
    }

    #[test]
    fn test_host_and_path_without_url() {
        let target = RequestDescriptor::new(Method::GET)
            .with_host("portal.example.com")
            .with_path("api/data")
            .target()
            .unwrap();
        assert_eq!(target.url(), "https://portal.example.com/api/data");
    }

    #[test]
    fn test_missing_host_is_rejected() {
        let result = RequestDescriptor::new(Method::GET).with_path("/x").target();
        assert!(matches!(result, Err(HttpError::MissingTarget)));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = RequestDescriptor::get("not a url").target();
        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }

    #[test]
    fn test_prepare_builds_cookie_header_from_jar() {
        let mut jar = CookieJar::new();
        jar.record("h", ["A=1", "B=2"]);

        let prepared = RequestDescriptor::get("https://h/p")
            .prepare(Some(&jar))
            .unwrap();
        assert_eq!(prepared.headers.get(COOKIE).unwrap(), "A=1;B=2");
    }

    #[test]
    fn test_prepare_concatenates_existing_cookie_header_without_separator() {
        let mut jar = CookieJar::new();
        jar.record("h", ["A=1", "B=2"]);

        let prepared = RequestDescriptor::get("https://h/p")
            .with_header(COOKIE, HeaderValue::from_static("Z=9"))
            .prepare(Some(&jar))
            .unwrap();
        assert_eq!(prepared.headers.get(COOKIE).unwrap(), "Z=9A=1;B=2");
    }

    #[test]
    fn test_prepare_without_matching_host_leaves_cookie_untouched() {
        let mut jar = CookieJar::new();
        jar.record("other", ["A=1"]);

        let prepared = RequestDescriptor::get("https://h/p")
            .prepare(Some(&jar))
            .unwrap();
        assert!(prepared.headers.get(COOKIE).is_none());
    }

    #[test]
    fn test_prepare_form_body_sets_content_type_over_caller_value() {
        let prepared = RequestDescriptor::post("https://sso/login")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_body(RequestBody::form([
                ("lt", "TICKET1"),
                ("username", "user"),
                ("password", "p&ss word"),
            ]))
            .prepare(None)
            .unwrap();

        assert_eq!(
            prepared.headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            prepared.body.as_deref(),
            Some(b"lt=TICKET1&username=user&password=p%26ss+word".as_slice())
        );
    }

    #[test]
    fn test_prepare_raw_body_without_content_type_keeps_caller_header() {
        let prepared = RequestDescriptor::post("https://h/upload")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .with_body(RequestBody::Raw {
                content_type: None,
                bytes: vec![1, 2, 3],
            })
            .prepare(None)
            .unwrap();

        assert_eq!(
            prepared.headers.get(CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        assert_eq!(prepared.body, Some(vec![1, 2, 3]));
    }
}
