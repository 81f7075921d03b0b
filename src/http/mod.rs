//! Cookie-aware HTTP request pipeline.
//!
//! This module provides the session transport used by [`crate::auth`]:
//!
//! - [`CookieJar`] - per-host `name=value` tokens collected from `Set-Cookie`
//! - [`RequestDescriptor`] - method, target, headers and body of one request
//! - [`HttpClient`] - dispatches descriptors, buffers bodies, follows `302`s
//!
//! # Example
//!
//! ```no_run
//! use portal_alerts_core::http::{CookieJar, HttpClient, RequestDescriptor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let mut jar = CookieJar::new();
//! let request = RequestDescriptor::get("https://portal.example.com/data").follow_redirects(true);
//! let response = client.dispatch_following_redirects(request, Some(&mut jar)).await?;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

mod client;
mod cookies;
mod error;
mod request;
mod response;

pub use client::{
    CONNECT_TIMEOUT_SECS, ClientSettings, DEFAULT_MAX_REDIRECTS, HttpClient, READ_TIMEOUT_SECS,
};
pub use cookies::{COOKIE_TOKEN_SEPARATOR, CookieJar, cookie_tokens};
pub use error::HttpError;
pub use request::{PreparedRequest, RequestBody, RequestDescriptor, RequestTarget};
pub use response::ResponseRecord;
