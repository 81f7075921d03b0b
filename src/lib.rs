//! Portal Alerts Core Library
//!
//! This library fetches monitoring data from a supervision portal that sits
//! behind a browser-oriented single-sign-on flow. An unauthenticated request
//! yields an HTML login challenge instead of JSON; the session layer parses
//! the challenge, submits credentials, follows the redirect chain while
//! collecting cookies, and returns the JSON the portal finally serves.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`http`] - Cookie jar and redirect-following request pipeline
//! - [`auth`] - Login challenge parsing and the authenticated session
//! - [`alerts`] - Alerts-by-equipments query, payload types, and client
//! - [`config`] - Config file and environment loading

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alerts;
pub mod auth;
pub mod config;
pub mod http;
mod user_agent;

// Re-export commonly used types
pub use alerts::{AlertsByEquipment, AlertsError, AlertsQuery, Equipment, SupervisionClient};
pub use auth::{AuthError, AuthSession, Credentials, LoginChallenge, extract_challenge};
pub use http::{
    ClientSettings, CookieJar, HttpClient, HttpError, RequestBody, RequestDescriptor,
    ResponseRecord,
};
