//! SSO authentication for the monitoring portal.
//!
//! [`AuthSession`] wraps the [`crate::http`] pipeline with the challenge
//! protocol: request, detect an HTML login challenge, submit credentials,
//! follow the redirect chain back to the resource.

mod challenge;
mod error;
mod session;

pub use challenge::{CHALLENGE_ELEMENT_ID, LoginChallenge, extract_challenge};
pub use error::AuthError;
pub use session::{AuthSession, Credentials, LOGIN_TICKET_FIELD};
