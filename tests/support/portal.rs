//! Fixtures imitating the supervision portal and its SSO server.

use wiremock::{Match, Request, ResponseTemplate};

/// Alerts resource path.
pub const DATA_PATH: &str = "/supervision/api/v4/alerting/alertsbyequipments";
/// SSO login form path.
pub const LOGIN_PATH: &str = "/3DPassport/login";
/// Portal callback that exchanges the SSO ticket for a session.
pub const CALLBACK_PATH: &str = "/react/callback";
/// Host every cookie is recorded under when talking to the mock server.
pub const MOCK_HOST: &str = "127.0.0.1";

/// Empty alerts page.
pub const EMPTY_PAGE: &str = r#"{"total":0,"count":0,"equipment":[],"position":0}"#;

/// HTML page embedding a login challenge.
pub fn challenge_page(submit_url: &str, ticket: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>3DEXPERIENCE ID</title></head>
<body>
<div id="root"></div>
<script id="configData" type="application/json">{{"url":"{submit_url}","lt":"{ticket}","browserLocale":"en","needsCaptcha":false}}</script>
</body>
</html>"#
    )
}

/// `200` JSON response.
pub fn json_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json")
}

/// `200` HTML response.
pub fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html;charset=UTF-8")
}

/// `302` redirect to `location`.
pub fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("location", location)
}

/// Matches requests whose `Cookie` header contains `token`.
pub struct CookieContains(pub &'static str);

impl Match for CookieContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get("cookie")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.split(';').any(|token| token.trim() == self.0))
    }
}

/// Matches requests without any `Cookie` header.
pub struct NoCookieHeader;

impl Match for NoCookieHeader {
    fn matches(&self, request: &Request) -> bool {
        request.headers.get("cookie").is_none()
    }
}
