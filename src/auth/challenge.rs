//! Login challenge extraction from SSO HTML pages.
//!
//! A challenge page embeds its login form descriptor as JSON text inside a
//! single element with a stable id.

use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::debug;

use super::error::AuthError;

/// Id of the element carrying the challenge JSON.
pub const CHALLENGE_ELEMENT_ID: &str = "configData";

/// Login form descriptor embedded in a challenge page.
///
/// Only `url` and `lt` drive the login; the rest is informational.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    /// Login form submission target.
    pub url: String,
    /// One-time login ticket bound to this challenge.
    pub lt: String,
    /// Service the SSO server will redirect back to.
    pub service_name: Option<String>,
    /// Locale detected by the SSO server.
    pub browser_locale: Option<String>,
    /// Whether the server requires a captcha (login will likely fail if so).
    pub needs_captcha: Option<bool>,
    /// Captcha provider type.
    pub captcha_type: Option<String>,
    /// Whether the "remember me" option is offered.
    pub authorize_remember_me: Option<bool>,
    /// Endpoint that issues fresh login tickets.
    pub login_ticket_url: Option<String>,
    /// Cookie domain used by the SSO server.
    pub cookie_domain: Option<String>,
    /// Error messages shown on the login page (e.g. after a rejected login).
    #[serde(default)]
    pub error_msgs: Vec<String>,
    /// Informational messages shown on the login page.
    #[serde(default)]
    pub notification_msgs: Vec<String>,
}

/// Extracts the login challenge from an HTML document.
///
/// Returns `Ok(None)` when the document has no challenge element or the
/// element is empty.
///
/// # Errors
///
/// Returns [`AuthError::MalformedChallenge`] when the element's text is not
/// a JSON challenge descriptor.
pub fn extract_challenge(html: &str) -> Result<Option<LoginChallenge>, AuthError> {
    let document = Html::parse_document(html);
    let Some(element) = find_element_by_id(&document, CHALLENGE_ELEMENT_ID) else {
        debug!("no challenge element in document");
        return Ok(None);
    };

    let raw: String = element.text().collect();
    let raw = raw.trim();
    if raw.is_empty() {
        debug!("challenge element is empty");
        return Ok(None);
    }

    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| AuthError::MalformedChallenge { source })
}

fn find_element_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().id() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge_page(config: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>3DPassport</title></head>
<body>
<div id="app"></div>
<script id="configData" type="application/json">{config}</script>
</body>
</html>"#
        )
    }

    #[test]
    fn test_extract_challenge_reads_url_and_ticket() {
        let html = challenge_page(r#"{"url":"https://sso/login","lt":"TICKET1"}"#);
        let challenge = extract_challenge(&html).unwrap().unwrap();

        assert_eq!(challenge.url, "https://sso/login");
        assert_eq!(challenge.lt, "TICKET1");
        assert!(challenge.error_msgs.is_empty());
        assert_eq!(challenge.needs_captcha, None);
    }

    #[test]
    fn test_extract_challenge_keeps_informational_fields() {
        let html = challenge_page(
            r#"{
                "url": "https://iam.example.com/3DPassport/login?service=x",
                "lt": "LT-42-abc",
                "browserLocale": "en",
                "needsCaptcha": false,
                "serviceName": "supervision",
                "errorMsgs": ["Invalid credentials"],
                "i18nConfig": {"defaultLanguage": "en", "supportedLanguages": ["en", "fr"]},
                "availableSN": {"twitter": ""}
            }"#,
        );
        let challenge = extract_challenge(&html).unwrap().unwrap();

        assert_eq!(challenge.browser_locale.as_deref(), Some("en"));
        assert_eq!(challenge.needs_captcha, Some(false));
        assert_eq!(challenge.service_name.as_deref(), Some("supervision"));
        assert_eq!(challenge.error_msgs, ["Invalid credentials"]);
    }

    #[test]
    fn test_extract_challenge_from_non_script_element() {
        let html = r#"<html><body><div id="configData">{"url":"https://sso/login","lt":"T"}</div></body></html>"#;
        let challenge = extract_challenge(html).unwrap().unwrap();
        assert_eq!(challenge.lt, "T");
    }

    #[test]
    fn test_extract_challenge_absent_element() {
        let html = "<html><body><h1>Service unavailable</h1></body></html>";
        assert!(extract_challenge(html).unwrap().is_none());
    }

    #[test]
    fn test_extract_challenge_empty_element_is_absent() {
        let html = challenge_page("   ");
        assert!(extract_challenge(&html).unwrap().is_none());
    }

    #[test]
    fn test_extract_challenge_non_json_is_malformed() {
        let html = challenge_page("window.config = {};");
        let result = extract_challenge(&html);
        assert!(
            matches!(result, Err(AuthError::MalformedChallenge { .. })),
            "expected MalformedChallenge, got {result:?}"
        );
    }

    #[test]
    fn test_extract_challenge_missing_ticket_is_malformed() {
        let html = challenge_page(r#"{"url":"https://sso/login"}"#);
        assert!(matches!(
            extract_challenge(&html),
            Err(AuthError::MalformedChallenge { .. })
        ));
    }

    #[test]
    fn test_extract_challenge_plain_text_body_is_absent() {
        assert!(extract_challenge("upstream timed out").unwrap().is_none());
    }
}
