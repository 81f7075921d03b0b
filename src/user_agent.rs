//! Shared User-Agent string for portal requests.

/// Product token sent in every User-Agent.
const PRODUCT: &str = "portal-alerts";

/// Default User-Agent for every request made by the pipeline.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (supervision-monitor)")
}
