//! Typed supervision API client on top of [`AuthSession`].

use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use super::query::AlertsQuery;
use super::types::AlertsByEquipment;
use crate::auth::{AuthError, AuthSession, Credentials};
use crate::http::RequestDescriptor;

/// Errors from the supervision client.
#[derive(Debug, Error)]
pub enum AlertsError {
    /// Fetching the payload failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The payload is JSON but not an alerts page.
    #[error("unexpected alerts payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The configured base URL is unusable.
    #[error("invalid supervision base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Client for the supervision alerting API.
#[derive(Debug)]
pub struct SupervisionClient {
    session: AuthSession,
    base_url: Url,
}

impl SupervisionClient {
    /// Creates a client for the supervision service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertsError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL with a host.
    pub fn new(session: AuthSession, base_url: &str) -> Result<Self, AlertsError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(Url::has_host)
            .ok_or_else(|| AlertsError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self { session, base_url })
    }

    /// The supervision service origin.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The authenticated session.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Switches identity; the next fetch logs in again.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.session.set_credentials(credentials);
    }

    /// Fetches one alerts page as untyped JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AlertsError::Auth`] when the authenticated fetch fails.
    #[instrument(skip(self))]
    pub async fn alerts_by_equipments_raw(
        &mut self,
        query: &AlertsQuery,
    ) -> Result<Value, AlertsError> {
        let url = query.to_url(&self.base_url);
        info!("Getting alerts");
        let payload = self
            .session
            .fetch_authenticated(RequestDescriptor::get(url.as_str()))
            .await?;
        Ok(payload)
    }

    /// Fetches one alerts page and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`AlertsError::Auth`] when the fetch fails and
    /// [`AlertsError::Decode`] when the JSON is not an alerts page.
    pub async fn alerts_by_equipments(
        &mut self,
        query: &AlertsQuery,
    ) -> Result<AlertsByEquipment, AlertsError> {
        let payload = self.alerts_by_equipments_raw(query).await?;
        let page: AlertsByEquipment =
            serde_json::from_value(payload).map_err(AlertsError::Decode)?;
        info!(
            total = page.total,
            equipment = page.equipment.len(),
            alerts = page.alert_count(),
            "Received alerts"
        );
        Ok(page)
    }
}
