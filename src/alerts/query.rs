//! Query builder for the alerts-by-equipments endpoint.

use url::Url;

/// Default supervision service origin.
pub const DEFAULT_SUPERVISION_URL: &str = "https://eu2-supppd-realtime.3dexperience.3ds.com";

/// Path of the alerts-by-equipments resource.
pub const ALERTS_BY_EQUIPMENTS_PATH: &str = "/supervision/api/v4/alerting/alertsbyequipments";

/// Filters for an alerts-by-equipments request.
///
/// Only set, non-empty parameters are serialized: `None`, an empty string and
/// a zero count or offset are all left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertsQuery {
    /// Equipment group identifier.
    pub group: Option<String>,
    /// Free-text search over equipment.
    pub search: Option<String>,
    /// Page size.
    pub count: Option<u32>,
    /// Page offset.
    pub offset: Option<u32>,
}

impl AlertsQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by equipment group.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Filters by search text.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the page offset.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds the resource URL on `base`, replacing its path and query.
    #[must_use]
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_path(ALERTS_BY_EQUIPMENTS_PATH);
        url.set_query(None);
        url.set_fragment(None);

        let text = |value: Option<&String>| value.filter(|value| !value.is_empty()).cloned();
        let number = |value: Option<u32>| {
            value
                .filter(|value| *value != 0)
                .map(|value| value.to_string())
        };
        let params: Vec<(&str, String)> = [
            ("group", text(self.group.as_ref())),
            ("search", text(self.search.as_ref())),
            ("count", number(self.count)),
            ("offset", number(self.offset)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }
}
