use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    /// Null for removed or local-only entries.
    pub track: Option<CatalogTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// One page of a playlist listing. `None` entries are unplayable items.
#[derive(Debug, Clone, Default)]
pub struct TrackPage {
    pub items: Vec<Option<CatalogTrack>>,
    pub total: u32,
}

impl From<TracksResponse> for TrackPage {
    fn from(r: TracksResponse) -> Self {
        Self {
            items: r.items.into_iter().map(|i| i.track).collect(),
            total: r.total,
        }
    }
}

/// Bearer token from the client-credentials grant. Held for one command.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_in: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
