pub mod api;
pub mod models;

pub use api::SpotifyClient;
pub use models::{AccessToken, CatalogTrack, TrackPage};

use once_cell::sync::Lazy;
use regex::Regex;

static PLAYLIST_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://open\.spotify\.com/playlist/[a-zA-Z0-9?=_-]+$")
        .expect("valid playlist url regex")
});
static PLAYLIST_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"playlist/(\w+)").expect("valid playlist id regex"));

/// Streaming-service playlist listing behind a client-credentials token.
pub trait PlaylistCatalog {
    async fn authenticate(&self) -> anyhow::Result<AccessToken>;

    async fn tracks_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> anyhow::Result<TrackPage>;
}

/// Validates an `open.spotify.com/playlist/<id>` URL and returns the id.
pub fn playlist_id(url: &str) -> Option<&str> {
    if !PLAYLIST_URL.is_match(url) {
        return None;
    }
    PLAYLIST_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// "<track> <artist> <artist>..." as fed to the video search.
pub fn search_query(track: &CatalogTrack) -> String {
    std::iter::once(track.name.as_str())
        .chain(track.artists.iter().map(|a| a.name.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}
