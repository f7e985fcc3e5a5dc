pub mod api;
pub mod models;
pub mod resolve;

pub use api::YouTubeClient;
pub use models::{Playlist, TrackRef};
pub use resolve::YtDlp;

/// Keyword search that only cares about the best hit.
pub trait TrackSearch {
    async fn search_top_match(&self, keywords: &str) -> anyhow::Result<Option<TrackRef>>;
}

/// Video-platform playlist enumeration.
pub trait VideoPlaylists {
    async fn playlist(&self, url: &str) -> anyhow::Result<Playlist>;
}
