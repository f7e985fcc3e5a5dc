/// A row scraped from an InnerTube list response.
#[derive(Debug, Clone)]
pub struct Track {
    pub video_id: String,
    pub title: String,
    pub artists: Vec<String>,
}

/// Something the fetcher can resolve: a watch URL or a bare video id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub locator: String,
    pub title: Option<String>,
}

impl TrackRef {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            locator: url.into(),
            title: None,
        }
    }
}

impl From<Track> for TrackRef {
    fn from(t: Track) -> Self {
        Self {
            locator: watch_url(&t.video_id),
            title: Some(t.title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Playlist {
    pub title: String,
    pub tracks: Vec<TrackRef>,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
