//! In-memory collaborators shared by the dispatcher and pipeline tests.

use crate::fetcher::{TrackFetch, TrackOutcome};
use crate::spotify::models::Artist;
use crate::spotify::{AccessToken, CatalogTrack, PlaylistCatalog, TrackPage};
use crate::youtube::{Playlist, TrackRef, TrackSearch, VideoPlaylists};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Ordered log of every collaborator call.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

pub struct FakeSearch {
    calls: Calls,
    no_results: Vec<String>,
}

impl FakeSearch {
    pub fn new(calls: &Calls) -> Self {
        Self {
            calls: calls.clone(),
            no_results: Vec::new(),
        }
    }

    pub fn with_no_results(mut self, keywords: &str) -> Self {
        self.no_results.push(keywords.to_string());
        self
    }
}

impl TrackSearch for FakeSearch {
    async fn search_top_match(&self, keywords: &str) -> anyhow::Result<Option<TrackRef>> {
        self.calls.push(format!("search:{keywords}"));
        if self.no_results.iter().any(|k| k == keywords) {
            return Ok(None);
        }
        Ok(Some(TrackRef {
            locator: format!("yt:{keywords}"),
            title: Some(keywords.to_string()),
        }))
    }
}

pub struct FakeFetch {
    calls: Calls,
    failing: Vec<String>,
}

impl FakeFetch {
    pub fn new(calls: &Calls) -> Self {
        Self {
            calls: calls.clone(),
            failing: Vec::new(),
        }
    }

    pub fn failing(mut self, locator: &str) -> Self {
        self.failing.push(locator.to_string());
        self
    }
}

impl TrackFetch for FakeFetch {
    async fn fetch(&self, track: &TrackRef) -> TrackOutcome {
        self.calls.push(format!("fetch:{}", track.locator));
        if self.failing.contains(&track.locator) {
            TrackOutcome::Failed("stream reset".to_string())
        } else {
            TrackOutcome::Downloaded(PathBuf::from(&track.locator))
        }
    }
}

pub struct FakePlaylists {
    calls: Calls,
    tracks: Vec<TrackRef>,
}

impl FakePlaylists {
    pub fn new(calls: &Calls, locators: &[&str]) -> Self {
        Self {
            calls: calls.clone(),
            tracks: locators.iter().map(|l| TrackRef::from_url(*l)).collect(),
        }
    }
}

impl VideoPlaylists for FakePlaylists {
    async fn playlist(&self, url: &str) -> anyhow::Result<Playlist> {
        self.calls.push(format!("playlist:{url}"));
        Ok(Playlist {
            title: "Fake playlist".to_string(),
            tracks: self.tracks.clone(),
        })
    }
}

pub struct FakeCatalog {
    calls: Calls,
    tracks: Vec<CatalogTrack>,
    fail_auth: bool,
}

impl FakeCatalog {
    pub fn new(calls: &Calls, tracks: Vec<CatalogTrack>) -> Self {
        Self {
            calls: calls.clone(),
            tracks,
            fail_auth: false,
        }
    }

    pub fn failing_auth(mut self) -> Self {
        self.fail_auth = true;
        self
    }
}

impl PlaylistCatalog for FakeCatalog {
    async fn authenticate(&self) -> anyhow::Result<AccessToken> {
        self.calls.push("auth".to_string());
        if self.fail_auth {
            anyhow::bail!("Spotify auth error 400: invalid_client");
        }
        Ok(AccessToken {
            value: "token".to_string(),
            expires_in: 3600,
        })
    }

    async fn tracks_page(
        &self,
        _token: &AccessToken,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> anyhow::Result<TrackPage> {
        self.calls.push(format!("page:{playlist_id}:{offset}:{limit}"));
        let start = (offset as usize).min(self.tracks.len());
        let end = (start + limit as usize).min(self.tracks.len());
        Ok(TrackPage {
            items: self.tracks[start..end].iter().cloned().map(Some).collect(),
            total: self.tracks.len() as u32,
        })
    }
}

pub fn catalog_tracks(n: usize) -> Vec<CatalogTrack> {
    (0..n)
        .map(|i| CatalogTrack {
            name: format!("Track {i}"),
            artists: vec![Artist {
                name: format!("Artist {i}"),
            }],
        })
        .collect()
}
