//! Resolver → fetcher chains. Everything runs one track at a time.

use crate::console;
use crate::fetcher::{TrackFetch, TrackOutcome};
use crate::spotify::{self, PlaylistCatalog};
use crate::youtube::{TrackRef, TrackSearch, VideoPlaylists};
use anyhow::Context;
use std::fmt;

/// Tally of per-track outcomes for one playlist command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Downloaded(_) => self.downloaded += 1,
            TrackOutcome::Skipped(_) => self.skipped += 1,
            TrackOutcome::NotFound => self.not_found += 1,
            TrackOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.not_found + self.failed
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total tracks: {} (downloaded {}, already present {}, not found {}, failed {})",
            self.total(),
            self.downloaded,
            self.skipped,
            self.not_found,
            self.failed
        )
    }
}

pub async fn download_by_keyword<S, F>(search: &S, fetcher: &F, keywords: &str) -> TrackOutcome
where
    S: TrackSearch,
    F: TrackFetch,
{
    match search.search_top_match(keywords).await {
        Ok(Some(track)) => fetcher.fetch(&track).await,
        Ok(None) => {
            console::error("No search results found for the given keyword(s).");
            TrackOutcome::NotFound
        }
        Err(e) => {
            console::error_with("Error searching YouTube", &e);
            TrackOutcome::Failed(format!("{e:#}"))
        }
    }
}

pub async fn download_url<F: TrackFetch>(fetcher: &F, url: &str) -> TrackOutcome {
    fetcher.fetch(&TrackRef::from_url(url)).await
}

pub async fn download_video_playlist<P, F>(
    playlists: &P,
    fetcher: &F,
    url: &str,
) -> anyhow::Result<BatchReport>
where
    P: VideoPlaylists,
    F: TrackFetch,
{
    console::info(format!("Fetching playlist: {url}"));
    let playlist = playlists.playlist(url).await.context("fetch playlist")?;
    console::info(format!("Playlist fetched successfully: {}", playlist.title));
    console::info(format!(
        "Number of videos in the playlist: {}",
        playlist.tracks.len()
    ));
    if playlist.tracks.is_empty() {
        anyhow::bail!("No videos found in the playlist.");
    }

    let mut report = BatchReport::default();
    for track in &playlist.tracks {
        let label = track.title.as_deref().unwrap_or(&track.locator);
        console::info(format!("Downloading video: {label}"));
        report.record(&fetcher.fetch(track).await);
    }
    Ok(report)
}

/// Walks a streaming-service playlist page by page, searching and fetching
/// each entry before moving on to the next.
pub async fn download_streaming_playlist<C, S, F>(
    catalog: &C,
    search: &S,
    fetcher: &F,
    url: &str,
    page_size: u32,
) -> anyhow::Result<BatchReport>
where
    C: PlaylistCatalog,
    S: TrackSearch,
    F: TrackFetch,
{
    let playlist_id = spotify::playlist_id(url).context("Invalid Spotify playlist URL.")?;
    let page_size = page_size.max(1);

    console::info(format!("Handling Spotify playlist: {playlist_id}"));
    console::info("Requesting Spotify API client credentials grant...");
    let token = catalog
        .authenticate()
        .await
        .context("authenticate with Spotify")?;

    let mut report = BatchReport::default();
    let mut offset = 0u32;
    loop {
        let page = catalog
            .tracks_page(&token, playlist_id, offset, page_size)
            .await
            .with_context(|| format!("fetch playlist tracks at offset {offset}"))?;
        tracing::debug!(offset, total = page.total, items = page.items.len(), "playlist page");

        for item in page.items {
            let Some(track) = item else {
                console::notice("Skipping an unavailable playlist entry.");
                report.record(&TrackOutcome::NotFound);
                continue;
            };
            let query = spotify::search_query(&track);
            console::info(format!("Processing track: {query}"));
            let outcome = download_by_keyword(search, fetcher, &query).await;
            report.record(&outcome);
        }

        offset += page_size;
        if offset >= page.total {
            break;
        }
    }
    Ok(report)
}
