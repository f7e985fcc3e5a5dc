pub mod command;
pub mod pipeline;

#[cfg(test)]
mod fakes;

use crate::config::Config;
use crate::console;
use crate::fetcher::{AudioFetcher, TrackFetch};
use crate::spotify::{PlaylistCatalog, SpotifyClient};
use crate::youtube::{TrackSearch, VideoPlaylists, YouTubeClient, YtDlp};
use anyhow::Context;
use command::Command;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Whether the prompt keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything a command handler talks to, built once at startup.
pub struct Session<S, P, C, F> {
    search: S,
    playlists: P,
    catalog: C,
    fetcher: F,
    page_size: u32,
}

pub type LiveSession = Session<YouTubeClient, YouTubeClient, SpotifyClient, AudioFetcher<YtDlp>>;

impl LiveSession {
    pub fn connect(cfg: &Config) -> anyhow::Result<Self> {
        let youtube = YouTubeClient::new().context("init YouTube client")?;
        let catalog = SpotifyClient::from_env().context("init Spotify client")?;
        let fetcher = AudioFetcher::new(
            YtDlp::new(cfg.ytdlp.clone()),
            cfg.paths.output_dir.clone(),
            &cfg.download,
        )?;
        Ok(Session::new(
            youtube.clone(),
            youtube,
            catalog,
            fetcher,
            cfg.spotify.page_size,
        ))
    }
}

impl<S, P, C, F> Session<S, P, C, F>
where
    S: TrackSearch,
    P: VideoPlaylists,
    C: PlaylistCatalog,
    F: TrackFetch,
{
    pub fn new(search: S, playlists: P, catalog: C, fetcher: F, page_size: u32) -> Self {
        Self {
            search,
            playlists,
            catalog,
            fetcher,
            page_size,
        }
    }

    /// Reads commands line by line until `exit` or end of input.
    pub async fn run<R>(&self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("read input line")? {
            if self.handle_line(&line).await == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> Flow {
        let cmd = Command::parse(line);
        tracing::debug!(?cmd, "dispatch");
        self.dispatch(cmd).await
    }

    pub async fn dispatch(&self, cmd: Command) -> Flow {
        match cmd {
            Command::Keyword(keywords) => {
                pipeline::download_by_keyword(&self.search, &self.fetcher, &keywords).await;
            }
            Command::DirectVideo(url) => {
                pipeline::download_url(&self.fetcher, &url).await;
            }
            Command::PlaylistVideo(url) => {
                match pipeline::download_video_playlist(&self.playlists, &self.fetcher, &url).await {
                    Ok(report) => {
                        console::success(format!("Playlist tracks processed successfully. {report}"))
                    }
                    Err(e) => console::error_with("Error fetching or processing playlist", &e),
                }
            }
            Command::PlaylistStreaming(url) => {
                match pipeline::download_streaming_playlist(
                    &self.catalog,
                    &self.search,
                    &self.fetcher,
                    &url,
                    self.page_size,
                )
                .await
                {
                    Ok(report) => {
                        console::success(format!("Playlist tracks processed successfully. {report}"))
                    }
                    Err(e) => console::error_with("Error handling Spotify playlist", &e),
                }
            }
            Command::Exit => return Flow::Exit,
            Command::Empty => {}
            Command::Unknown(verb) => {
                tracing::debug!(%verb, "unknown command");
                console::usage_reminder();
            }
        }
        Flow::Continue
    }
}
