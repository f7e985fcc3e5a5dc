//! Audio fetcher: resolve a reference, pre-check the library, stream the
//! audio-only rendition to disk.

use crate::config::{DownloadConfig, MatchMode};
use crate::console::{self, progress::TransferProgress};
use crate::library;
use crate::youtube::TrackRef;
use anyhow::Context;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// What a resolver knows about a reference before any bytes move.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub title: String,
    /// Direct URL of the audio-only rendition.
    pub stream_url: String,
    /// Headers the media host expects on the stream request.
    pub headers: HashMap<String, String>,
    pub size_hint: Option<u64>,
}

pub trait MediaResolver {
    async fn resolve(&self, locator: &str) -> anyhow::Result<MediaInfo>;
}

/// Result of running one track through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Downloaded(PathBuf),
    /// A matching file already exists; holds the name that was checked.
    Skipped(String),
    /// The search produced nothing to fetch.
    NotFound,
    Failed(String),
}

pub trait TrackFetch {
    async fn fetch(&self, track: &TrackRef) -> TrackOutcome;
}

/// State of one in-flight transfer.
#[derive(Debug)]
pub struct DownloadJob {
    pub locator: String,
    pub path: PathBuf,
    pub expected: Option<u64>,
    pub received: u64,
}

pub struct AudioFetcher<R> {
    resolver: R,
    http: reqwest::Client,
    output_dir: PathBuf,
    extension: String,
    match_mode: MatchMode,
    show_progress: bool,
}

impl<R: MediaResolver> AudioFetcher<R> {
    pub fn new(resolver: R, output_dir: PathBuf, cfg: &DownloadConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            resolver,
            http,
            output_dir,
            extension: cfg.audio_extension.clone(),
            match_mode: cfg.match_mode,
            show_progress: cfg.progress,
        })
    }

    async fn transfer(&self, locator: &str, info: &MediaInfo, path: &Path) -> anyhow::Result<DownloadJob> {
        let mut req = self.http.get(&info.stream_url);
        for (k, v) in &info.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        let response = req
            .send()
            .await
            .context("open audio stream")?
            .error_for_status()
            .context("audio stream http status")?;

        let mut job = DownloadJob {
            locator: locator.to_string(),
            path: path.to_path_buf(),
            expected: response.content_length().or(info.size_hint),
            received: 0,
        };
        let mut progress = TransferProgress::new(job.expected, self.show_progress);

        let pumped = async {
            let mut file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("create {}", path.display()))?;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.context("audio stream interrupted")?;
                file.write_all(&chunk)
                    .await
                    .with_context(|| format!("write {}", path.display()))?;
                job.received += chunk.len() as u64;
                progress.advance(chunk.len());
            }
            file.flush()
                .await
                .with_context(|| format!("flush {}", path.display()))?;
            anyhow::Ok(())
        }
        .await;

        match pumped {
            Ok(()) => {
                progress.finish();
                Ok(job)
            }
            Err(e) => {
                progress.abandon();
                tracing::warn!(?job, "transfer failed, partial file left in place");
                Err(e)
            }
        }
    }
}

impl<R: MediaResolver> TrackFetch for AudioFetcher<R> {
    async fn fetch(&self, track: &TrackRef) -> TrackOutcome {
        let info = match self.resolver.resolve(&track.locator).await {
            Ok(info) => info,
            Err(e) => {
                console::error_with("Error getting video info from YouTube", &e);
                return TrackOutcome::Failed(format!("{e:#}"));
            }
        };

        let file_name = library::file_name_for(&info.title, &self.extension);
        let stem = file_name
            .strip_suffix(&format!(".{}", self.extension))
            .unwrap_or(&file_name)
            .to_string();

        match library::exists(&file_name, &self.output_dir, self.match_mode).await {
            Ok(true) => {
                console::notice(format!("The file \"{stem}\" is already downloaded."));
                return TrackOutcome::Skipped(file_name);
            }
            Ok(false) => {}
            Err(e) => {
                console::error_with("Error reading the download folder", &e);
                return TrackOutcome::Failed(format!("{e:#}"));
            }
        }

        console::headline(format!("Downloading: {}", info.title));
        let path = self.output_dir.join(&file_name);
        match self.transfer(&track.locator, &info, &path).await {
            Ok(job) => {
                tracing::debug!(
                    locator = %job.locator,
                    bytes = job.received,
                    expected = ?job.expected,
                    path = %job.path.display(),
                    "download complete"
                );
                console::success(format!("Downloaded: {stem}"));
                TrackOutcome::Downloaded(job.path)
            }
            Err(e) => {
                console::error_with("Error downloading from YouTube", &e);
                TrackOutcome::Failed(format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    struct FakeResolver {
        result: Result<MediaInfo, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeResolver {
        fn ok(title: &str, stream_url: &str) -> Self {
            Self {
                result: Ok(MediaInfo {
                    title: title.to_string(),
                    stream_url: stream_url.to_string(),
                    headers: HashMap::new(),
                    size_hint: None,
                }),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl MediaResolver for FakeResolver {
        async fn resolve(&self, locator: &str) -> anyhow::Result<MediaInfo> {
            self.calls.lock().unwrap().push(locator.to_string());
            self.result.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn quiet_cfg() -> DownloadConfig {
        DownloadConfig {
            progress: false,
            ..DownloadConfig::default()
        }
    }

    /// Serves one canned HTTP response and returns its URL.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        serve_declared(status_line, body.len(), body).await
    }

    /// Like `serve_once`, but announces `declared` bytes and hangs up after
    /// writing `body`.
    async fn serve_declared(status_line: &'static str, declared: usize, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
            );
            sock.write_all(head.as_bytes()).await.unwrap();
            sock.write_all(body).await.unwrap();
            sock.flush().await.unwrap();
        });
        format!("http://{addr}/audio")
    }

    #[tokio::test]
    async fn test_library_hit_skips_transfer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Song A.mp3"), b"old").unwrap();

        // Nothing listens on port 9; a transfer attempt would come back as Failed.
        let resolver = FakeResolver::ok("Song A", "http://127.0.0.1:9/never");
        let fetcher = AudioFetcher::new(resolver, dir.path().to_path_buf(), &quiet_cfg()).unwrap();

        let outcome = fetcher.fetch(&TrackRef::from_url("https://youtu.be/x")).await;
        assert_eq!(outcome, TrackOutcome::Skipped("Song A.mp3".to_string()));
        assert_eq!(std::fs::read(dir.path().join("Song A.mp3")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_resolve_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FakeResolver {
            result: Err("Video unavailable".to_string()),
            calls: Mutex::new(Vec::new()),
        };
        let fetcher = AudioFetcher::new(resolver, dir.path().to_path_buf(), &quiet_cfg()).unwrap();

        let outcome = fetcher.fetch(&TrackRef::from_url("https://youtu.be/gone")).await;
        assert!(matches!(outcome, TrackOutcome::Failed(ref r) if r.contains("Video unavailable")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(*fetcher.resolver.calls.lock().unwrap(), vec!["https://youtu.be/gone".to_string()]);
    }

    #[tokio::test]
    async fn test_streams_to_sanitized_path() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_once("200 OK", b"fake audio bytes").await;
        let resolver = FakeResolver::ok("AC/DC: Thunderstruck?", &url);
        let fetcher = AudioFetcher::new(resolver, dir.path().to_path_buf(), &quiet_cfg()).unwrap();

        let outcome = fetcher.fetch(&TrackRef::from_url("https://youtu.be/t")).await;
        let expected = dir.path().join("ACDC Thunderstruck.mp3");
        assert_eq!(outcome, TrackOutcome::Downloaded(expected.clone()));
        assert_eq!(std::fs::read(expected).unwrap(), b"fake audio bytes");
    }

    #[tokio::test]
    async fn test_http_error_is_failed_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_once("403 Forbidden", b"").await;
        let resolver = FakeResolver::ok("Blocked", &url);
        let fetcher = AudioFetcher::new(resolver, dir.path().to_path_buf(), &quiet_cfg()).unwrap();

        let outcome = fetcher.fetch(&TrackRef::from_url("https://youtu.be/b")).await;
        assert!(matches!(outcome, TrackOutcome::Failed(_)));
        assert!(!dir.path().join("Blocked.mp3").exists());
    }

    #[tokio::test]
    async fn test_cut_stream_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_declared("200 OK", 1000, b"0123456789").await;
        let resolver = FakeResolver::ok("Cut Short", &url);
        let fetcher = AudioFetcher::new(resolver, dir.path().to_path_buf(), &quiet_cfg()).unwrap();

        let track = TrackRef::from_url("https://youtu.be/c");
        let outcome = fetcher.fetch(&track).await;
        assert!(matches!(outcome, TrackOutcome::Failed(_)));
        let partial = dir.path().join("Cut Short.mp3");
        assert_eq!(std::fs::read(&partial).unwrap(), b"0123456789");

        // Substring matching treats the leftover as already downloaded.
        let again = fetcher.fetch(&track).await;
        assert_eq!(again, TrackOutcome::Skipped("Cut Short.mp3".to_string()));
    }

    #[tokio::test]
    async fn test_unreadable_output_dir_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("notadir");
        std::fs::write(&not_a_dir, b"x").unwrap();

        let resolver = FakeResolver::ok("Song", "http://127.0.0.1:9/never");
        let fetcher = AudioFetcher::new(resolver, not_a_dir.clone(), &quiet_cfg()).unwrap();

        let outcome = fetcher.fetch(&TrackRef::from_url("https://youtu.be/s")).await;
        assert!(matches!(outcome, TrackOutcome::Failed(ref r) if r.contains("read dir")));
        assert_eq!(std::fs::read(&not_a_dir).unwrap(), b"x");
    }
}
