use crate::config::YtDlpConfig;
use crate::fetcher::{MediaInfo, MediaResolver};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::process::Command;

/// Resolves titles and audio-only stream URLs by shelling out to yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlp {
    cfg: YtDlpConfig,
}

/// The subset of `yt-dlp --dump-single-json` we care about. With a single
/// `-f` selection the chosen format's fields are merged into the top level.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: String,
    url: Option<String>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
    #[serde(default)]
    http_headers: HashMap<String, String>,
}

impl YtDlp {
    pub fn new(cfg: YtDlpConfig) -> Self {
        Self { cfg }
    }

    fn command(&self, locator: &str) -> Command {
        let mut cmd = Command::new(&self.cfg.binary);
        cmd.args([
            "-f",
            "bestaudio",
            "--dump-single-json",
            "--no-playlist",
            "--no-warnings",
        ]);

        // Prefer browser cookies when configured (no manual export needed).
        if let Some(browser) = self.cfg.cookies_from_browser.as_deref() {
            cmd.arg("--cookies-from-browser").arg(browser);
        } else if let Some(cookies) = self.cfg.cookies.as_deref() {
            cmd.arg("--cookies").arg(cookies);
        }
        cmd.arg("--").arg(locator);
        cmd
    }
}

impl MediaResolver for YtDlp {
    async fn resolve(&self, locator: &str) -> anyhow::Result<MediaInfo> {
        tracing::debug!(locator, "resolving with yt-dlp");
        let out = self
            .command(locator)
            .output()
            .await
            .with_context(|| format!("run {}", self.cfg.binary.display()))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            anyhow::bail!("yt-dlp failed: {}", stderr.trim());
        }
        parse_info(&out.stdout)
    }
}

fn parse_info(stdout: &[u8]) -> anyhow::Result<MediaInfo> {
    let info: YtDlpInfo = serde_json::from_slice(stdout).context("decode yt-dlp json")?;
    let stream_url = info
        .url
        .filter(|u| !u.is_empty())
        .context("yt-dlp returned no audio-only url")?;
    Ok(MediaInfo {
        title: info.title,
        stream_url,
        headers: info.http_headers,
        size_hint: info.filesize.or(info.filesize_approx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_merged_format() {
        let raw = br#"{
            "id": "dQw4w9WgXcQ",
            "title": "Rick Astley - Never Gonna Give You Up",
            "url": "https://rr1.googlevideo.com/videoplayback?itag=251",
            "ext": "webm",
            "filesize": null,
            "filesize_approx": 3456789,
            "http_headers": { "User-Agent": "Mozilla/5.0" }
        }"#;
        let info = parse_info(raw).unwrap();
        assert_eq!(info.title, "Rick Astley - Never Gonna Give You Up");
        assert!(info.stream_url.contains("itag=251"));
        assert_eq!(info.size_hint, Some(3456789));
        assert_eq!(info.headers.get("User-Agent").map(String::as_str), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_parse_info_without_url_fails() {
        let raw = br#"{ "title": "Members only", "formats": [] }"#;
        assert!(parse_info(raw).is_err());
    }

    #[test]
    fn test_command_prefers_browser_cookies() {
        let y = YtDlp::new(YtDlpConfig {
            binary: "yt-dlp".into(),
            cookies: Some("/tmp/cookies.txt".into()),
            cookies_from_browser: Some("firefox".to_string()),
        });
        let cmd = y.command("https://www.youtube.com/watch?v=x");
        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.windows(2).any(|w| w == ["--cookies-from-browser", "firefox"]));
        assert!(!args.iter().any(|a| a == "--cookies"));
        assert_eq!(args.last().map(String::as_str), Some("https://www.youtube.com/watch?v=x"));
    }
}
