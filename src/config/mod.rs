use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub ytdlp: YtDlpConfig,
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where downloaded audio lands. Relative paths resolve against the working directory.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Extension appended to every sanitized title.
    pub audio_extension: String,
    /// How the library pre-check compares names: "substring" or "exact".
    pub match_mode: MatchMode,
    /// Draw a progress bar while streaming.
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Substring,
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    /// yt-dlp executable (looked up on PATH when not absolute).
    pub binary: PathBuf,
    /// Path to a Netscape cookie file.
    pub cookies: Option<PathBuf>,
    /// Use yt-dlp `--cookies-from-browser` (e.g. "chrome", "firefox", "brave").
    pub cookies_from_browser: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// dotenv-style file holding SPOTIFY_CLIENT and SPOTIFY_SECRET.
    pub env_file: PathBuf,
    /// Tracks requested per playlist page (the Web API caps this at 100).
    pub page_size: u32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./downloaded"),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            audio_extension: "mp3".to_string(),
            match_mode: MatchMode::Substring,
            progress: true,
        }
    }
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            cookies: None,
            cookies_from_browser: None,
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from("./keys.env"),
            page_size: 100,
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj =
        ProjectDirs::from("dev", "tunedl", "tunedl").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = Config::default();
        write_config(&cfg, &path)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let mut cfg =
        toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    if cfg.spotify.page_size == 0 || cfg.spotify.page_size > 100 {
        tracing::warn!(page_size = cfg.spotify.page_size, "spotify.page_size out of range, using 100");
        cfg.spotify.page_size = 100;
    }
    Ok(cfg)
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize default config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}
