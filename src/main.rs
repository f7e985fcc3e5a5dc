mod app;
mod config;
mod console;
mod fetcher;
mod library;
mod spotify;
mod youtube;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tunedl",
    version,
    about = "Download music from YouTube searches, links and playlists, or Spotify playlists"
)]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the download folder.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run a single command (e.g. `yt daft punk one more time`) instead of the prompt.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tunedl=warn")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    if let Some(dir) = cli.output_dir {
        cfg.paths.output_dir = dir;
    }
    load_env_file(&cfg.spotify.env_file);

    if library::ensure_dir(&cfg.paths.output_dir)? {
        console::success(format!(
            "Created {} folder.",
            cfg.paths.output_dir.display()
        ));
    }

    let session = app::LiveSession::connect(&cfg)?;

    if !cli.command.is_empty() {
        session.handle_line(&cli.command.join(" ")).await;
        return Ok(());
    }

    console::banner();
    session.run(BufReader::new(tokio::io::stdin())).await
}

/// Loads Spotify credentials from a dotenv file. Variables already set in
/// the environment win; a missing file only matters once a grant is attempted.
fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "loaded env file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %path.display(), "no env file");
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not read env file"),
    }
}
