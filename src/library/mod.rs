use crate::config::MatchMode;
use anyhow::Context;
use std::io::ErrorKind;
use std::path::Path;

/// Characters that are illegal in file names on at least one supported platform.
const ILLEGAL: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];

pub fn sanitize_title(title: &str) -> String {
    title.chars().filter(|c| !ILLEGAL.contains(c)).collect()
}

/// File name a track with `title` is stored under. The pre-check and the
/// writer both go through here so they never disagree.
pub fn file_name_for(title: &str, extension: &str) -> String {
    let stem = sanitize_title(title);
    let stem = if stem.trim().is_empty() {
        "untitled"
    } else {
        stem.as_str()
    };
    format!("{stem}.{extension}")
}

/// Returns true if an entry in `dir` matches `candidate` (case-insensitive).
///
/// A missing directory counts as empty; any other read error is returned.
pub async fn exists(candidate: &str, dir: &Path, mode: MatchMode) -> anyhow::Result<bool> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("read dir {}", dir.display())),
    };

    let needle = candidate.to_lowercase();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("read entry in {}", dir.display()))?
    {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        let hit = match mode {
            MatchMode::Substring => name.contains(&needle),
            MatchMode::Exact => name == needle,
        };
        if hit {
            tracing::debug!(candidate, found = %name, "library hit");
            return Ok(true);
        }
    }
    Ok(false)
}

/// Creates the output directory. Returns true if it had to be created.
pub fn ensure_dir(dir: &Path) -> anyhow::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    Ok(true)
}
