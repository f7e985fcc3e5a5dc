//! Colored status lines for the prompt.
//!
//! Diagnostics go through `tracing` to stderr; these are the lines a user
//! reads while the loop runs.

pub mod progress;

use crossterm::style::Stylize;
use std::fmt::Display;

pub const USAGE: &str =
    r#"Enter "yt <keywords/link>" or "spotify <playlist>" to search/download from YouTube/Spotify or "exit" to quit."#;

pub fn banner() {
    println!("{}", USAGE.yellow().bold().reverse());
}

pub fn usage_reminder() {
    println!(
        "{}",
        r#"Invalid command. Use "yt <keywords/link>", "spotify <playlist>", or "exit" to quit."#
            .red()
            .reverse()
    );
}

/// Step announcements ("Downloading: ...", "Processing track: ...").
pub fn info(msg: impl Display) {
    println!("{}", msg.to_string().yellow().bold());
}

/// Headline for a longer operation.
pub fn headline(msg: impl Display) {
    println!("{}", msg.to_string().yellow().bold().reverse());
}

pub fn success(msg: impl Display) {
    println!("{}", msg.to_string().green().bold());
}

/// Non-error outcomes that still end the operation early.
pub fn notice(msg: impl Display) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn error(msg: impl Display) {
    eprintln!("{}", msg.to_string().red().reverse());
}

/// Formats an error with its full context chain on one line.
pub fn error_with(msg: impl Display, err: &anyhow::Error) {
    error(format!("{msg}: {err:#}"));
}
