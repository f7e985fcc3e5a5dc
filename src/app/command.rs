use once_cell::sync::Lazy;
use regex::Regex;

static WATCH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^?&\s]+/watch\?(?:\S*&)?v=[^&\s]+").expect("valid watch url regex")
});
static SHORT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://youtu\.be/[\w-]+").expect("valid short url regex"));
static PLAYLIST_PAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^?&\s]+/playlist\?\S*").expect("valid playlist page regex")
});
static LIST_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]list=[^&\s]+").expect("valid list param regex"));

/// One classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `yt <watch url>`: download that one video.
    DirectVideo(String),
    /// `yt <url with list=>`: download every video in the playlist.
    PlaylistVideo(String),
    /// `yt <anything else>`: search and download the top match.
    Keyword(String),
    /// `spotify <playlist url>`; the url is validated by the resolver.
    PlaylistStreaming(String),
    Exit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Command::Empty;
        };
        let args: Vec<&str> = words.collect();

        match verb {
            "yt" if !args.is_empty() => classify_yt(&args.join(" ")),
            "spotify" => Command::PlaylistStreaming(args.first().copied().unwrap_or_default().to_string()),
            "exit" => Command::Exit,
            _ => Command::Unknown(verb.to_string()),
        }
    }
}

fn classify_yt(arg: &str) -> Command {
    let is_url = !arg.contains(char::is_whitespace)
        && (WATCH_URL.is_match(arg) || SHORT_URL.is_match(arg) || PLAYLIST_PAGE_URL.is_match(arg));
    if !is_url {
        return Command::Keyword(arg.to_string());
    }
    if LIST_PARAM.is_match(arg) {
        Command::PlaylistVideo(arg.to_string())
    } else if PLAYLIST_PAGE_URL.is_match(arg) {
        // A playlist page without a list id has nothing to enumerate.
        Command::Keyword(arg.to_string())
    } else {
        Command::DirectVideo(arg.to_string())
    }
}
