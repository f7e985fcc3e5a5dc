use crate::youtube::models::{Playlist, Track, TrackRef};
use crate::youtube::{TrackSearch, VideoPlaylists};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    bootstrap: OnceCell<Bootstrap>,
}

/// InnerTube client for the YouTube Music web API (search and playlist browse).
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    inner: Arc<Inner>,
}

#[derive(Debug, Clone)]
struct Bootstrap {
    api_key: String,
    client_version: String,
    visitor_data: Option<String>,
}

impl YouTubeClient {
    pub fn new() -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://music.youtube.com"));
        headers.insert(REFERER, HeaderValue::from_static("https://music.youtube.com/"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                bootstrap: OnceCell::new(),
            }),
        })
    }

    pub async fn search_tracks(&self, query: &str) -> anyhow::Result<Vec<Track>> {
        let b = self.bootstrap().await?;

        let body = json!({
            "context": client_context(&b),
            "query": query,
            // Biases results towards songs.
            "params": "EgWKAQIIAWoKEAkQBRAKEAMQBA%3D%3D"
        });

        let v: serde_json::Value = self
            .innertube_post("search", &b)
            .json(&body)
            .send()
            .await
            .context("send search request")?
            .error_for_status()
            .context("search http status")?
            .json()
            .await
            .context("parse search json")?;
        Ok(extract_tracks(&v))
    }

    /// Browses a playlist and follows continuations until the list is exhausted.
    pub async fn browse_playlist(&self, playlist_id: &str) -> anyhow::Result<Playlist> {
        let b = self.bootstrap().await?;
        let browse_id = if playlist_id.starts_with("VL") {
            playlist_id.to_string()
        } else {
            format!("VL{playlist_id}")
        };

        let body = json!({
            "context": client_context(&b),
            "browseId": browse_id
        });

        let first: serde_json::Value = self
            .innertube_post("browse", &b)
            .json(&body)
            .send()
            .await
            .context("send browse playlist request")?
            .error_for_status()
            .context("browse playlist http status")?
            .json()
            .await
            .context("parse browse playlist json")?;

        let title = extract_playlist_title(&first).unwrap_or_else(|| playlist_id.to_string());
        let mut seen_ids = HashSet::new();
        let mut tracks = Vec::new();
        push_unique(&mut tracks, &mut seen_ids, extract_tracks(&first));

        let mut seen_tokens = HashSet::new();
        let mut continuation = extract_continuation_token(&first);
        while let Some(token) = continuation.take() {
            if !seen_tokens.insert(token.clone()) {
                break;
            }
            tracing::debug!(playlist_id, loaded = tracks.len(), "fetching playlist continuation");

            let body = json!({
                "context": client_context(&b),
                "continuation": token
            });
            let v: serde_json::Value = self
                .innertube_post("browse", &b)
                .json(&body)
                .send()
                .await
                .context("send playlist continuation request")?
                .error_for_status()
                .context("playlist continuation http status")?
                .json()
                .await
                .context("parse playlist continuation json")?;

            let added = push_unique(&mut tracks, &mut seen_ids, extract_tracks(&v));
            if added == 0 {
                break;
            }
            continuation = extract_continuation_token(&v);
        }

        Ok(Playlist {
            title,
            tracks: tracks.into_iter().map(TrackRef::from).collect(),
        })
    }

    async fn bootstrap(&self) -> anyhow::Result<Bootstrap> {
        self.inner
            .bootstrap
            .get_or_try_init(|| async {
                let html = self
                    .inner
                    .http
                    .get("https://music.youtube.com/")
                    .send()
                    .await
                    .context("fetch music.youtube.com for bootstrap")?
                    .error_for_status()
                    .context("bootstrap http status")?
                    .text()
                    .await
                    .context("read bootstrap html")?;

                let api_key = parse_ytcfg_value(&html, "INNERTUBE_API_KEY")
                    .context("parse INNERTUBE_API_KEY")?;
                let client_version = parse_ytcfg_value(&html, "INNERTUBE_CLIENT_VERSION")
                    .context("parse INNERTUBE_CLIENT_VERSION")?;
                let visitor_data = parse_ytcfg_value(&html, "VISITOR_DATA");

                Ok(Bootstrap {
                    api_key,
                    client_version,
                    visitor_data,
                })
            })
            .await
            .cloned()
    }

    fn innertube_post(&self, path: &str, b: &Bootstrap) -> reqwest::RequestBuilder {
        let url = format!(
            "https://music.youtube.com/youtubei/v1/{path}?key={}&prettyPrint=false",
            b.api_key
        );

        let mut rb = self
            .inner
            .http
            .post(url)
            .header("X-Youtube-Client-Name", "67")
            .header("X-Youtube-Client-Version", b.client_version.as_str())
            .header("X-Youtube-Bootstrap-Logged-In", "false");

        if let Some(v) = b.visitor_data.as_deref() {
            rb = rb.header("X-Goog-Visitor-Id", v);
        }

        rb
    }
}

impl TrackSearch for YouTubeClient {
    async fn search_top_match(&self, keywords: &str) -> anyhow::Result<Option<TrackRef>> {
        let top = self.search_tracks(keywords).await?.into_iter().next();
        if let Some(t) = &top {
            tracing::debug!(keywords, video_id = %t.video_id, title = %t.title, artists = ?t.artists, "top match");
        }
        Ok(top.map(TrackRef::from))
    }
}

impl VideoPlaylists for YouTubeClient {
    async fn playlist(&self, url: &str) -> anyhow::Result<Playlist> {
        let id = playlist_id_from_url(url).context("no list= parameter in playlist url")?;
        self.browse_playlist(&id).await
    }
}

/// Pulls the `list` query parameter out of a watch or playlist URL.
pub fn playlist_id_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, v)| k == "list" && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

fn client_context(b: &Bootstrap) -> serde_json::Value {
    json!({
        "client": {
            "clientName": "WEB_REMIX",
            "clientVersion": b.client_version,
        }
    })
}

fn push_unique(out: &mut Vec<Track>, seen: &mut HashSet<String>, batch: Vec<Track>) -> usize {
    let before = out.len();
    for t in batch {
        if seen.insert(t.video_id.clone()) {
            out.push(t);
        }
    }
    out.len() - before
}

fn extract_tracks(v: &serde_json::Value) -> Vec<Track> {
    // Best-effort extraction; YouTube's structure changes often.
    // We scan for `musicResponsiveListItemRenderer` nodes that contain a `watchEndpoint.videoId`.
    let mut out = Vec::new();
    scan_value(
        v,
        &mut |node| {
            let r = node.get("musicResponsiveListItemRenderer")?;
            let video_id = extract_video_id_from_item(r)?;

            let title = r
                .pointer("/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/text")
                .and_then(|x| x.as_str())
                .unwrap_or("Unknown title")
                .to_string();

            let artists = r
                .pointer("/flexColumns/1/musicResponsiveListItemFlexColumnRenderer/text/runs")
                .and_then(|x| x.as_array())
                .map(|runs| {
                    runs.iter()
                        .filter_map(|r| r.get("text").and_then(|t| t.as_str()))
                        .filter(|t| *t != " • " && *t != " & " && !is_duration(t))
                        .map(|t| t.to_string())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            Some(Track {
                video_id,
                title,
                artists,
            })
        },
        &mut out,
    );
    out
}

/// `3:33` or `1:02:45`, the length column search rows append to the byline.
fn is_duration(text: &str) -> bool {
    let mut parts = text.split(':');
    let first_ok = parts
        .next()
        .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    let rest: Vec<&str> = parts.collect();
    first_ok
        && (1..=2).contains(&rest.len())
        && rest
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit()))
}

fn extract_video_id_from_item(r: &serde_json::Value) -> Option<String> {
    // Seen variants:
    // - musicResponsiveListItemRenderer.playlistItemData.videoId
    // - musicResponsiveListItemRenderer.navigationEndpoint.watchEndpoint.videoId
    // - musicResponsiveListItemRenderer.flexColumns[0]...runs[0].navigationEndpoint.watchEndpoint.videoId
    r.pointer("/playlistItemData/videoId")
        .or_else(|| r.pointer("/navigationEndpoint/watchEndpoint/videoId"))
        .or_else(|| {
            r.pointer(
                "/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/navigationEndpoint/watchEndpoint/videoId",
            )
        })
        .and_then(|x| x.as_str())
        .map(|s| s.to_string())
}

fn extract_playlist_title(v: &serde_json::Value) -> Option<String> {
    let mut title = None;
    scan_for_node(v, &mut |node| {
        for key in ["musicResponsiveHeaderRenderer", "musicDetailHeaderRenderer"] {
            if let Some(t) = node
                .get(key)
                .and_then(|h| h.pointer("/title/runs/0/text"))
                .and_then(|t| t.as_str())
            {
                title = Some(t.to_string());
                return true;
            }
        }
        false
    });
    title
}

fn parse_ytcfg_value(html: &str, key: &str) -> Option<String> {
    // We look for `"KEY":"value"` occurrences in the initial HTML ytcfg payload.
    let needle = format!("{key}\":\"");
    let idx = html.find(&needle)?;
    let start = idx + needle.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn scan_value<F>(v: &serde_json::Value, f: &mut F, out: &mut Vec<Track>)
where
    F: FnMut(&serde_json::Value) -> Option<Track>,
{
    if let Some(t) = f(v) {
        out.push(t);
    }
    match v {
        serde_json::Value::Array(a) => {
            for x in a {
                scan_value(x, f, out);
            }
        }
        serde_json::Value::Object(o) => {
            for (_, x) in o {
                scan_value(x, f, out);
            }
        }
        _ => {}
    }
}

fn extract_continuation_token(v: &serde_json::Value) -> Option<String> {
    // Continuation tokens show up as either:
    // - ...continuations[0].nextContinuationData.continuation
    // - ...continuationItemRenderer.continuationEndpoint.continuationCommand.token
    let mut token: Option<String> = None;

    scan_for_node(v, &mut |node| {
        if let Some(cont) = node
            .get("nextContinuationData")
            .and_then(|c| c.get("continuation"))
            .and_then(|c| c.as_str())
        {
            token = Some(cont.to_string());
            return true;
        }
        if let Some(cont) = node
            .get("continuationEndpoint")
            .and_then(|c| c.get("continuationCommand"))
            .and_then(|c| c.get("token"))
            .and_then(|c| c.as_str())
        {
            token = Some(cont.to_string());
            return true;
        }
        false
    });

    token
}

/// Depth-first scan that stops at the first node `f` accepts.
fn scan_for_node<F>(v: &serde_json::Value, f: &mut F) -> bool
where
    F: FnMut(&serde_json::Value) -> bool,
{
    if f(v) {
        return true;
    }
    match v {
        serde_json::Value::Array(a) => a.iter().any(|x| scan_for_node(x, f)),
        serde_json::Value::Object(o) => o.values().any(|x| scan_for_node(x, f)),
        _ => false,
    }
}
