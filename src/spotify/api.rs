use crate::spotify::PlaylistCatalog;
use crate::spotify::models::{AccessToken, TokenResponse, TrackPage, TracksResponse};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;

const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT";
const CLIENT_SECRET_VAR: &str = "SPOTIFY_SECRET";

/// Spotify Web API client using the client-credentials grant.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    accounts_url: String,
    api_url: String,
}

impl SpotifyClient {
    const ACCOUNTS_URL: &'static str = "https://accounts.spotify.com/api/token";
    const API_URL: &'static str = "https://api.spotify.com/v1";

    /// Reads credentials from the process environment. Missing values are
    /// only reported when a token is first requested.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(
            std::env::var(CLIENT_ID_VAR).ok(),
            std::env::var(CLIENT_SECRET_VAR).ok(),
        )
    }

    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tunedl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            http,
            client_id: client_id.filter(|s| !s.is_empty()),
            client_secret: client_secret.filter(|s| !s.is_empty()),
            accounts_url: Self::ACCOUNTS_URL.to_string(),
            api_url: Self::API_URL.to_string(),
        })
    }

    fn tracks_url(&self, playlist_id: &str, offset: u32, limit: u32) -> String {
        format!(
            "{}/playlists/{}/tracks?offset={offset}&limit={limit}&fields={}",
            self.api_url,
            urlencoding::encode(playlist_id),
            urlencoding::encode("total,items(track(name,artists(name)))")
        )
    }
}

impl PlaylistCatalog for SpotifyClient {
    async fn authenticate(&self) -> anyhow::Result<AccessToken> {
        let (Some(id), Some(secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            anyhow::bail!(
                "missing Spotify credentials: set {CLIENT_ID_VAR} and {CLIENT_SECRET_VAR}"
            );
        };

        let response = self
            .http
            .post(&self.accounts_url)
            .basic_auth(id, Some(secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .context("send client credentials grant")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify auth error {status}: {}", body.trim());
        }

        let token: TokenResponse = response.json().await.context("parse token json")?;
        tracing::debug!(expires_in = token.expires_in, "spotify token granted");
        Ok(AccessToken {
            value: token.access_token,
            expires_in: token.expires_in,
        })
    }

    async fn tracks_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> anyhow::Result<TrackPage> {
        let response = self
            .http
            .get(self.tracks_url(playlist_id, offset, limit))
            .bearer_auth(&token.value)
            .send()
            .await
            .context("send playlist tracks request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify API error {status}: {}", body.trim());
        }

        let page: TracksResponse = response.json().await.context("parse playlist tracks json")?;
        Ok(page.into())
    }
}
