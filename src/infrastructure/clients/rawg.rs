use crate::domain::{dedup_names, GameDraft};
use crate::error::{GameError, Result};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const RAWG_API_BASE: &str = "https://api.rawg.io/api";
const SEARCH_PAGE_SIZE: &str = "10";
const INVALID_KEY_MARKER: &str = "Invalid API key";

#[derive(Debug, Deserialize)]
pub struct RawgSearchResponse {
    pub results: Vec<RawgGameBasic>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawgGameBasic {
    pub id: u64,
    pub name: String,
    pub background_image: Option<String>,
    pub released: Option<String>,
    pub metacritic: Option<u32>,
    #[serde(default)]
    pub platforms: Option<Vec<RawgPlatform>>,
    #[serde(default)]
    pub genres: Option<Vec<RawgGenre>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawgGameDetailed {
    pub id: u64,
    pub name: String,
    pub background_image: Option<String>,
    pub released: Option<String>,
    pub metacritic: Option<u32>,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub platforms: Option<Vec<RawgPlatform>>,
    #[serde(default)]
    pub genres: Option<Vec<RawgGenre>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawgPlatform {
    pub platform: PlatformInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawgGenre {
    pub name: String,
}

/// Envelope returned by the CORS relay; `contents` holds the upstream body as a string.
#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    contents: Option<String>,
    #[serde(default)]
    status: Option<RelayStatus>,
}

#[derive(Debug, Deserialize)]
struct RelayStatus {
    http_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct RawgErrorBody {
    detail: Option<String>,
}

pub struct RawgClient {
    client: Client,
    api_base: String,
    relay_url: Option<String>,
}

impl RawgClient {
    pub fn new(client: Client, relay_url: Option<String>) -> Self {
        Self {
            client,
            api_base: RAWG_API_BASE.to_string(),
            relay_url,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Searches RAWG by title. Blank queries or credentials return no results
    /// without touching the network.
    pub async fn search(&self, query: &str, api_key: &str) -> Result<Vec<RawgGameBasic>> {
        let (query, api_key) = (query.trim(), api_key.trim());
        if query.is_empty() || api_key.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.build_url(
            "games",
            &[
                ("search", query),
                ("page_size", SEARCH_PAGE_SIZE),
                ("key", api_key),
            ],
        )?;
        info!("Searching RAWG for '{}'", query);

        let response: RawgSearchResponse = self.get_json(url).await?;
        info!("RAWG returned {} results for '{}'", response.results.len(), query);
        Ok(response.results)
    }

    pub async fn fetch_detail(&self, id: u64, api_key: &str) -> Result<Option<RawgGameDetailed>> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Ok(None);
        }

        let url = self.build_url(&format!("games/{}", id), &[("key", api_key)])?;
        info!("Fetching RAWG details for game {}", id);

        let detail: RawgGameDetailed = self.get_json(url).await?;
        Ok(Some(detail))
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let target = format!("{}/{}", self.api_base.trim_end_matches('/'), path);
        let target = Url::parse_with_params(&target, params)
            .map_err(|e| GameError::Network(format!("invalid RAWG url {target}: {e}")))?;

        match &self.relay_url {
            Some(relay) => Url::parse_with_params(relay, &[("url", target.as_str())])
                .map_err(|e| GameError::Network(format!("invalid relay url {relay}: {e}"))),
            None => Ok(target),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("RAWG response status {} ({} bytes)", status, body.len());

        if self.relay_url.is_some() {
            if !status.is_success() {
                return Err(GameError::Network(format!("relay returned status {status}")));
            }
            let (upstream_status, contents) = decode_relay_envelope(&body)?;
            decode_upstream(upstream_status, &contents)
        } else {
            decode_upstream(status, &body)
        }
    }
}

/// Unwraps the relay envelope into the upstream status and raw upstream body.
pub fn decode_relay_envelope(body: &str) -> Result<(StatusCode, String)> {
    let envelope: RelayEnvelope = serde_json::from_str(body)
        .map_err(|e| GameError::Network(format!("malformed relay response: {e}")))?;

    let contents = envelope
        .contents
        .ok_or_else(|| GameError::Network("relay returned no contents".to_string()))?;

    let status = envelope
        .status
        .and_then(|s| s.http_code)
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);

    Ok((status, contents))
}

/// Decodes an upstream RAWG body, classifying credential rejections before
/// any other failure.
pub fn decode_upstream<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if let Ok(RawgErrorBody {
        detail: Some(detail),
    }) = serde_json::from_str::<RawgErrorBody>(body)
    {
        if detail.contains(INVALID_KEY_MARKER) {
            return Err(GameError::Auth(detail));
        }
    }

    if !status.is_success() {
        return Err(GameError::Network(format!("RAWG API returned status {status}")));
    }

    serde_json::from_str(body)
        .map_err(|e| GameError::Network(format!("unexpected RAWG response: {e}")))
}

fn normalize_platform(name: &str) -> String {
    match name {
        "Xbox Series S/X" => "Xbox Series X|S".to_string(),
        "iOS" | "Android" => "Mobile".to_string(),
        other => other.to_string(),
    }
}

fn platform_names(platforms: &Option<Vec<RawgPlatform>>) -> Vec<String> {
    dedup_names(
        platforms
            .iter()
            .flatten()
            .map(|p| normalize_platform(&p.platform.name))
            .collect(),
    )
}

fn genre_names(genres: &Option<Vec<RawgGenre>>) -> Vec<String> {
    dedup_names(genres.iter().flatten().map(|g| g.name.clone()).collect())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RawgGameDetailed {
    pub fn to_game_draft(&self) -> GameDraft {
        GameDraft {
            title: self.name.clone(),
            platforms: platform_names(&self.platforms),
            genres: genre_names(&self.genres),
            description: non_blank(&self.description_raw),
            cover_url: non_blank(&self.background_image),
            release_date: non_blank(&self.released),
            metacritic_score: self.metacritic,
            external_id: Some(self.id),
            ..Default::default()
        }
    }
}

impl RawgGameBasic {
    /// Degraded draft used when the detail lookup is unavailable.
    pub fn to_game_draft(&self) -> GameDraft {
        GameDraft {
            title: self.name.clone(),
            platforms: platform_names(&self.platforms),
            genres: genre_names(&self.genres),
            cover_url: non_blank(&self.background_image),
            release_date: non_blank(&self.released),
            metacritic_score: self.metacritic,
            external_id: Some(self.id),
            ..Default::default()
        }
    }
}
