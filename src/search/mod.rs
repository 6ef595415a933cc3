pub mod types;

use crate::error::{LyricsError, Result};
use std::time::Duration;
use types::{CandidateUrl, SearchResponse};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_QUERY_SUFFIX: &str = "歌词 lyrics";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Lyrics hosts in order of preference. A hit on an earlier host beats a
/// better-ranked hit on a later one.
pub const PREFERRED_DOMAINS: &[&str] = &[
    "jonahome.net",
    "zanmeishi.com",
    "mojim.com",
    "genius.com",
    "azlyrics.com",
];

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub query_suffix: String,
    pub preferred_domains: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            api_key: None,
            engine_id: None,
            query_suffix: DEFAULT_QUERY_SUFFIX.to_string(),
            preferred_domains: PREFERRED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

pub struct WebSearchClient {
    client: reqwest::Client,
    settings: SearchSettings,
}

impl WebSearchClient {
    pub fn new(settings: SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| LyricsError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    pub fn build_query(&self, title: &str, artist: Option<&str>) -> String {
        let mut parts = vec![title.trim()];
        if let Some(artist) = artist.map(str::trim).filter(|a| !a.is_empty()) {
            parts.push(artist);
        }
        let suffix = self.settings.query_suffix.trim();
        if !suffix.is_empty() {
            parts.push(suffix);
        }
        parts.join(" ")
    }

    /// Find the best page to scrape for a song.
    ///
    /// Returns `None` when the search has no results at all.
    pub async fn search_lyrics_url(
        &self,
        title: &str,
        artist: Option<&str>,
    ) -> Result<Option<CandidateUrl>> {
        let (Some(api_key), Some(engine_id)) = (
            self.settings.api_key.as_deref().filter(|k| !k.is_empty()),
            self.settings.engine_id.as_deref().filter(|k| !k.is_empty()),
        ) else {
            return Err(LyricsError::Configuration(
                "search API key and engine id are required".to_string(),
            ));
        };

        let query = self.build_query(title, artist);
        let url = format!(
            "{}?key={}&cx={}&q={}",
            self.settings.endpoint,
            urlencoding::encode(api_key),
            urlencoding::encode(engine_id),
            urlencoding::encode(&query)
        );

        tracing::debug!("Searching lyrics pages for: {}", query);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<SearchResponse>(&body);
        let payload = match parsed {
            Ok(payload) => payload,
            Err(e) if status.is_success() => {
                return Err(LyricsError::Upstream(format!("malformed response: {}", e)));
            }
            Err(_) => {
                return Err(LyricsError::Upstream(format!("unexpected status {}", status)));
            }
        };

        if let Some(error) = payload.error {
            return Err(LyricsError::Upstream(error.message));
        }
        if !status.is_success() {
            return Err(LyricsError::Upstream(format!("unexpected status {}", status)));
        }

        let links: Vec<String> = payload.items.into_iter().map(|item| item.link).collect();
        tracing::debug!("Search returned {} results", links.len());

        Ok(pick_preferred(&links, &self.settings.preferred_domains).map(CandidateUrl::new))
    }
}

/// Choose a result by preferred-domain order; the API's ranking only breaks ties
/// within a domain. Falls back to the first result when no domain matches.
pub fn pick_preferred(links: &[String], preferred_domains: &[String]) -> Option<String> {
    preferred_domains
        .iter()
        .find_map(|domain| links.iter().find(|link| link.contains(domain.as_str())))
        .or_else(|| links.first())
        .cloned()
}
