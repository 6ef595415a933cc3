//! The lyrics fallback chain: cache, then generated text, then web search and scrape.

use crate::cache::CacheAdapter;
use crate::config::Config;
use crate::error::{LyricsError, Result};
use crate::extract::{ContentExtractor, ExtractionOutcome};
use crate::fetch::PageFetcher;
use crate::generate::{self, TextGenerator};
use crate::normalize::NormalizedText;
use crate::search::WebSearchClient;
use crate::store::{SongRecord, SongStore};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricsQuery {
    pub title: String,
    pub artist: Option<String>,
    /// Acquire fresh lyrics even when the cache has the title
    pub refresh: bool,
}

impl LyricsQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn refreshed(mut self) -> Self {
        self.refresh = true;
        self
    }

    /// The artist, with blank values treated as absent
    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsResult {
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: NormalizedText,
    pub source: String,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_id: Option<i64>,
}

impl LyricsResult {
    /// Cached lyrics are cleaned again; cleaning is idempotent so older entries catch up
    fn from_cache(record: SongRecord) -> Self {
        Self {
            lyrics: NormalizedText::new(&record.lyrics),
            title: record.title,
            artist: record.artist,
            source: record.source.unwrap_or_else(|| "cache".to_string()),
            provenance: Provenance::Cache,
            song_id: Some(record.id),
        }
    }

    fn fresh(title: &str, artist: Option<&str>, lyrics: NormalizedText, source: String) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.map(str::to_string),
            lyrics,
            source,
            provenance: Provenance::Api,
            song_id: None,
        }
    }
}

pub struct SourceOrchestrator {
    cache: CacheAdapter,
    generator: Option<Arc<dyn TextGenerator>>,
    search: WebSearchClient,
    fetcher: PageFetcher,
    extractor: ContentExtractor,
}

impl SourceOrchestrator {
    pub fn new(
        cache: CacheAdapter,
        search: WebSearchClient,
        fetcher: PageFetcher,
        extractor: ContentExtractor,
    ) -> Self {
        Self {
            cache,
            generator: None,
            search,
            fetcher,
            extractor,
        }
    }

    /// Wire every component from configuration, without a text generator
    pub fn from_config(config: &Config, store: Arc<dyn SongStore>) -> Result<Self> {
        Ok(Self::new(
            CacheAdapter::new(store),
            WebSearchClient::new(config.search.clone())?,
            PageFetcher::new(config.fetch_timeout, config.legacy_hosts.clone())?,
            ContentExtractor::new(),
        ))
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn cache(&self) -> &CacheAdapter {
        &self.cache
    }

    /// Find lyrics for a song.
    ///
    /// A fresh result, when one was acquired, comes first; cached songs follow in
    /// store order. Fails with [`LyricsError::NotFound`] only when nothing usable
    /// turned up anywhere.
    pub async fn search_lyrics(&self, query: &LyricsQuery) -> Result<Vec<LyricsResult>> {
        let title = query.title.trim();
        if title.is_empty() {
            return Err(LyricsError::InvalidQuery("title is empty".to_string()));
        }
        let artist = query.artist();

        let mut cached = Vec::new();
        if artist.is_none() {
            match self.cache.lookup(title).await {
                Ok(records) => {
                    cached = records.into_iter().map(LyricsResult::from_cache).collect();
                }
                Err(e) => tracing::warn!("Cache lookup failed for \"{}\": {}", title, e),
            }
        }
        tracing::debug!("{} cached result(s) for \"{}\"", cached.len(), title);

        if !cached.is_empty() && artist.is_none() && !query.refresh {
            return Ok(cached);
        }

        match self.acquire(title, artist).await {
            Ok(Some(fresh)) => {
                tracing::info!("Lyrics for \"{}\" acquired from {}", title, fresh.source);
                let mut results = Vec::with_capacity(cached.len() + 1);
                results.push(fresh);
                results.extend(cached);
                Ok(results)
            }
            Ok(None) if !cached.is_empty() => Ok(cached),
            Ok(None) => Err(LyricsError::NotFound(title.to_string())),
            Err(e) if !cached.is_empty() => {
                tracing::warn!("Acquisition failed for \"{}\", using cache: {}", title, e);
                Ok(cached)
            }
            Err(e @ LyricsError::Configuration(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Acquisition failed for \"{}\": {}", title, e);
                Err(LyricsError::NotFound(title.to_string()))
            }
        }
    }

    async fn acquire(&self, title: &str, artist: Option<&str>) -> Result<Option<LyricsResult>> {
        if let Some(generator) = &self.generator {
            if let Some(result) = self.try_generate(generator.as_ref(), title, artist).await {
                return Ok(Some(result));
            }
        }
        self.try_web(title, artist).await
    }

    async fn try_generate(
        &self,
        generator: &dyn TextGenerator,
        title: &str,
        artist: Option<&str>,
    ) -> Option<LyricsResult> {
        let prompt = generate::lyrics_prompt(title, artist);
        let response = match generator.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Generator '{}' failed for \"{}\": {:#}", generator.name(), title, e);
                return None;
            }
        };

        if !generate::is_acceptable(&response) {
            tracing::debug!(
                "Generator '{}' returned {} chars for \"{}\", falling back",
                generator.name(),
                response.trim().chars().count(),
                title
            );
            return None;
        }

        let lyrics = NormalizedText::new(&response);
        if lyrics.is_empty() {
            return None;
        }
        Some(LyricsResult::fresh(
            title,
            artist,
            lyrics,
            generator.name().to_string(),
        ))
    }

    async fn try_web(&self, title: &str, artist: Option<&str>) -> Result<Option<LyricsResult>> {
        let Some(candidate) = self.search.search_lyrics_url(title, artist).await? else {
            tracing::debug!("Web search found no pages for \"{}\"", title);
            return Ok(None);
        };

        let page = self.fetcher.fetch_page(&candidate.url).await?;
        match self.extractor.extract(&page.text, &page.url) {
            ExtractionOutcome::Found(lyrics) => {
                Ok(Some(LyricsResult::fresh(title, artist, lyrics, page.url)))
            }
            ExtractionOutcome::NotFound => {
                tracing::debug!("No lyrics extracted from {}", candidate.url);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_blank_artist_is_absent() {
        assert_eq!(LyricsQuery::new("Song").with_artist("   ").artist(), None);
        assert_eq!(LyricsQuery::new("Song").with_artist(" Band ").artist(), Some("Band"));
        assert!(LyricsQuery::new("Song").refreshed().refresh);
    }

    #[test]
    fn test_result_serializes_provenance() {
        let result = LyricsResult::fresh(
            "Song",
            None,
            NormalizedText::new("line one\nline two"),
            "https://example.org".to_string(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["provenance"], "api");
        assert_eq!(json["lyrics"], "line one\nline two");
        assert!(json.get("songId").is_none());
    }

    #[test]
    fn test_from_cache_recleans_lyrics() {
        let result = LyricsResult::from_cache(SongRecord {
            id: 7,
            title: "Song".to_string(),
            artist: None,
            lyrics: "[Chorus]\nold  entry".to_string(),
            source: None,
            updated_at: 0,
        });
        assert_eq!(result.lyrics.as_str(), "old entry");
        assert_eq!(result.provenance, Provenance::Cache);
        assert_eq!(result.song_id, Some(7));
        assert_eq!(result.source, "cache");
    }
}
