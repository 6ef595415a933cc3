//! Shared fixtures for the orchestrator integration tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lyricsfetch::extract::ContentExtractor;
use lyricsfetch::fetch::PageFetcher;
use lyricsfetch::generate::TextGenerator;
use lyricsfetch::search::{SearchSettings, WebSearchClient};
use lyricsfetch::store::SqliteSongStore;
use lyricsfetch::{CacheAdapter, SourceOrchestrator};
use mockito::{Matcher, Mock, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const LYRICS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Amazing Grace Lyrics</title></head>
<body>
    <div class="menu">Home | Songs | About</div>
    <div class="lyrics">
        [Verse 1]<br>
        Amazing grace how sweet the sound<br>
        That saved a wretch like me<br>
        I once was lost but now am found<br>
        Was blind but now I see
    </div>
    <p>Share this song with your friends</p>
</body>
</html>"#;

pub const LYRICS_PAGE_TEXT: &str = "Amazing grace how sweet the sound\n\
That saved a wretch like me\n\
I once was lost but now am found\n\
Was blind but now I see";

/// Generator that always answers with the same text
pub struct FixedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl FixedGenerator {
    pub fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Generator whose provider is always down
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("provider unavailable"))
    }
}

#[allow(dead_code)]
pub fn build_orchestrator(
    server: &ServerGuard,
    store: Arc<SqliteSongStore>,
    legacy_hosts: Vec<String>,
) -> SourceOrchestrator {
    let search = WebSearchClient::new(SearchSettings {
        endpoint: format!("{}/search", server.url()),
        api_key: Some("test-key".to_string()),
        engine_id: Some("test-cx".to_string()),
        ..SearchSettings::default()
    })
    .unwrap();
    let fetcher = PageFetcher::new(Duration::from_secs(5), legacy_hosts).unwrap();

    SourceOrchestrator::new(
        CacheAdapter::new(store),
        search,
        fetcher,
        ContentExtractor::new(),
    )
}

/// Search API mock answering with the given result links
#[allow(dead_code)]
pub async fn mock_search(server: &mut ServerGuard, links: &[String]) -> Mock {
    let items: Vec<serde_json::Value> = links
        .iter()
        .map(|link| serde_json::json!({ "link": link }))
        .collect();
    let body = if items.is_empty() {
        serde_json::json!({ "kind": "customsearch#search" })
    } else {
        serde_json::json!({ "items": items })
    };

    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

/// Page mock serving raw bytes
#[allow(dead_code)]
pub async fn mock_page(server: &mut ServerGuard, path: &str, body: Vec<u8>) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}
