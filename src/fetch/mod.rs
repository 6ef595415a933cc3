pub mod encoding;

use crate::error::{LyricsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// A fetched page, already decoded to text
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub text: String,
}

pub struct PageFetcher {
    client: reqwest::Client,
    legacy_hosts: Vec<String>,
}

impl PageFetcher {
    pub fn new(timeout: Duration, legacy_hosts: Vec<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LyricsError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            legacy_hosts: legacy_hosts
                .into_iter()
                .map(|host| host.trim().to_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        })
    }

    /// GET a page and decode it for its host.
    ///
    /// The timeout is a hard ceiling; there is no retry.
    pub async fn fetch_page(&self, url: &str) -> Result<RawPage> {
        tracing::debug!("Fetching page: {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LyricsError::Network(format!(
                "Unexpected status {} from {}",
                status, url
            )));
        }

        let host = response
            .url()
            .host_str()
            .map(str::to_lowercase)
            .unwrap_or_default();
        let bytes = response.bytes().await?;
        let text = encoding::decode_for_host(&host, &bytes, &self.legacy_hosts);

        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(RawPage {
            url: url.to_string(),
            text,
        })
    }
}
