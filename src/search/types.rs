use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub error: Option<SearchErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchErrorBody {
    #[serde(default)]
    pub message: String,
}

/// A search hit worth fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub host: String,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let host = reqwest::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        Self { url, host }
    }
}
