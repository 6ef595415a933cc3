pub mod generic;
pub mod sites;
pub mod text;

use crate::normalize::NormalizedText;
use generic::{GenericExtractor, GenericThresholds};
use scraper::Html;

/// Extracted text at or below this many characters (after trimming) is treated as a miss
pub const MIN_CONTENT_LENGTH: usize = 10;

/// Pulls lyric text out of one host's markup
pub trait SiteExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw text for the lyric body, or `None` when the markup holds nothing usable
    fn extract(&self, document: &Html) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Found(NormalizedText),
    NotFound,
}

impl ExtractionOutcome {
    pub fn into_option(self) -> Option<NormalizedText> {
        match self {
            ExtractionOutcome::Found(text) => Some(text),
            ExtractionOutcome::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ExtractionOutcome::Found(_))
    }
}

/// Domain-keyed adapter registry with a generic fallback
pub struct ContentExtractor {
    adapters: Vec<(String, Box<dyn SiteExtractor>)>,
    generic: GenericExtractor,
}

impl ContentExtractor {
    /// Registry preloaded with every known lyrics host
    pub fn new() -> Self {
        let mut extractor = Self::empty();
        extractor.register("genius.com", Box::new(sites::genius()));
        extractor.register("mojim.com", Box::new(sites::MojimAdapter::new()));
        extractor.register("jonahome.net", Box::new(sites::jonahome()));
        extractor.register("azlyrics.com", Box::new(sites::azlyrics()));
        extractor.register("zanmeishi.com", Box::new(sites::zanmeishi()));
        extractor
    }

    /// Registry with only the generic fallback
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
            generic: GenericExtractor::default(),
        }
    }

    pub fn with_generic_thresholds(mut self, thresholds: GenericThresholds) -> Self {
        self.generic = GenericExtractor::new(thresholds);
        self
    }

    /// Add an adapter for hosts containing `domain`. Later registrations win over earlier ones.
    pub fn register(&mut self, domain: impl Into<String>, adapter: Box<dyn SiteExtractor>) {
        self.adapters.insert(0, (domain.into().to_lowercase(), adapter));
    }

    /// Adapter responsible for `url`, falling back to the generic heuristic
    pub fn adapter_for(&self, url: &str) -> &dyn SiteExtractor {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
            .unwrap_or_else(|| url.to_lowercase());

        self.adapters
            .iter()
            .find(|(domain, _)| host.contains(domain.as_str()))
            .map(|(_, adapter)| adapter.as_ref())
            .unwrap_or(&self.generic)
    }

    /// Extract and normalize the lyric body of a fetched page
    pub fn extract(&self, html: &str, url: &str) -> ExtractionOutcome {
        let adapter = self.adapter_for(url);
        let document = Html::parse_document(html);

        let Some(raw) = adapter.extract(&document) else {
            tracing::debug!("Adapter '{}' found no lyrics in {}", adapter.name(), url);
            return ExtractionOutcome::NotFound;
        };

        if raw.trim().chars().count() <= MIN_CONTENT_LENGTH {
            tracing::debug!(
                "Adapter '{}' returned too little text from {}",
                adapter.name(),
                url
            );
            return ExtractionOutcome::NotFound;
        }

        // The single normalization pass for scraped text
        let text = NormalizedText::new(&raw);
        if text.is_empty() {
            return ExtractionOutcome::NotFound;
        }

        tracing::debug!(
            "Adapter '{}' extracted {} chars from {}",
            adapter.name(),
            text.as_str().chars().count(),
            url
        );
        ExtractionOutcome::Found(text)
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
