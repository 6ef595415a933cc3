//! Adapters for known lyrics hosts.
//!
//! Each host's markup is an external contract with no shared schema, so every
//! adapter is a short ordered list of selector strategies. The first strategy
//! that yields text wins.

use super::text::element_text;
use super::SiteExtractor;
use scraper::{Html, Selector};

/// How a selector's matches are turned into text
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Every match in document order, joined with a blank line
    AllMatches(&'static str),
    /// The longest match that spans more than one line
    LongestMultiline(&'static str),
    /// The longest match regardless of shape
    Longest(&'static str),
}

impl Strategy {
    fn apply(&self, document: &Html) -> Option<String> {
        let (css, texts) = match self {
            Strategy::AllMatches(css)
            | Strategy::LongestMultiline(css)
            | Strategy::Longest(css) => (*css, select_texts(document, css)?),
        };

        let picked = match self {
            Strategy::AllMatches(_) => {
                let joined = texts.join("\n\n");
                (!joined.is_empty()).then_some(joined)
            }
            Strategy::LongestMultiline(_) => texts
                .into_iter()
                .filter(|text| text.contains('\n'))
                .max_by_key(|text| text.chars().count()),
            Strategy::Longest(_) => texts.into_iter().max_by_key(|text| text.chars().count()),
        };

        if picked.is_none() {
            tracing::trace!("Strategy {:?} found nothing for '{}'", self, css);
        }
        picked
    }
}

fn select_texts(document: &Html, css: &str) -> Option<Vec<String>> {
    let selector = match Selector::parse(css) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid adapter selector '{}': {:?}", css, e);
            return None;
        }
    };

    Some(
        document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
    )
}

/// Adapter driven purely by an ordered strategy list
pub struct SelectorAdapter {
    name: &'static str,
    strategies: Vec<Strategy>,
}

impl SelectorAdapter {
    pub fn new(name: &'static str, strategies: Vec<Strategy>) -> Self {
        Self { name, strategies }
    }
}

impl SiteExtractor for SelectorAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, document: &Html) -> Option<String> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.apply(document))
    }
}

/// Genius splits a song across several containers, one per section
pub fn genius() -> SelectorAdapter {
    SelectorAdapter::new(
        "genius",
        vec![
            Strategy::AllMatches("div[data-lyrics-container='true']"),
            Strategy::Longest("div.lyrics"),
        ],
    )
}

/// Old jonahome pages are table layouts with lyrics inside `<font>` runs
pub fn jonahome() -> SelectorAdapter {
    SelectorAdapter::new(
        "jonahome",
        vec![
            Strategy::Longest("#article_content"),
            Strategy::LongestMultiline("font"),
            Strategy::LongestMultiline("td"),
        ],
    )
}

pub fn azlyrics() -> SelectorAdapter {
    SelectorAdapter::new(
        "azlyrics",
        vec![
            Strategy::Longest("div.ringtone ~ div:not([class])"),
            Strategy::LongestMultiline("div.col-lg-8 > div"),
        ],
    )
}

pub fn zanmeishi() -> SelectorAdapter {
    SelectorAdapter::new(
        "zanmeishi",
        vec![
            Strategy::Longest("#lyric_text"),
            Strategy::Longest("div.lyrics"),
            Strategy::LongestMultiline("pre"),
        ],
    )
}

/// Mojim stamps its own watermark lines into the lyric body
pub struct MojimAdapter {
    inner: SelectorAdapter,
}

const MOJIM_WATERMARKS: &[&str] = &["mojim.com", "魔鏡歌詞網", "更多更詳盡歌詞"];

impl MojimAdapter {
    pub fn new() -> Self {
        Self {
            inner: SelectorAdapter::new(
                "mojim",
                vec![Strategy::Longest("#fsZx3"), Strategy::Longest("dl.fsZx2")],
            ),
        }
    }
}

impl Default for MojimAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteExtractor for MojimAdapter {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn extract(&self, document: &Html) -> Option<String> {
        let text = self.inner.extract(document)?;
        let kept: Vec<&str> = text
            .lines()
            .filter(|line| {
                let lowered = line.to_lowercase();
                !MOJIM_WATERMARKS.iter().any(|mark| lowered.contains(mark))
            })
            .collect();
        Some(kept.join("\n"))
    }
}
