use super::text::{element_text, is_text_bearing};
use super::SiteExtractor;
use scraper::{Html, Selector};
use std::sync::OnceLock;

/// Shortest text block that still looks like a full lyric
pub const DEFAULT_MIN_LYRICS_LENGTH: usize = 100;

/// How many of the longest blocks are inspected before giving up
pub const DEFAULT_SCAN_LIMIT: usize = 15;

static BLOCK_SELECTOR: OnceLock<Selector> = OnceLock::new();

fn get_block_selector() -> &'static Selector {
    BLOCK_SELECTOR.get_or_init(|| {
        Selector::parse("div, p, pre, article, section, td, blockquote").unwrap()
    })
}

/// Tuning for the generic heuristic. Tuned against a handful of hosts; unknown
/// sites may need different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericThresholds {
    pub min_length: usize,
    pub scan_limit: usize,
}

impl Default for GenericThresholds {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LYRICS_LENGTH,
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

/// Fallback for hosts without a dedicated adapter.
///
/// Ranks every text-bearing block by length and takes the first of the top
/// candidates that spans several lines and is long enough to be a lyric. A
/// caption or menu rarely is both. Without such a block the longest one wins.
#[derive(Debug, Clone, Default)]
pub struct GenericExtractor {
    thresholds: GenericThresholds,
}

impl GenericExtractor {
    pub fn new(thresholds: GenericThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> GenericThresholds {
        self.thresholds
    }
}

impl SiteExtractor for GenericExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, document: &Html) -> Option<String> {
        let mut blocks: Vec<(usize, String)> = document
            .select(get_block_selector())
            .filter(|element| is_text_bearing(*element))
            .map(element_text)
            .filter(|text| !text.is_empty())
            .map(|text| (text.chars().count(), text))
            .collect();

        // Stable sort keeps document order among equal lengths
        blocks.sort_by(|a, b| b.0.cmp(&a.0));

        let multiline = blocks
            .iter()
            .take(self.thresholds.scan_limit)
            .position(|(length, text)| *length > self.thresholds.min_length && text.contains('\n'));

        match multiline {
            Some(idx) => Some(blocks.swap_remove(idx).1),
            None => {
                tracing::debug!(
                    "No multi-line block among {} candidates, using the longest",
                    blocks.len()
                );
                blocks.into_iter().next().map(|(_, text)| text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LYRIC_LINES: &[&str] = &[
        "Amazing grace how sweet the sound that saved",
        "A wretch like me I once was lost but now am",
        "Found was blind but now I see the light of day",
        "Twas grace that taught my heart to fear it",
    ];

    fn lyric_block() -> String {
        LYRIC_LINES.join("<br>")
    }

    #[test]
    fn test_generic_prefers_multiline_block() {
        let banner = "Sponsored ".repeat(30);
        let html = format!(
            "<html><body><p>{}</p><div class='song'>{}</div><p>short caption</p></body></html>",
            banner,
            lyric_block()
        );
        let document = Html::parse_document(&html);
        let text = GenericExtractor::default().extract(&document).unwrap();

        assert_eq!(text, LYRIC_LINES.join("\n"));
        assert_eq!(text.matches('\n').count(), 3);
        assert!(text.chars().count() > DEFAULT_MIN_LYRICS_LENGTH);
        assert!(banner.trim().chars().count() > text.chars().count());
    }

    #[test]
    fn test_generic_falls_back_to_longest_block() {
        let html = "<html><body><p>tiny</p><div>a somewhat longer single line of text</div></body></html>";
        let document = Html::parse_document(html);
        let text = GenericExtractor::default().extract(&document).unwrap();
        assert_eq!(text, "a somewhat longer single line of text");
    }

    #[test]
    fn test_generic_reads_inline_line_markup() {
        let lines: Vec<String> = LYRIC_LINES
            .iter()
            .map(|line| format!("<font color='#333'>{}</font>", line))
            .collect();
        let html = format!(
            "<html><body><div>{}</div><p>Share this song now</p></body></html>",
            lines.join("<br>")
        );
        let document = Html::parse_document(&html);
        let text = GenericExtractor::default().extract(&document).unwrap();
        assert_eq!(text, LYRIC_LINES.join("\n"));
    }

    #[test]
    fn test_generic_reads_span_per_line_markup() {
        let lines: Vec<String> = LYRIC_LINES
            .iter()
            .map(|line| format!("<span>{}</span><br>", line))
            .collect();
        let html = format!(
            "<html><body><p>caption text</p><section>{}</section></body></html>",
            lines.concat()
        );
        let document = Html::parse_document(&html);
        let text = GenericExtractor::default().extract(&document).unwrap();
        assert_eq!(text, LYRIC_LINES.join("\n"));
    }

    #[test]
    fn test_generic_skips_wrapper_blocks() {
        let html = format!(
            "<html><body><div id='wrapper'><div>{}</div><div>footer links</div></div></body></html>",
            lyric_block()
        );
        let document = Html::parse_document(&html);
        let text = GenericExtractor::default().extract(&document).unwrap();
        assert_eq!(text, LYRIC_LINES.join("\n"));
    }

    #[test]
    fn test_generic_scan_limit_is_respected() {
        let thresholds = GenericThresholds {
            min_length: DEFAULT_MIN_LYRICS_LENGTH,
            scan_limit: 1,
        };
        let banner = "Sponsored ".repeat(30);
        let html = format!(
            "<html><body><p>{}</p><div>{}</div></body></html>",
            banner,
            lyric_block()
        );
        let document = Html::parse_document(&html);
        let text = GenericExtractor::new(thresholds).extract(&document).unwrap();
        assert_eq!(text, banner.trim());
    }

    #[test]
    fn test_generic_empty_page() {
        let document = Html::parse_document("<html><body></body></html>");
        assert!(GenericExtractor::default().extract(&document).is_none());
    }
}
