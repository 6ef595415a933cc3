//! Deterministic lyrics cleanup.
//!
//! Every lyric handed to a caller or written to the song store goes through
//! [`clean`]. The pipeline is total: malformed input degrades to an empty string,
//! it never fails.

pub mod markers;

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Private-use character standing in for a paragraph break while the line passes run
pub(crate) const SENTINEL: char = '\u{E000}';

static BRACKET_REGEX: OnceLock<Regex> = OnceLock::new();
static BOLD_REGEX: OnceLock<Regex> = OnceLock::new();
static ITALIC_REGEX: OnceLock<Regex> = OnceLock::new();
static UNDERLINE_REGEX: OnceLock<Regex> = OnceLock::new();
static SPACES_REGEX: OnceLock<Regex> = OnceLock::new();
static FULL_STOP_REGEX: OnceLock<Regex> = OnceLock::new();
static TRAILING_COMMA_REGEX: OnceLock<Regex> = OnceLock::new();
static COLON_REGEX: OnceLock<Regex> = OnceLock::new();
static PAUSE_REGEX: OnceLock<Regex> = OnceLock::new();
static PARAGRAPH_RUN_REGEX: OnceLock<Regex> = OnceLock::new();
static NEWLINE_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

// Spans never cross a line or paragraph boundary.
fn get_bracket_regex() -> &'static Regex {
    BRACKET_REGEX.get_or_init(|| Regex::new(r"\[[^\]\n\x{E000}]*\]").unwrap())
}

fn get_bold_regex() -> &'static Regex {
    BOLD_REGEX.get_or_init(|| Regex::new(r"\*\*[^*\n\x{E000}]+\*\*").unwrap())
}

fn get_italic_regex() -> &'static Regex {
    ITALIC_REGEX.get_or_init(|| Regex::new(r"\*[^*\n\x{E000}]+\*").unwrap())
}

fn get_underline_regex() -> &'static Regex {
    UNDERLINE_REGEX.get_or_init(|| Regex::new(r"__[^_\n\x{E000}]+__").unwrap())
}

fn get_spaces_regex() -> &'static Regex {
    SPACES_REGEX.get_or_init(|| Regex::new(r" {2,}").unwrap())
}

fn get_full_stop_regex() -> &'static Regex {
    // Swallows one newline that already follows, so "line。\n" stays a single break
    FULL_STOP_REGEX.get_or_init(|| Regex::new(r"[ \t]*。+[ \t]*\n?").unwrap())
}

fn get_trailing_comma_regex() -> &'static Regex {
    TRAILING_COMMA_REGEX
        .get_or_init(|| Regex::new(r"(?:[ \t]*，)+[ \t]*([\n\x{E000}])").unwrap())
}

fn get_colon_regex() -> &'static Regex {
    COLON_REGEX.get_or_init(|| Regex::new(r"(?:[ \t]*：)+").unwrap())
}

fn get_pause_regex() -> &'static Regex {
    PAUSE_REGEX.get_or_init(|| Regex::new(r"(?:[ \t]*[，；、][ \t]*)+").unwrap())
}

fn get_paragraph_run_regex() -> &'static Regex {
    PARAGRAPH_RUN_REGEX
        .get_or_init(|| Regex::new(r"[\n\x{E000}]*\x{E000}[\n\x{E000}]*").unwrap())
}

fn get_newline_run_regex() -> &'static Regex {
    NEWLINE_RUN_REGEX.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Clean lyrics for display.
///
/// Paragraph breaks (`\n\n`) present in the input survive; bracketed annotations,
/// markdown emphasis, attribution/section lines and CJK sentence punctuation do not.
/// `clean(clean(x)) == clean(x)` for any input.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut current = clean_pass(&text);

    // Dropping punctuation can join two emphasis delimiters into a fresh span
    for _ in 0..MAX_SETTLE_PASSES {
        let next = clean_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Upper bound on extra passes; real input settles after one
const MAX_SETTLE_PASSES: usize = 8;

fn clean_pass(text: &str) -> String {
    // A sentinel already present in scraped text would turn into a bogus break
    let mut result: String = text.chars().filter(|c| *c != SENTINEL).collect();

    result = result.replace("\n\n", &SENTINEL.to_string());

    result = get_bracket_regex().replace_all(&result, "").to_string();

    result = get_bold_regex().replace_all(&result, "").to_string();
    result = get_italic_regex().replace_all(&result, "").to_string();
    result = get_underline_regex().replace_all(&result, "").to_string();

    result = markers::remove_marker_lines(&result);

    result = collapse_spaces(&result);
    result = trim_breaks(&result).to_string();

    result = rewrite_punctuation(&result);

    result = get_paragraph_run_regex()
        .replace_all(&result, SENTINEL.to_string().as_str())
        .to_string();
    result = get_newline_run_regex()
        .replace_all(&result, "\n\n")
        .to_string();

    result = result.replace(SENTINEL, "\n\n");

    result.trim().to_string()
}

fn collapse_spaces(text: &str) -> String {
    get_spaces_regex().replace_all(text, " ").into_owned()
}

fn rewrite_punctuation(text: &str) -> String {
    let result = get_full_stop_regex().replace_all(text, "\n");
    let result = get_trailing_comma_regex().replace_all(&result, "$1");
    let result = get_colon_regex().replace_all(&result, "");
    get_pause_regex().replace_all(&result, " ").into_owned()
}

/// A single line as it reads once spaces and CJK punctuation are rewritten
pub(crate) fn settled_line(line: &str) -> String {
    let mut settled = collapse_spaces(line);
    settled.push('\n');
    rewrite_punctuation(&settled)
}

/// [`clean`] for values that may be missing; `None` yields an empty string
pub fn clean_opt(text: Option<&str>) -> String {
    text.map(clean).unwrap_or_default()
}

fn trim_breaks(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == SENTINEL)
}

/// Lyrics that have been through [`clean`].
///
/// The only constructor runs the normalizer, so holding one proves the text is
/// clean and was cleaned exactly once on its way here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        Self(clean(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "single line",
        "a\nb\n\nc\nd",
        "a\n\n\n\nb",
        "[Verse 1]\nline one\nline two\n\n[Chorus]\nhallelujah\nhallelujah",
        "**Verse 1**\nAmazing grace\n*softly*\nhow sweet the sound",
        "作词：张三\n作曲：李四\n奇异恩典，何等甘甜。\n我罪已得赦免；\n\n前我失丧、今被寻回：",
        "line，\nnext，\n\nlast。",
        "句子。 另一句。\n\n第二段",
        "a  ，  b ：c ；d 、e",
        "\u{E000}already\u{E000}there\n\nok",
        "***bold***\n__under__ text\n[a[b]c]",
        "trailing。\n\n\n",
        "line\r\nwindows\r\n\r\nparagraph",
        "。，：；、",
        "x\n \ny",
        "all  rights reserved here\nline two",
        "作：词 张三\n下一行歌词",
        "lyrics，by someone\nsing on",
        "_：_x__ tail",
        "**a*x*",
    ];

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean_opt(None), "");
        assert_eq!(clean_opt(Some("")), "");
    }

    #[test]
    fn test_clean_preserves_single_paragraph_break() {
        let cleaned = clean("first line\nsecond line\n\nthird line\nfourth line");
        assert_eq!(cleaned, "first line\nsecond line\n\nthird line\nfourth line");
        assert_eq!(cleaned.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_clean_is_idempotent() {
        for sample in SAMPLES {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_clean_never_emits_sentinel() {
        for sample in SAMPLES {
            assert!(!clean(sample).contains(SENTINEL), "sentinel leaked for {:?}", sample);
        }
    }

    #[test]
    fn test_clean_drops_markers_formed_by_punctuation() {
        assert_eq!(clean("all  rights reserved here\nline two"), "line two");
        assert_eq!(clean("作：词 张三\n下一行歌词"), "下一行歌词");
        assert_eq!(clean("lyrics，by someone\nsing on"), "sing on");
    }

    #[test]
    fn test_clean_settles_spans_joined_by_punctuation() {
        assert_eq!(clean("_：_x__ tail"), "tail");
        assert_eq!(clean("**a*x*"), "");
    }

    #[test]
    fn test_clean_strips_brackets_and_emphasis() {
        assert_eq!(clean("hello [x2] world"), "hello world");
        assert_eq!(clean("**Verse**\nsing *loud* now"), "sing now");
        assert_eq!(clean("__intro__ go"), "go");
    }

    #[test]
    fn test_clean_drops_marker_lines() {
        let input = "作词：张三\nVerse 1\nline one\n© 2004 Someone\nline two";
        assert_eq!(clean(input), "line one\nline two");
    }

    #[test]
    fn test_clean_section_labels_keep_paragraphs() {
        let input = "[Verse 1]\nline one\nline two\n\n[Chorus]\nhallelujah";
        assert_eq!(clean(input), "line one\nline two\n\nhallelujah");
    }

    #[test]
    fn test_clean_cjk_punctuation() {
        assert_eq!(clean("奇异恩典，何等甘甜。我罪已得赦免"), "奇异恩典 何等甘甜\n我罪已得赦免");
        assert_eq!(clean("前我失丧，\n今被寻回"), "前我失丧\n今被寻回");
        assert_eq!(clean("主啊：求你；怜悯、我们"), "主啊求你 怜悯 我们");
    }

    #[test]
    fn test_clean_full_stop_before_newline_is_single_break() {
        assert_eq!(clean("第一句。\n第二句。"), "第一句\n第二句");
    }

    #[test]
    fn test_clean_collapses_newline_runs() {
        assert_eq!(clean("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean("a。\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_collapses_spaces() {
        assert_eq!(clean("  a    b   "), "a b");
    }

    #[test]
    fn test_clean_strips_preexisting_sentinel() {
        assert_eq!(clean("a\u{E000}b"), "ab");
    }

    #[test]
    fn test_clean_windows_line_endings() {
        assert_eq!(clean("a\r\nb\r\n\r\nc"), "a\nb\n\nc");
    }

    const TOKENS: &[&str] = &[
        "a", "b", "x", "词", "作", "曲", " ", "  ", "\n", "\n\n", "\r\n", "。", "，", "：", "；",
        "、", "*", "**", "_", "__", "[", "]", "©", "\u{E000}", "all rights reserved", "verse",
        "lyrics", "by",
    ];

    fn lyric_like() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(TOKENS), 0..40).prop_map(|tokens| tokens.concat())
    }

    fn plain_paragraph() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-h]{1,8}", 1..6).prop_map(|words| words.join(" "))
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(text in lyric_like()) {
            let once = clean(&text);
            let twice = clean(&once);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_clean_never_emits_sentinel(text in lyric_like()) {
            prop_assert!(!clean(&text).contains(SENTINEL));
        }

        #[test]
        fn prop_clean_keeps_one_paragraph_break(
            first in plain_paragraph(),
            second in plain_paragraph(),
        ) {
            let cleaned = clean(&format!("{}\n\n{}", first, second));
            prop_assert_eq!(cleaned.matches("\n\n").count(), 1);
            prop_assert_eq!(cleaned, format!("{}\n\n{}", first, second));
        }
    }

    #[test]
    fn test_normalized_text_runs_clean() {
        let text = NormalizedText::new("[Chorus]\nhello  world");
        assert_eq!(text.as_str(), "hello world");
        assert_eq!(text.to_string(), "hello world");
        assert!(!text.is_empty());
    }
}
