use regex::Regex;
use scraper::{ElementRef, Node};
use std::sync::OnceLock;

/// Elements that start on a fresh line when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose content is never lyric text
const SKIPPED_ELEMENTS: &[&str] = &[
    "button", "iframe", "noscript", "script", "select", "style", "svg", "template",
];

static HTML_WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static BLANK_RUN_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_html_whitespace_regex() -> &'static Regex {
    HTML_WHITESPACE_REGEX.get_or_init(|| Regex::new(r"[ \t\r\n\x0C\x{A0}]+").unwrap())
}

fn get_blank_run_regex() -> &'static Regex {
    BLANK_RUN_REGEX.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Render an element the way a browser would lay it out as plain text.
///
/// Source formatting whitespace collapses to single spaces; `<br>` and block
/// boundaries become newlines and a closing `<p>` leaves a blank line.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    render(element, &mut raw, element.value().name() == "pre");
    tidy(&raw)
}

/// True when the element holds non-blank text of its own, not just nested markup
pub fn has_direct_text(element: ElementRef<'_>) -> bool {
    element.children().any(|child| match child.value() {
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

/// True when some element below this one starts its own block
pub fn has_block_descendant(element: ElementRef<'_>) -> bool {
    element.descendants().skip(1).any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| BLOCK_ELEMENTS.contains(&el.name()))
    })
}

/// A block whose text is its own: either it has text nodes directly, or all of
/// its text sits in inline markup such as `<font>` or `<span>` lines.
/// Page wrappers that only nest other blocks are not text-bearing.
pub fn is_text_bearing(element: ElementRef<'_>) -> bool {
    has_direct_text(element) || !has_block_descendant(element)
}

fn render(element: ElementRef<'_>, out: &mut String, preformatted: bool) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if preformatted {
                    out.push_str(text);
                } else {
                    push_collapsed(out, text);
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    ensure_line_break(out);
                }
                render(child_ref, out, preformatted || name == "pre");
                if name == "p" {
                    out.push_str("\n\n");
                } else if block {
                    ensure_line_break(out);
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let collapsed = get_html_whitespace_regex().replace_all(text, " ");
    let at_line_start = out.is_empty() || out.ends_with('\n');
    let text = if at_line_start || out.ends_with(' ') {
        collapsed.trim_start()
    } else {
        collapsed.as_ref()
    };
    out.push_str(text);
}

fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn tidy(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let joined = lines.join("\n");
    get_blank_run_regex()
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn render_first(html: &str, selector: &str) -> String {
        let document = Html::parse_document(html);
        let selector = Selector::parse(selector).unwrap();
        element_text(document.select(&selector).next().unwrap())
    }

    #[test]
    fn test_element_text_br_and_whitespace() {
        let html = "<div id='l'>\n   line one<br>\n   line   two<br/>line three\n</div>";
        assert_eq!(render_first(html, "#l"), "line one\nline two\nline three");
    }

    #[test]
    fn test_element_text_paragraphs() {
        let html = "<div id='l'><p>a<br>b</p><p>c<br>d</p></div>";
        assert_eq!(render_first(html, "#l"), "a\nb\n\nc\nd");
    }

    #[test]
    fn test_element_text_skips_scripts() {
        let html = "<div id='l'>words<script>var x = 1;</script> more</div>";
        assert_eq!(render_first(html, "#l"), "words more");
    }

    #[test]
    fn test_element_text_inline_markup() {
        let html = "<div id='l'>sing <b>loud</b> and <a href='#'>clear</a></div>";
        assert_eq!(render_first(html, "#l"), "sing loud and clear");
    }

    #[test]
    fn test_has_direct_text() {
        let document = Html::parse_document("<div id='a'><p>text</p></div><div id='b'>own</div>");
        let a = Selector::parse("#a").unwrap();
        let b = Selector::parse("#b").unwrap();
        assert!(!has_direct_text(document.select(&a).next().unwrap()));
        assert!(has_direct_text(document.select(&b).next().unwrap()));
    }

    #[test]
    fn test_is_text_bearing() {
        let document = Html::parse_document(
            "<div id='wrap'><p>text</p></div>\
             <div id='inline'><font>one</font><br><span>two</span></div>\
             <div id='mixed'>own <div>nested</div></div>",
        );
        let pick = |id: &str| {
            let selector = Selector::parse(id).unwrap();
            document.select(&selector).next().unwrap()
        };
        assert!(!is_text_bearing(pick("#wrap")));
        assert!(is_text_bearing(pick("#inline")));
        assert!(is_text_bearing(pick("#mixed")));
        assert!(has_block_descendant(pick("#mixed")));
    }
}
