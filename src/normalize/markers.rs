use super::{settled_line, SENTINEL};

/// Attribution and copyright words. A line containing any of these is dropped.
const ATTRIBUTION_MARKERS: &[&str] = &[
    "作词",
    "作詞",
    "作曲",
    "编曲",
    "編曲",
    "词：",
    "詞：",
    "曲：",
    "词:",
    "詞:",
    "曲:",
    "版权",
    "版權",
    "©",
    "copyright",
    "all rights reserved",
    "lyrics by",
    "music by",
    "written by",
    "composed by",
    "arranged by",
];

/// Section labels that slides never show.
/// Substring matching over-deletes lyric lines that merely mention one of these words.
const SECTION_MARKERS: &[&str] = &[
    "verse",
    "chorus",
    "bridge",
    "interlude",
    "outro",
    "主歌",
    "副歌",
    "桥段",
    "橋段",
    "间奏",
    "間奏",
    "尾奏",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Line,
    Paragraph,
}

/// True when the line carries an attribution or section marker, either as written
/// or once its spaces and CJK punctuation are rewritten
pub fn is_marker_line(line: &str) -> bool {
    contains_marker(line) || contains_marker(&settled_line(line))
}

fn contains_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ATTRIBUTION_MARKERS
        .iter()
        .chain(SECTION_MARKERS)
        .any(|marker| lowered.contains(marker))
}

/// Drop every line containing a marker.
///
/// Lines are delimited by `\n` and by the paragraph sentinel. When a dropped line
/// ended a paragraph, the paragraph break moves onto the previous kept line.
pub fn remove_marker_lines(text: &str) -> String {
    let mut kept: Vec<(&str, Option<Separator>)> = Vec::new();

    for (line, separator) in split_lines(text) {
        if !is_marker_line(line) {
            kept.push((line, separator));
            continue;
        }

        if separator == Some(Separator::Paragraph) {
            if let Some(last) = kept.last_mut() {
                last.1 = Some(Separator::Paragraph);
            }
        }
    }

    let mut result = String::with_capacity(text.len());
    for (line, separator) in kept {
        result.push_str(line);
        match separator {
            Some(Separator::Line) => result.push('\n'),
            Some(Separator::Paragraph) => result.push(SENTINEL),
            None => {}
        }
    }
    result
}

fn split_lines(text: &str) -> Vec<(&str, Option<Separator>)> {
    let mut lines = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        let separator = match ch {
            '\n' => Separator::Line,
            SENTINEL => Separator::Paragraph,
            _ => continue,
        };
        lines.push((&text[start..idx], Some(separator)));
        start = idx + ch.len_utf8();
    }
    lines.push((&text[start..], None));

    lines
}
