use once_cell::sync::Lazy;
use regex::Regex;

use crate::segment::Segment;

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern compiles"));

// Bold first so `**x**` is not claimed as an italic `*` pair. Left-to-right,
// first match wins, no nesting; an unmatched asterisk stays literal.
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*[^*]+\*\*|\*[^*]+\*").expect("emphasis pattern compiles"));

/// Scans a non-fence run: inline code spans first, then paragraph/emphasis
/// structure in the remaining plain text. Code span content is final — it is
/// never re-parsed.
pub(crate) fn scan_inline(text: &str, segments: &mut Vec<Segment>) {
    let mut last_end = 0;

    for captures in INLINE_CODE.captures_iter(text) {
        let matched = captures.get(0).expect("capture group 0 always present");
        if matched.start() > last_end {
            scan_plain(&text[last_end..matched.start()], segments);
        }

        let span = captures.get(1).expect("inline code capture present");
        segments.push(Segment::InlineCode(span.as_str().to_string()));
        last_end = matched.end();
    }

    if last_end < text.len() {
        scan_plain(&text[last_end..], segments);
    }
}

// Paragraphs split on blank lines; single newlines inside a paragraph are
// explicit line breaks, not paragraph breaks.
fn scan_plain(text: &str, segments: &mut Vec<Segment>) {
    for (paragraph_index, paragraph) in text.split("\n\n").enumerate() {
        if paragraph_index > 0 {
            segments.push(Segment::ParagraphBreak);
        }

        for (line_index, line) in paragraph.split('\n').enumerate() {
            if line_index > 0 {
                segments.push(Segment::LineBreak);
            }
            scan_emphasis(line, segments);
        }
    }
}

fn scan_emphasis(line: &str, segments: &mut Vec<Segment>) {
    let mut last_end = 0;

    for matched in EMPHASIS.find_iter(line) {
        if matched.start() > last_end {
            segments.push(Segment::Text(line[last_end..matched.start()].to_string()));
        }

        let span = matched.as_str();
        if let Some(inner) = span.strip_prefix("**").and_then(|s| s.strip_suffix("**")) {
            segments.push(Segment::Bold(inner.to_string()));
        } else {
            let inner = &span[1..span.len() - 1];
            segments.push(Segment::Italic(inner.to_string()));
        }

        last_end = matched.end();
    }

    if last_end < line.len() {
        segments.push(Segment::Text(line[last_end..].to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::scan_inline;
    use crate::segment::Segment;

    fn scan(text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        scan_inline(text, &mut segments);
        segments
    }

    #[test]
    fn inline_code_shields_emphasis_markers() {
        assert_eq!(
            scan("use `**argv**` here"),
            vec![
                Segment::Text("use ".to_string()),
                Segment::InlineCode("**argv**".to_string()),
                Segment::Text(" here".to_string()),
            ]
        );
    }

    #[test]
    fn bold_and_italic_match_left_to_right() {
        assert_eq!(
            scan("**a***b*"),
            vec![
                Segment::Bold("a".to_string()),
                Segment::Italic("b".to_string()),
            ]
        );
    }

    #[test]
    fn lone_asterisk_stays_literal() {
        assert_eq!(scan("2 * 3 = 6"), vec![Segment::Text("2 * 3 = 6".to_string())]);
    }

    #[test]
    fn unterminated_bold_recovers_inner_italic() {
        // `**a*` has no closing bold pair; the scan falls back to the
        // italic span starting at the second asterisk.
        assert_eq!(
            scan("**a*"),
            vec![
                Segment::Text("*".to_string()),
                Segment::Italic("a".to_string()),
            ]
        );
    }

    #[test]
    fn paragraphs_and_line_breaks_are_distinct() {
        assert_eq!(
            scan("one\ntwo\n\nthree"),
            vec![
                Segment::Text("one".to_string()),
                Segment::LineBreak,
                Segment::Text("two".to_string()),
                Segment::ParagraphBreak,
                Segment::Text("three".to_string()),
            ]
        );
    }
}
