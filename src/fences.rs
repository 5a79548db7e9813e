use once_cell::sync::Lazy;
use regex::Regex;

use crate::inline;
use crate::segment::Segment;

/// Language tag reported for fences with no tag of their own.
pub(crate) const DEFAULT_LANGUAGE: &str = "text";

// Opening fence, optional language tag, mandatory newline, lazy body up to
// the closing fence. An opening fence with no closing partner never matches
// and falls through as literal text.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(\w+)?\n((?s:.*?))```").expect("fence pattern compiles"));

pub(crate) fn scan_fences(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_end = 0;

    for captures in FENCE.captures_iter(text) {
        let matched = captures.get(0).expect("capture group 0 always present");
        if matched.start() > last_end {
            inline::scan_inline(&text[last_end..matched.start()], &mut segments);
        }

        let language = captures
            .get(1)
            .map(|tag| tag.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let body = captures
            .get(2)
            .map(|body| body.as_str().trim().to_string())
            .unwrap_or_default();

        segments.push(Segment::CodeBlock { language, body });
        last_end = matched.end();
    }

    if last_end < text.len() {
        inline::scan_inline(&text[last_end..], &mut segments);
    }

    segments
}
