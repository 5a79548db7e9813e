//! Segment-based message formatting for transcript-style chat clients.
//!
//! [`format`] converts one raw message string into an ordered sequence of
//! typed [`Segment`]s: fenced code blocks, inline code spans, bold/italic
//! emphasis, and paragraph/line structure. The function is pure and total —
//! malformed markup (an unterminated fence, a lone asterisk) degrades to
//! literal text instead of failing, and no input characters are dropped
//! beyond the marker tokens themselves.
//!
//! Renderers own all presentation concerns; this crate never interprets
//! segment content or emits markup of its own.

mod fences;
mod inline;
mod segment;

pub use segment::Segment;

/// Formats raw message text into display segments.
///
/// Recognition happens in three passes, outermost first: fenced code blocks,
/// then inline code spans, then per-line emphasis inside the remaining plain
/// text. Earlier passes shield their content from later ones, so backticks
/// inside a fence and asterisks inside an inline code span stay literal.
#[must_use]
pub fn format(text: &str) -> Vec<Segment> {
    fences::scan_fences(text)
}
