/// One typed unit of formatted message output.
///
/// Segments appear in the same left-to-right order as their source text.
/// `Text`, `Bold`, `Italic`, and `InlineCode` carry their content with the
/// marker tokens stripped; `LineBreak` stands for a single `\n` inside a
/// paragraph and `ParagraphBreak` for a `\n\n` boundary, so concatenating
/// segment content (with those two mapped back to their newlines)
/// reconstructs the source minus markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text run. Never empty.
    Text(String),
    /// `**bold**` span content.
    Bold(String),
    /// `*italic*` span content.
    Italic(String),
    /// Single-backtick code span content, never re-parsed for emphasis.
    InlineCode(String),
    /// A single newline inside a paragraph.
    LineBreak,
    /// A blank-line paragraph boundary.
    ParagraphBreak,
    /// Triple-backtick fenced block. `language` defaults to `"text"` when
    /// the opening fence carries no tag; `body` is trimmed of surrounding
    /// whitespace and may be empty.
    CodeBlock { language: String, body: String },
}

impl Segment {
    /// Returns the textual content carried by this segment, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text(text)
            | Self::Bold(text)
            | Self::Italic(text)
            | Self::InlineCode(text) => Some(text),
            Self::CodeBlock { body, .. } => Some(body),
            Self::LineBreak | Self::ParagraphBreak => None,
        }
    }
}
