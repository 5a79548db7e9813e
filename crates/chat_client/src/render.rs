//! ANSI rendering of formatted message segments.

use plume::Segment;

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const CODE_INDENT: &str = "    ";

/// Renders a message body for terminal display.
pub fn render_message(content: &str) -> String {
    render_segments(&plume::format(content))
}

pub fn render_segments(segments: &[Segment]) -> String {
    let mut output = String::new();

    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Bold(text) => {
                output.push_str(BOLD);
                output.push_str(text);
                output.push_str(RESET);
            }
            Segment::Italic(text) => {
                output.push_str(ITALIC);
                output.push_str(text);
                output.push_str(RESET);
            }
            Segment::InlineCode(text) => {
                output.push_str(CYAN);
                output.push_str(text);
                output.push_str(RESET);
            }
            Segment::LineBreak => output.push('\n'),
            Segment::ParagraphBreak => output.push_str("\n\n"),
            Segment::CodeBlock { language, body } => {
                render_code_block(&mut output, language, body);
            }
        }
    }

    output
}

fn render_code_block(output: &mut String, language: &str, body: &str) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }

    output.push_str(DIM);
    output.push_str(language);
    output.push_str(RESET);
    output.push('\n');

    for line in body.lines() {
        output.push_str(CODE_INDENT);
        output.push_str(line);
        output.push('\n');
    }
}
