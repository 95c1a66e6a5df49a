//! Turning resolved text into styled text-box content.

use crate::catalog::TextStyle;
use lifestyle_types::{Font, Paragraph, StyledText, TextRun};

/// Words rendered bold in [`TextStyle::SeverityKeywords`] blocks.
pub const SEVERITY_KEYWORDS: [&str; 4] = ["Low", "Mild", "Moderate", "High"];

/// Formats `text` (newline-separated lines) in Arial at `size_pt`.
///
/// Empty input produces empty content, never an empty paragraph.
pub fn style_text(text: &str, style: TextStyle, size_pt: f32) -> StyledText {
    let lines = text.lines().filter(|line| !line.trim().is_empty());
    let paragraphs = match style {
        TextStyle::Plain => lines
            .map(|line| Paragraph::single(line, Font::arial(size_pt)))
            .collect(),
        TextStyle::SeverityKeywords => lines.map(|line| keyword_paragraph(line, size_pt)).collect(),
    };
    StyledText { paragraphs }
}

/// Plain paragraphs from pre-split lines with an explicit font.
pub fn lines_with_font<I, S>(lines: I, font: &Font) -> StyledText
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StyledText {
        paragraphs: lines
            .into_iter()
            .map(|line| Paragraph::single(line, font.clone()))
            .collect(),
    }
}

fn keyword_paragraph(line: &str, size_pt: f32) -> Paragraph {
    let words: Vec<&str> = line.split_whitespace().collect();
    let last = words.len().saturating_sub(1);
    let runs = words
        .iter()
        .enumerate()
        .map(|(idx, word)| {
            let text = if idx == last {
                (*word).to_string()
            } else {
                format!("{word} ")
            };
            TextRun {
                text,
                font: Font::arial(size_pt).bold(is_severity_keyword(word)),
            }
        })
        .collect();
    Paragraph { runs }
}

fn is_severity_keyword(word: &str) -> bool {
    let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
    SEVERITY_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(bare))
}
