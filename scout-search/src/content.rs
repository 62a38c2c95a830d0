//! Rendered-page text extraction.
//!
//! Turns the markup of a rendered page into a single line of readable
//! text: boilerplate regions are dropped, whitespace is flattened, and the
//! result is capped at a character budget. Extraction never fails; markup
//! that cannot be parsed meaningfully simply yields less text.

use scraper::{ElementRef, Html};

/// Elements removed together with everything inside them.
const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Suffix appended when text is cut at the length limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Extract clean text from rendered markup, capped at `max_length` characters.
///
/// Text longer than `max_length` is cut to its first `max_length`
/// characters and [`TRUNCATION_MARKER`] is appended, so the returned string
/// may be up to three characters longer than the limit.
pub fn extract_text(markup: &str, max_length: usize) -> String {
    let document = Html::parse_document(markup);

    let mut raw = String::with_capacity(markup.len() / 2);
    collect_text(document.root_element(), &mut raw);

    truncate_chars(&flatten_whitespace(&raw), max_length)
}

/// Concatenate every text node under `element`, skipping stripped subtrees.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !STRIPPED_TAGS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

/// Trim each line, break lines on runs of two spaces, drop empty pieces,
/// and join what is left with single spaces.
fn flatten_whitespace(raw: &str) -> String {
    raw.split(is_line_break)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Cut `text` to `max_length` characters, marking the cut.
fn truncate_chars(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_owned();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_owned(),
    }
}
