//! Loose section extraction from model-written world-building text
//!
//! Models format headers however they like ("GEOGRAPHY:", "Geography -",
//! "1. Geography"), so matching is by keyword, case-insensitive, anywhere in
//! the text. A section runs until a blank line followed by a new heading.

/// Body of the first section introduced by any of `keywords`, tried in order
///
/// Empty when no keyword matches.
pub fn extract_section(text: &str, keywords: &[&str]) -> String {
    keywords
        .iter()
        .find_map(|keyword| body_after(text, keyword).map(|rest| until_next_heading(rest).trim()))
        .unwrap_or_default()
        .to_string()
}

/// Rest of the line following the first of `keywords`, tried in order
pub fn extract_field(text: &str, keywords: &[&str]) -> String {
    keywords
        .iter()
        .find_map(|keyword| {
            body_after(text, keyword)
                .map(|rest| rest.lines().next().unwrap_or_default().trim())
                .filter(|line| !line.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}

/// Text after the first occurrence of `keyword` that is followed by a colon
/// or whitespace, with those separators skipped
fn body_after<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if keyword.is_empty() {
        return None;
    }
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let haystack = text.to_ascii_lowercase();
    let needle = keyword.to_ascii_lowercase();

    let mut from = 0;
    while let Some(found) = haystack[from..].find(&needle) {
        let end = from + found + needle.len();
        let rest = &text[end..];
        let body = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        if body.len() < rest.len() && !body.is_empty() {
            return Some(body);
        }
        from = end;
    }
    None
}

fn until_next_heading(body: &str) -> &str {
    let mut from = 0;
    while let Some(found) = body[from..].find("\n\n") {
        let at = from + found;
        let next = body[at..].trim_start_matches('\n');
        if next.starts_with(|c: char| c.is_alphabetic() || c == '#') {
            return &body[..at];
        }
        from = at + 2;
    }
    body
}
