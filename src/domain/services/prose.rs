//! Word and sentence helpers shared by estimation, rendering and validation

/// Title of the closing section of every rendered prompt
pub const TASK_SECTION: &str = "CHAPTER TASK";

/// Section header line as it appears in rendered prompts
pub fn section_header(title: &str) -> String {
    format!("=== {} ===", title)
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The leading whole sentences of `text` that fit within `max_words`
///
/// The first sentence is always kept, even when it alone is longer than
/// `max_words`, so the result is never cut mid-sentence. Whitespace is
/// normalized to single spaces.
pub fn leading_sentences(text: &str, max_words: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for sentence in sentences(text) {
        if !kept.is_empty() && kept.len() + sentence.len() > max_words {
            break;
        }
        kept.extend(sentence);
    }
    kept.join(" ")
}

/// The trailing whole sentences of `text` that fit within `max_words`
///
/// Mirror of `leading_sentences`: the last sentence is always kept.
pub fn closing_sentences(text: &str, max_words: usize) -> String {
    let mut kept: Vec<Vec<&str>> = Vec::new();
    let mut words = 0;
    for sentence in sentences(text).into_iter().rev() {
        if !kept.is_empty() && words + sentence.len() > max_words {
            break;
        }
        words += sentence.len();
        kept.push(sentence);
    }
    kept.into_iter().rev().flatten().collect::<Vec<_>>().join(" ")
}

fn sentences(text: &str) -> Vec<Vec<&str>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        if ends_sentence(word) {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end_matches(|c: char| {
        matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '」' | '』')
    });
    trimmed.ends_with(|c: char| matches!(c, '.' | '!' | '?' | '…'))
}
