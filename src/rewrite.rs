//! Keyword insertion and emphasis for submitted text.

use std::time::{SystemTime, UNIX_EPOCH};

use regex::RegexBuilder;

/// Number of contextual phrase templates available for insertion.
pub const PHRASE_TEMPLATE_COUNT: usize = 4;

/// Inserts or emphasizes a keyword using a pseudorandom phrase template.
pub fn insert_keyword(text: &str, keyword: &str) -> String {
    insert_keyword_with(text, keyword, |templates| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as usize)
            .unwrap_or(0)
            % templates
    })
}

/// Inserts or emphasizes a keyword with a caller-supplied template picker.
///
/// When the keyword is absent (case-insensitive), a contextual phrase is
/// prepended to the middle sentence; single-sentence text gets an appended
/// sentence instead. When the keyword is already present, every
/// case-insensitive occurrence is wrapped in `**` emphasis markers and the
/// rest of the text is left untouched.
///
/// `pick` receives the template count and must return an index below it; it
/// exists so tests can pin a specific phrasing.
pub fn insert_keyword_with(
    text: &str,
    keyword: &str,
    pick: impl FnOnce(usize) -> usize,
) -> String {
    if text.to_lowercase().contains(&keyword.to_lowercase()) {
        return emphasize_occurrences(text, keyword);
    }

    let mut sentences = split_sentences(text);
    if sentences.len() > 1 {
        let middle = sentences.len() / 2;
        let phrase = insertion_phrase(pick(PHRASE_TEMPLATE_COUNT), keyword);
        sentences[middle] = format!("{phrase} {}", sentences[middle].to_lowercase());
        sentences.join(" ")
    } else {
        format!("{text} This is related to {keyword}.")
    }
}

/// Wraps every case-insensitive occurrence of the keyword in `**` markers.
fn emphasize_occurrences(text: &str, keyword: &str) -> String {
    let pattern = RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .expect("escaped keyword pattern");
    pattern
        .replace_all(text, |caps: &regex::Captures<'_>| format!("**{}**", &caps[0]))
        .into_owned()
}

fn insertion_phrase(index: usize, keyword: &str) -> String {
    match index {
        0 => format!("This relates to {keyword}, which"),
        1 => format!("When considering {keyword},"),
        2 => format!("The concept of {keyword}"),
        _ => format!("In terms of {keyword},"),
    }
}

/// Splits text into sentences, keeping terminator punctuation attached.
///
/// A boundary is a `.`/`!`/`?` run followed by whitespace; the whitespace is
/// consumed by the split.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (_, c) = chars[i];
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(split_at, next)) = chars.get(i + 1) {
                if next.is_whitespace() {
                    sentences.push(text[start..split_at].to_string());
                    let mut j = i + 1;
                    while j < chars.len() && chars[j].1.is_whitespace() {
                        j += 1;
                    }
                    start = chars.get(j).map(|&(idx, _)| idx).unwrap_or(text.len());
                    i = j;
                    continue;
                }
            }
        }
        i += 1;
    }

    if start < text.len() {
        sentences.push(text[start..].to_string());
    }
    sentences
}
