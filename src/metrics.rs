//! Text statistics and readability metrics for the analysis pipeline.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::AnalysisError;

/// Minimum accepted input length in characters.
pub const MIN_TEXT_LEN: usize = 10;
/// Maximum accepted input length in characters.
pub const MAX_TEXT_LEN: usize = 50_000;

/// Flesch coefficients: base, sentence-length weight, syllable weight.
const FLESCH_BASE: f64 = 206.835;
const FLESCH_SENTENCE_WEIGHT: f64 = 1.015;
const FLESCH_SYLLABLE_WEIGHT: f64 = 84.6;

/// Rejects text outside the accepted length range before any upstream call.
pub fn validate_text_length(text: &str) -> Result<(), AnalysisError> {
    if text.chars().count() < MIN_TEXT_LEN {
        return Err(AnalysisError::Validation(format!(
            "Text must be at least {MIN_TEXT_LEN} characters long"
        )));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AnalysisError::Validation(format!(
            "Text is too long (max {MAX_TEXT_LEN} characters)"
        )));
    }
    Ok(())
}

/// Readability figures derived from the Flesch Reading Ease approximation.
#[derive(Debug, Clone, Serialize)]
pub struct Readability {
    /// Flesch Reading Ease, clamped to [0, 100] and rounded to an integer.
    pub flesch_score: f64,
    /// Flesch-Kincaid grade level, rounded to one decimal.
    pub flesch_grade: f64,
    /// Ordinal difficulty label for the score.
    pub readability_level: &'static str,
}

/// Structural element counts, additive across markdown and HTML notations.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StructureCounts {
    /// Markdown `#` heading lines plus `<h1>..<h6>` tags.
    pub heading_count: usize,
    /// Markdown bullet lines plus `<ul>`/`<ol>` tags.
    pub list_count: usize,
    /// Markdown link syntax plus `<a>` tags.
    pub link_count: usize,
    /// Markdown image syntax plus `<img>` tags.
    pub image_count: usize,
}

/// Aggregate statistics for one submitted document.
#[derive(Debug, Clone, Serialize)]
pub struct ContentMetrics {
    /// Whitespace-delimited non-empty tokens after whitespace collapse.
    pub word_count: usize,
    /// Non-empty segments split on `.`/`!`/`?` runs.
    pub sentence_count: usize,
    /// Non-empty blank-line-separated segments, floor 1.
    pub paragraph_count: usize,
    /// `word_count / max(sentence_count, 1)`.
    pub avg_words_per_sentence: f64,
    /// `sentence_count / max(paragraph_count, 1)`.
    pub avg_sentences_per_paragraph: f64,
    /// Flesch approximation over the whole text.
    pub readability: Readability,
    /// Markdown/HTML structural counts.
    pub structure: StructureCounts,
}

impl ContentMetrics {
    /// Computes every metric for one raw text document.
    pub fn compute(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        let sentence_count = count_sentences(text);
        let paragraph_count = count_paragraphs(text);
        let avg_words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;
        let avg_sentences_per_paragraph = sentence_count as f64 / paragraph_count.max(1) as f64;

        Self {
            word_count,
            sentence_count,
            paragraph_count,
            avg_words_per_sentence,
            avg_sentences_per_paragraph,
            readability: readability(text, word_count, avg_words_per_sentence),
            structure: structure_counts(text),
        }
    }
}

/// Splits the text into paragraphs on blank-line boundaries.
pub fn paragraphs(text: &str) -> Vec<&str> {
    patterns()
        .paragraph_break
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

fn count_paragraphs(text: &str) -> usize {
    paragraphs(text).len().max(1)
}

fn readability(text: &str, word_count: usize, avg_words_per_sentence: f64) -> Readability {
    // Vowel-run approximation, not a true syllabifier.
    let syllable_count = patterns().vowel_run.find_iter(text).count();
    let avg_syllables_per_word = syllable_count as f64 / word_count.max(1) as f64;

    let raw = FLESCH_BASE
        - FLESCH_SENTENCE_WEIGHT * avg_words_per_sentence
        - FLESCH_SYLLABLE_WEIGHT * avg_syllables_per_word;
    let flesch_score = raw.clamp(0.0, 100.0).round();
    let flesch_grade =
        ((0.39 * avg_words_per_sentence + 11.8 * avg_syllables_per_word - 15.59) * 10.0).round()
            / 10.0;

    Readability {
        flesch_score,
        flesch_grade,
        readability_level: readability_level(flesch_score),
    }
}

fn readability_level(flesch_score: f64) -> &'static str {
    if flesch_score >= 90.0 {
        "Very Easy"
    } else if flesch_score >= 80.0 {
        "Easy"
    } else if flesch_score >= 70.0 {
        "Fairly Easy"
    } else if flesch_score >= 60.0 {
        "Standard"
    } else if flesch_score >= 50.0 {
        "Fairly Difficult"
    } else if flesch_score >= 30.0 {
        "Difficult"
    } else {
        "Very Difficult"
    }
}

fn structure_counts(text: &str) -> StructureCounts {
    let p = patterns();
    StructureCounts {
        heading_count: p.md_heading.find_iter(text).count()
            + p.html_heading.find_iter(text).count(),
        list_count: p.md_bullet.find_iter(text).count() + p.html_list.find_iter(text).count(),
        link_count: p.md_link.find_iter(text).count() + p.html_anchor.find_iter(text).count(),
        image_count: p.md_image.find_iter(text).count() + p.html_image.find_iter(text).count(),
    }
}

struct Patterns {
    paragraph_break: Regex,
    vowel_run: Regex,
    md_heading: Regex,
    html_heading: Regex,
    md_bullet: Regex,
    html_list: Regex,
    md_link: Regex,
    html_anchor: Regex,
    md_image: Regex,
    html_image: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            paragraph_break: Regex::new(r"\n\s*\n").expect("paragraph pattern"),
            vowel_run: Regex::new(r"[aeiouyAEIOUY]+").expect("vowel pattern"),
            md_heading: Regex::new(r"(?m)^#{1,6}\s").expect("md heading pattern"),
            html_heading: Regex::new(r"(?i)<h[1-6][^>]*>").expect("html heading pattern"),
            md_bullet: Regex::new(r"(?m)^\s*[-*+]\s").expect("md bullet pattern"),
            html_list: Regex::new(r"(?i)<[uo]l[^>]*>").expect("html list pattern"),
            md_link: Regex::new(r"\[.*?\]\(.*?\)").expect("md link pattern"),
            html_anchor: Regex::new(r"(?i)<a\s[^>]*>").expect("html anchor pattern"),
            md_image: Regex::new(r"!\[.*?\]\(.*?\)").expect("md image pattern"),
            html_image: Regex::new(r"(?i)<img\s[^>]*>").expect("html image pattern"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_lengths() {
        assert!(validate_text_length("too short").is_err());
        assert!(validate_text_length(&"a".repeat(MAX_TEXT_LEN + 1)).is_err());
        assert!(validate_text_length("long enough to pass").is_ok());
    }

    #[test]
    fn counts_words_sentences_paragraphs() {
        let text = "One two three. Four five!\n\nSix seven? Eight.";
        let metrics = ContentMetrics::compute(text);
        assert_eq!(metrics.word_count, 8);
        assert_eq!(metrics.sentence_count, 4);
        assert_eq!(metrics.paragraph_count, 2);
        assert_eq!(metrics.avg_words_per_sentence, 2.0);
        assert_eq!(metrics.avg_sentences_per_paragraph, 2.0);
    }

    #[test]
    fn paragraph_count_floors_at_one() {
        let metrics = ContentMetrics::compute("single block of text with no breaks");
        assert_eq!(metrics.paragraph_count, 1);
    }

    #[test]
    fn single_sentence_awps_equals_word_count() {
        let words: Vec<String> = (0..300).map(|i| format!("w{i}")).collect();
        let text = format!("{}.", words.join(" "));
        let metrics = ContentMetrics::compute(&text);
        assert_eq!(metrics.sentence_count, 1);
        assert_eq!(metrics.avg_words_per_sentence, metrics.word_count as f64);
    }

    #[test]
    fn flesch_score_stays_clamped() {
        // A single long sentence of dense polysyllabic tokens drives the raw
        // formula negative; the reported score must not follow it.
        let hard = "incomprehensibility ".repeat(60);
        let metrics = ContentMetrics::compute(&hard);
        assert!(metrics.readability.flesch_score >= 0.0);
        assert!(metrics.readability.flesch_score <= 100.0);
    }

    #[test]
    fn readability_labels_are_monotonic() {
        let thresholds = [95.0, 85.0, 75.0, 65.0, 55.0, 40.0, 10.0];
        let labels: Vec<&str> = thresholds.iter().map(|&s| readability_level(s)).collect();
        assert_eq!(
            labels,
            vec![
                "Very Easy",
                "Easy",
                "Fairly Easy",
                "Standard",
                "Fairly Difficult",
                "Difficult",
                "Very Difficult",
            ]
        );
    }

    #[test]
    fn structural_counts_are_additive_across_notations() {
        let text = "# Title\n\n<h2>Sub</h2>\n\n- item\n<ul><li>x</li></ul>\n\n[link](https://a.test) <a href=\"b\">b</a>\n![img](c.png) <img src=\"d.png\">";
        let counts = structure_counts(text);
        assert_eq!(counts.heading_count, 2);
        assert_eq!(counts.list_count, 2);
        assert_eq!(counts.image_count, 2);
        // Markdown image syntax also matches the plain link pattern, so links
        // count the anchor, the markdown link, and the image's bracket form.
        assert_eq!(counts.link_count, 3);
    }
}
