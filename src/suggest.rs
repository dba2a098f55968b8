//! Title, meta-description, and target-keyword suggestions for the text
//! pipeline response.

use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::keywords::KeywordCandidate;
use crate::metrics::paragraphs;

/// Search-result display limit the meta description is trimmed to.
const META_DESCRIPTION_MAX: usize = 160;
/// Below this length the description gets a keyword sentence appended.
const META_DESCRIPTION_MIN: usize = 120;

/// Builds five title templates around the two strongest keywords.
pub fn title_suggestions(keywords: &[KeywordCandidate]) -> Vec<String> {
    let first = keywords.first().map(|k| k.text.as_str());
    let second = keywords.get(1).map(|k| k.text.as_str());
    let year = Utc::now().year();

    vec![
        format!(
            "{} Guide: {}",
            first.unwrap_or("Complete"),
            second.unwrap_or("Everything You Need to Know")
        ),
        format!("How to Master {} in {year}", first.unwrap_or("Your Topic")),
        format!(
            "{} Tips for {} | Expert Guide",
            first.unwrap_or("Essential"),
            second.unwrap_or("Success")
        ),
        format!(
            "The Ultimate {} for {}",
            first.unwrap_or("Resource"),
            second.unwrap_or("Professionals")
        ),
        format!(
            "{} Strategies for {}",
            first.unwrap_or("Advanced"),
            second.unwrap_or("Growth")
        ),
    ]
}

/// Derives a meta-description suggestion from the opening sentences.
///
/// Truncates at 157 characters plus an ellipsis when the opening runs long;
/// pads short descriptions with a keyword mention.
pub fn meta_description(text: &str, keywords: &[KeywordCandidate]) -> String {
    let opening: Vec<&str> = text
        .split(['.', '!', '?'])
        .take(3)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let mut description = opening.join(". ").trim().to_string();

    if description.chars().count() > META_DESCRIPTION_MAX {
        description = description.chars().take(157).collect::<String>() + "...";
    }

    if description.chars().count() < META_DESCRIPTION_MIN && !keywords.is_empty() {
        let mention: Vec<&str> = keywords.iter().take(2).map(|k| k.text.as_str()).collect();
        description.push_str(&format!(" Learn about {}.", mention.join(" and ")));
    }

    description
}

/// Placement statistics for a caller-supplied target keyword.
#[derive(Debug, Clone, Serialize)]
pub struct TargetKeywordAnalysis {
    /// The keyword as submitted.
    pub keyword: String,
    /// Case-insensitive occurrence count.
    pub frequency: usize,
    /// Occurrences as a percentage of the word count, rounded to 2 decimals.
    pub density: f64,
    /// Whether the keyword appears anywhere in the text.
    pub present_in_text: bool,
    /// Whether the first paragraph mentions the keyword.
    pub in_first_paragraph: bool,
    /// Occurrences per paragraph.
    pub distribution: f64,
}

/// Measures how a target keyword is used across the document.
pub fn analyze_target_keyword(
    text: &str,
    keyword: &str,
    word_count: usize,
    paragraph_count: usize,
) -> TargetKeywordAnalysis {
    let haystack = text.to_lowercase();
    let needle = keyword.to_lowercase();
    let frequency = if needle.is_empty() {
        0
    } else {
        haystack.matches(&needle).count()
    };
    let density = frequency as f64 / word_count.max(1) as f64 * 100.0;

    let first_paragraph = paragraphs(text).first().map(|p| p.to_lowercase());

    TargetKeywordAnalysis {
        keyword: keyword.to_string(),
        frequency,
        density: (density * 100.0).round() / 100.0,
        present_in_text: frequency > 0,
        in_first_paragraph: first_paragraph
            .map(|p| p.contains(&needle))
            .unwrap_or(false),
        distribution: frequency as f64 / paragraph_count.max(1) as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordCategory;

    fn keyword(text: &str) -> KeywordCandidate {
        KeywordCandidate {
            text: text.to_string(),
            relevance_score: 0.9,
            confidence: 0.9,
            frequency: 1,
            positions: Vec::new(),
            category: KeywordCategory::Entity,
        }
    }

    #[test]
    fn titles_fill_templates_from_top_keywords() {
        let titles = title_suggestions(&[keyword("Rust"), keyword("WebAssembly")]);
        assert_eq!(titles.len(), 5);
        assert_eq!(titles[0], "Rust Guide: WebAssembly");
        assert!(titles[1].starts_with("How to Master Rust in 2"));
    }

    #[test]
    fn titles_fall_back_without_keywords() {
        let titles = title_suggestions(&[]);
        assert_eq!(titles[0], "Complete Guide: Everything You Need to Know");
        assert_eq!(titles[3], "The Ultimate Resource for Professionals");
    }

    #[test]
    fn short_meta_description_gets_keyword_mention() {
        let description = meta_description("Tiny intro. Second bit.", &[keyword("caching")]);
        assert!(description.ends_with("Learn about caching."));
    }

    #[test]
    fn long_meta_description_is_truncated_with_ellipsis() {
        let text = "x".repeat(400);
        let description = meta_description(&text, &[]);
        assert_eq!(description.chars().count(), 160);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn target_keyword_statistics() {
        let text = "Caching speeds pages.\n\nGood caching beats no caching.";
        let analysis = analyze_target_keyword(text, "Caching", 8, 2);
        assert_eq!(analysis.frequency, 3);
        assert!(analysis.present_in_text);
        assert!(analysis.in_first_paragraph);
        assert_eq!(analysis.distribution, 1.5);
        assert_eq!(analysis.density, 37.5);
    }

    #[test]
    fn absent_target_keyword_reports_zeroes() {
        let analysis = analyze_target_keyword("No mention here.", "serverless", 3, 1);
        assert_eq!(analysis.frequency, 0);
        assert!(!analysis.present_in_text);
        assert!(!analysis.in_first_paragraph);
    }
}
