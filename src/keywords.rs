//! Keyword candidate extraction merging entities, part-of-speech tags, and
//! raw-text frequency statistics.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::annotator::{Entity, Word};

/// Hard cap on returned candidates; part of the response contract.
pub const MAX_KEYWORDS: usize = 20;

/// Backfill from the frequency table kicks in below this candidate count.
const BACKFILL_THRESHOLD: usize = 8;
/// Frequency-table entries considered during backfill.
const BACKFILL_POOL: usize = 15;

/// Common function words excluded from the frequency table.
static STOP_WORDS: &[&str] = &[
    "a", "am", "an", "and", "are", "as", "at", "be", "been", "being", "by", "can", "could", "did",
    "do", "does", "doing", "for", "from", "had", "has", "have", "having", "he", "her", "hers",
    "herself", "him", "himself", "his", "i", "in", "is", "it", "its", "itself", "may", "me",
    "might", "must", "my", "myself", "of", "on", "our", "ours", "ourselves", "shall", "she",
    "should", "that", "the", "their", "theirs", "them", "themselves", "these", "they", "this",
    "those", "to", "was", "we", "were", "what", "which", "who", "whom", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Source that produced a keyword candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    /// Seeded from a recognized named entity.
    Entity,
    /// Seeded from a noun lemma.
    Noun,
    /// Seeded from an adjective lemma.
    Adjective,
    /// Backfilled from the raw frequency table.
    Frequent,
}

/// One extracted keyword with its provenance and statistics.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordCandidate {
    /// Keyword as it will be shown; casing comes from the source.
    pub text: String,
    /// Relevance in [0, 1]; sort key for the final list.
    pub relevance_score: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Occurrences in the frequency table (floor 1).
    pub frequency: usize,
    /// Character offsets where the source annotation matched.
    pub positions: Vec<usize>,
    /// Which extraction stage produced this candidate.
    pub category: KeywordCategory,
}

/// Counts every alphabetic token in the text, regardless of length.
///
/// This is the denominator for keyword-density percentages.
pub fn alphabetic_token_count(text: &str) -> usize {
    let cleaned = clean_text(text);
    word_pattern().find_iter(&cleaned).count()
}

/// Extracts up to [`MAX_KEYWORDS`] candidates, sorted by descending relevance.
///
/// Precedence is strict: entities first, then annotated nouns/adjectives,
/// then (only when fewer than eight candidates exist) high-frequency raw
/// tokens. The first source to claim a normalized text wins its category.
pub fn extract_keywords(text: &str, entities: &[Entity], words: &[Word]) -> Vec<KeywordCandidate> {
    let cleaned = clean_text(text);
    let tokens: Vec<&str> = word_pattern().find_iter(&cleaned).map(|m| m.as_str()).collect();
    let total_tokens = tokens.len();

    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for &token in &tokens {
        if token.len() > 3 && !is_stop_word(token) {
            *frequency.entry(token).or_insert(0) += 1;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<KeywordCandidate> = Vec::new();

    for entity in entities {
        if entity.matched_text.len() <= 2 {
            continue;
        }
        let normalized = entity.matched_text.to_lowercase();
        if !seen.insert(normalized.clone()) {
            continue;
        }
        candidates.push(KeywordCandidate {
            text: entity.matched_text.clone(),
            relevance_score: score_or(entity.relevance_score, 0.8),
            confidence: score_or(entity.confidence_score, 0.8),
            frequency: frequency.get(normalized.as_str()).copied().unwrap_or(1),
            positions: vec![entity.starting_pos],
            category: KeywordCategory::Entity,
        });
    }

    for word in words {
        if word.lemma.len() <= 4 {
            continue;
        }
        let normalized = word.lemma.to_lowercase();
        if seen.contains(&normalized) {
            continue;
        }
        let category = if word.part_of_speech.contains("NN") {
            KeywordCategory::Noun
        } else if word.part_of_speech.contains("JJ") {
            KeywordCategory::Adjective
        } else {
            continue;
        };
        let relevance = match category {
            KeywordCategory::Noun => 0.6,
            _ => 0.5,
        };
        seen.insert(normalized.clone());
        candidates.push(KeywordCandidate {
            text: word.lemma.clone(),
            relevance_score: relevance,
            confidence: relevance,
            frequency: frequency.get(normalized.as_str()).copied().unwrap_or(1),
            positions: vec![word.starting_pos],
            category,
        });
    }

    if candidates.len() < BACKFILL_THRESHOLD {
        let mut by_frequency: Vec<(&str, usize)> =
            frequency.iter().map(|(&w, &f)| (w, f)).collect();
        // Secondary alphabetical key keeps ties deterministic.
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (word, freq) in by_frequency.into_iter().take(BACKFILL_POOL) {
            if freq <= 2 || seen.contains(word) {
                continue;
            }
            seen.insert(word.to_string());
            candidates.push(KeywordCandidate {
                text: word.to_string(),
                relevance_score: (freq as f64 / total_tokens.max(1) as f64 * 20.0).min(0.7),
                confidence: 0.5,
                frequency: freq,
                positions: Vec::new(),
                category: KeywordCategory::Frequent,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_KEYWORDS);
    candidates
}

/// Treats zero scores from the annotation service as absent.
fn score_or(score: f64, default: f64) -> f64 {
    if score > 0.0 {
        score
    } else {
        default
    }
}

fn is_stop_word(word: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(word)
}

/// Lowercases and strips punctuation so token boundaries are clean.
fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[a-z]+\b").expect("word pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(text: &str, relevance: f64, pos: usize) -> Entity {
        Entity {
            matched_text: text.to_string(),
            relevance_score: relevance,
            confidence_score: relevance,
            starting_pos: pos,
            ..Entity::default()
        }
    }

    fn word(lemma: &str, pos_tag: &str) -> Word {
        Word {
            lemma: lemma.to_string(),
            part_of_speech: pos_tag.to_string(),
            ..Word::default()
        }
    }

    #[test]
    fn entities_take_precedence_over_later_sources() {
        let text = "serverless architecture beats serverless hosting";
        let entities = vec![entity("serverless", 0.9, 0)];
        let words = vec![word("serverless", "NN")];
        let keywords = extract_keywords(text, &entities, &words);

        let serverless: Vec<&KeywordCandidate> = keywords
            .iter()
            .filter(|k| k.text.eq_ignore_ascii_case("serverless"))
            .collect();
        assert_eq!(serverless.len(), 1);
        assert_eq!(serverless[0].category, KeywordCategory::Entity);
        assert_eq!(serverless[0].frequency, 2);
    }

    #[test]
    fn zero_entity_score_falls_back_to_default() {
        let keywords = extract_keywords("irrelevant body", &[entity("Paris", 0.0, 3)], &[]);
        assert_eq!(keywords[0].relevance_score, 0.8);
    }

    #[test]
    fn short_entities_and_short_lemmas_are_skipped() {
        let keywords = extract_keywords(
            "some text here",
            &[entity("ab", 0.9, 0)],
            &[word("tiny", "NN")],
        );
        assert!(keywords.is_empty());
    }

    #[test]
    fn pos_tags_map_to_categories_and_scores() {
        let words = vec![word("database", "NNS"), word("scalable", "JJ")];
        let keywords = extract_keywords("short filler", &[], &words);
        assert_eq!(keywords[0].category, KeywordCategory::Noun);
        assert_eq!(keywords[0].relevance_score, 0.6);
        assert_eq!(keywords[1].category, KeywordCategory::Adjective);
        assert_eq!(keywords[1].relevance_score, 0.5);
    }

    #[test]
    fn backfill_only_runs_when_candidates_are_scarce() {
        let text = "crawler crawler crawler indexing indexing indexing ranking ranking ranking";
        let keywords = extract_keywords(text, &[], &[]);
        assert!(!keywords.is_empty());
        assert!(keywords.iter().all(|k| k.category == KeywordCategory::Frequent));
        // Tokens appearing once or twice never backfill.
        assert!(keywords.iter().all(|k| k.frequency > 2));
    }

    #[test]
    fn output_is_sorted_deduped_and_capped() {
        let entities: Vec<Entity> = (0..30)
            .map(|i| entity(&format!("entity{i:02}"), 0.3 + (i as f64) * 0.02, i))
            .collect();
        let keywords = extract_keywords("body text", &entities, &[]);

        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert!(keywords
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));

        let mut normals: Vec<String> = keywords.iter().map(|k| k.text.to_lowercase()).collect();
        normals.sort();
        normals.dedup();
        assert_eq!(normals.len(), MAX_KEYWORDS);
    }

    #[test]
    fn density_denominator_counts_every_alphabetic_token(){
        assert_eq!(alphabetic_token_count("a big-cat sat, on 2 mats"), 6);
    }
}
