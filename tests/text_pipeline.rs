use pretty_assertions::assert_eq;

use seolens::annotator::{AnnotatedDocument, Entity, Sentence, Sentiment, Word};
use seolens::keywords::{alphabetic_token_count, extract_keywords};
use seolens::metrics::{validate_text_length, ContentMetrics};
use seolens::scoring::{recommend_text, score_text, ScoreInputs};
use seolens::suggest::{analyze_target_keyword, meta_description, title_suggestions};

fn sample_text() -> String {
    let body = "Search engines reward pages that answer real questions. \
Clear writing with short sentences keeps readers engaged and helps crawlers too. "
        .repeat(12);
    format!(
        "# Optimizing Content\n\n{body}\n\n- keep sentences short\n- add descriptive headings\n\n\
Links such as [our guide](https://example.test/guide) and images like \
![diagram](https://example.test/d.png) round out the page."
    )
}

fn sample_document() -> AnnotatedDocument {
    AnnotatedDocument {
        entities: vec![
            Entity {
                matched_text: "Search engines".to_string(),
                relevance_score: 0.92,
                confidence_score: 0.95,
                starting_pos: 22,
                ..Entity::default()
            },
            Entity {
                matched_text: "crawlers".to_string(),
                relevance_score: 0.0,
                confidence_score: 0.0,
                starting_pos: 150,
                ..Entity::default()
            },
        ],
        topics: Vec::new(),
        sentences: vec![Sentence {
            words: vec![
                Word {
                    token: "questions".to_string(),
                    lemma: "question".to_string(),
                    part_of_speech: "NNS".to_string(),
                    starting_pos: 70,
                    ending_pos: 79,
                },
                Word {
                    token: "descriptive".to_string(),
                    lemma: "descriptive".to_string(),
                    part_of_speech: "JJ".to_string(),
                    starting_pos: 90,
                    ending_pos: 101,
                },
            ],
        }],
        sentiment: Sentiment {
            score: 0.2,
            label: "positive".to_string(),
            confidence: 0.8,
        },
    }
}

#[test]
fn full_text_pipeline_upholds_its_contracts() {
    let text = sample_text();
    validate_text_length(&text).expect("sample within accepted range");

    let document = sample_document();
    let metrics = ContentMetrics::compute(&text);
    let words = document.words();
    let keywords = extract_keywords(&text, &document.entities, &words);

    // Keyword list contract: sorted, capped, unique by normalized text.
    assert!(keywords.len() <= 20);
    assert!(keywords
        .windows(2)
        .all(|w| w[0].relevance_score >= w[1].relevance_score));
    let mut normalized: Vec<String> = keywords.iter().map(|k| k.text.to_lowercase()).collect();
    normalized.sort();
    let before = normalized.len();
    normalized.dedup();
    assert_eq!(normalized.len(), before);

    // The zero-scored entity fell back to the default relevance.
    let crawler = keywords
        .iter()
        .find(|k| k.text == "crawlers")
        .expect("entity kept");
    assert_eq!(crawler.relevance_score, 0.8);

    let total_tokens = alphabetic_token_count(&text);
    let density = keywords[0].frequency as f64 / total_tokens as f64 * 100.0;
    let scored = score_text(
        &metrics,
        &ScoreInputs {
            keyword_count: keywords.len(),
            keyword_density: density,
            sentiment_score: document.sentiment.score,
        },
    );

    // Rubric contract: per-category caps hold and the maximums sum to 110.
    for category in scored.breakdown.categories() {
        assert!(category.score <= category.max_score);
    }
    let max_total: u32 = scored
        .breakdown
        .categories()
        .iter()
        .map(|c| c.max_score)
        .sum();
    assert_eq!(max_total, 110);
    assert!(scored.score <= 100);

    // Structured, heading-rich sample earns the organization award.
    assert!(scored.breakdown.category_score("Content Organization") >= 10);

    let recommendations = recommend_text(
        &scored.breakdown,
        metrics.word_count,
        metrics.readability.flesch_score,
        keywords.len(),
    );
    assert!(recommendations.len() <= 6);

    let titles = title_suggestions(&keywords);
    assert_eq!(titles.len(), 5);
    assert!(titles[0].contains(&keywords[0].text));

    let description = meta_description(&text, &keywords);
    assert!(!description.is_empty());

    let target = analyze_target_keyword(&text, "crawlers", metrics.word_count, metrics.paragraph_count);
    assert!(target.present_in_text);
    assert!(target.frequency >= 12);
}

#[test]
fn out_of_range_input_is_rejected_before_any_upstream_work() {
    assert!(validate_text_length("short").is_err());
    assert!(validate_text_length(&"long ".repeat(20_000)).is_err());
}
