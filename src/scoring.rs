//! Weighted scoring rubric and recommendation rules for the text pipeline.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::metrics::ContentMetrics;

/// Most recommendations returned for one text analysis.
pub const MAX_TEXT_RECOMMENDATIONS: usize = 6;

/// Points earned by one rubric category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore {
    /// Fixed category name.
    #[serde(skip)]
    pub name: &'static str,
    /// Points awarded.
    pub score: u32,
    /// Ceiling for this category.
    pub max_score: u32,
    /// Human explanation of the award.
    pub reason: String,
}

/// Per-category breakdown in fixed rubric order.
///
/// The category maximums sum to 110 while the reported total is clamped to
/// 100; the rubric is kept as designed rather than re-normalized, so the
/// clamp masks the excess in high-scoring documents.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    categories: Vec<CategoryScore>,
}

impl ScoreBreakdown {
    /// Sum of awarded points before clamping.
    pub fn raw_total(&self) -> u32 {
        self.categories.iter().map(|c| c.score).sum()
    }

    /// Looks up one category's awarded points by name.
    pub fn category_score(&self, name: &str) -> u32 {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.score)
            .unwrap_or(0)
    }

    /// Categories in emission order.
    pub fn categories(&self) -> &[CategoryScore] {
        &self.categories
    }
}

// Emitted as a name-keyed map so the fixed category order survives into JSON.
impl Serialize for ScoreBreakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(category.name, category)?;
        }
        map.end()
    }
}

/// Inputs the rubric consumes beyond [`ContentMetrics`].
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    /// Number of extracted keyword candidates.
    pub keyword_count: usize,
    /// Top keyword density as a percentage of all alphabetic tokens.
    pub keyword_density: f64,
    /// Document sentiment polarity in [-1, 1].
    pub sentiment_score: f64,
}

/// Final rubric outcome for one document.
#[derive(Debug, Clone, Serialize)]
pub struct TextScore {
    /// Total awarded points, clamped to [0, 100].
    pub score: u32,
    /// Letter grade computed on the raw pre-clamp sum.
    pub grade: &'static str,
    /// Per-category awards.
    pub breakdown: ScoreBreakdown,
}

/// Applies the seven-category rubric to one analyzed document.
pub fn score_text(metrics: &ContentMetrics, inputs: &ScoreInputs) -> TextScore {
    let word_count = metrics.word_count;
    let awps = metrics.avg_words_per_sentence;
    let flesch = metrics.readability.flesch_score;
    let mut categories = Vec::with_capacity(7);

    let mut length = 0;
    if word_count >= 300 {
        length += 8;
    }
    if word_count >= 600 {
        length += 6;
    }
    if word_count >= 1200 {
        length += 6;
    }
    categories.push(CategoryScore {
        name: "Content Length",
        score: length,
        max_score: 20,
        reason: format!("{word_count} words (300+ recommended for SEO)"),
    });

    let mut readability = 0;
    if flesch >= 40.0 {
        readability += 10;
    }
    if flesch >= 60.0 {
        readability += 10;
    }
    categories.push(CategoryScore {
        name: "Readability",
        score: readability,
        max_score: 20,
        reason: format!("Flesch score: {flesch} (60+ is ideal)"),
    });

    let mut structure = 0;
    if awps <= 20.0 {
        structure += 8;
    }
    if awps <= 15.0 {
        structure += 4;
    }
    if metrics.sentence_count >= 5 {
        structure += 3;
    }
    categories.push(CategoryScore {
        name: "Sentence Structure",
        score: structure,
        max_score: 15,
        reason: format!("Avg {awps:.1} words/sentence (15-20 ideal)"),
    });

    let mut organization = 0;
    if metrics.paragraph_count > 2 {
        organization += 5;
    }
    if metrics.structure.heading_count > 0 {
        organization += 10;
    }
    if metrics.structure.list_count > 0 {
        organization += 3;
    }
    if metrics.paragraph_count > 5 {
        organization += 2;
    }
    categories.push(CategoryScore {
        name: "Content Organization",
        score: organization,
        max_score: 20,
        reason: format!(
            "{} headings, {} lists, {} paragraphs",
            metrics.structure.heading_count, metrics.structure.list_count, metrics.paragraph_count
        ),
    });

    let mut keyword_usage = 0;
    if inputs.keyword_count >= 5 {
        keyword_usage += 5;
    }
    if (1.0..=3.0).contains(&inputs.keyword_density) {
        keyword_usage += 8;
    } else if inputs.keyword_density > 0.5 && inputs.keyword_density < 5.0 {
        keyword_usage += 5;
    }
    if inputs.keyword_count >= 10 {
        keyword_usage += 2;
    }
    categories.push(CategoryScore {
        name: "Keyword Usage",
        score: keyword_usage,
        max_score: 15,
        reason: format!(
            "{} keywords, {:.1}% density (1-3% ideal)",
            inputs.keyword_count, inputs.keyword_density
        ),
    });

    let mut media = 0;
    if metrics.structure.link_count > 0 {
        media += 3;
    }
    if metrics.structure.image_count > 0 {
        media += 4;
    }
    if metrics.structure.link_count > 2 {
        media += 2;
    }
    if metrics.structure.image_count > 1 {
        media += 1;
    }
    categories.push(CategoryScore {
        name: "Multimedia & Links",
        score: media,
        max_score: 10,
        reason: format!(
            "{} links, {} images",
            metrics.structure.link_count, metrics.structure.image_count
        ),
    });

    let mut quality = 0;
    if inputs.sentiment_score > -0.2 && inputs.sentiment_score < 0.8 {
        quality += 3;
    }
    if word_count > 500 && awps < 25.0 {
        quality += 4;
    }
    if inputs.keyword_count > 8 && inputs.keyword_density < 4.0 {
        quality += 3;
    }
    categories.push(CategoryScore {
        name: "Content Quality",
        score: quality,
        max_score: 10,
        reason: "Based on sentiment, depth, and keyword balance".to_string(),
    });

    let breakdown = ScoreBreakdown { categories };
    let raw = breakdown.raw_total();
    TextScore {
        score: raw.min(100),
        grade: grade_for(raw),
        breakdown,
    }
}

/// Letter grade thresholds applied to the raw (pre-clamp) sum.
fn grade_for(raw: u32) -> &'static str {
    if raw >= 80 {
        "A"
    } else if raw >= 70 {
        "B"
    } else if raw >= 60 {
        "C"
    } else if raw >= 50 {
        "D"
    } else {
        "F"
    }
}

/// Produces actionable recommendations from the breakdown, in fixed rule
/// order, truncated to [`MAX_TEXT_RECOMMENDATIONS`]. Earlier rules are never
/// starved by later ones.
pub fn recommend_text(
    breakdown: &ScoreBreakdown,
    word_count: usize,
    flesch_score: f64,
    keyword_count: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if word_count < 300 {
        recommendations.push(
            "Add more content - aim for at least 300 words for better SEO performance".to_string(),
        );
    } else if word_count < 600 {
        recommendations.push(
            "Consider expanding your content to 600+ words for improved search rankings"
                .to_string(),
        );
    }

    if flesch_score < 40.0 {
        recommendations
            .push("Improve readability by using shorter sentences and simpler words".to_string());
    } else if flesch_score < 60.0 {
        recommendations.push(
            "Good readability, but could be improved with shorter paragraphs and clearer language"
                .to_string(),
        );
    }

    if breakdown.category_score("Content Organization") < 15 {
        recommendations.push(
            "Add more headings (H1, H2, H3) to better structure your content".to_string(),
        );
        recommendations.push("Use bullet points or numbered lists to break up text".to_string());
    }

    if keyword_count < 5 {
        recommendations.push(
            "Include more relevant keywords naturally throughout your content".to_string(),
        );
    }

    if breakdown.category_score("Readability") >= 15 {
        recommendations
            .push("✓ Excellent readability - your content is easy to understand".to_string());
    }

    if breakdown.category_score("Content Organization") >= 15 {
        recommendations
            .push("✓ Good content structure with proper headings and formatting".to_string());
    }

    recommendations.truncate(MAX_TEXT_RECOMMENDATIONS);
    recommendations
}
