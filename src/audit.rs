//! URL-analysis pipeline: fetch, scan, score, recommend.

use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::error::AnalysisError;
use crate::fetch::{fetch_page, fetch_robots_txt};
use crate::performance::{self, PerformanceReport};
use crate::technical::{self, TechnicalReport};

/// Most recommendations returned for one URL audit.
pub const MAX_URL_RECOMMENDATIONS: usize = 8;

/// HTML byte budget that earns the size award.
const HTML_SIZE_BUDGET_BYTES: usize = 33_000;

/// Complete audit result for one page.
#[derive(Debug, Clone, Serialize)]
pub struct UrlAudit {
    /// The audited URL.
    pub url: String,
    /// Tag-presence checks.
    pub technical_seo: TechnicalReport,
    /// DOM performance proxies.
    pub performance: PerformanceReport,
    /// Rubric score, clamped to [0, 100].
    pub seo_score: u32,
    /// Prioritized improvement list.
    pub recommendations: Vec<String>,
}

/// Fetches and audits one page.
///
/// The page fetch and the robots.txt probe are independent, so they run
/// concurrently under their own timeouts.
pub async fn audit_url(client: &Client, url: &Url) -> Result<UrlAudit, AnalysisError> {
    let (page, robots) = tokio::join!(fetch_page(client, url), fetch_robots_txt(client, url));
    let page = page?;

    let technical_seo = technical::scan(&page.body, &robots);
    let latency_ms = page.latency.as_millis() as u64;
    let performance = performance::analyze(&page.body, latency_ms);

    let seo_score = score_url(&technical_seo, &performance);
    let recommendations = recommend_url(&technical_seo, &performance);
    info!(url = %page.url, seo_score, latency_ms, "page audit complete");

    Ok(UrlAudit {
        url: page.url.to_string(),
        technical_seo,
        performance,
        seo_score,
        recommendations,
    })
}

/// Applies the URL rubric: 60 technical points plus 40 performance points.
pub fn score_url(technical: &TechnicalReport, performance: &PerformanceReport) -> u32 {
    let mut score = 0u32;

    if technical.canonical_tag.found {
        score += 10;
    }
    if technical.title_tag.found && (30..=60).contains(&technical.title_tag.length) {
        score += 10;
    }
    if technical.meta_description.found && (120..=160).contains(&technical.meta_description.length)
    {
        score += 10;
    }
    if technical.open_graph.found {
        score += 10;
    }
    if technical.schema_markup.found {
        score += 10;
    }
    if technical.robots_txt.found {
        score += 5;
    }
    if !technical.noindex_tag.found {
        score += 5;
    }

    let ms = performance.response_time.ms;
    if ms < 200 {
        score += 15;
    } else if ms < 500 {
        score += 10;
    } else if ms < 1000 {
        score += 5;
    }

    if performance.html_size.bytes < HTML_SIZE_BUDGET_BYTES {
        score += 10;
    }
    if performance.js_minified.found {
        score += 5;
    }
    if performance.css_minified.found {
        score += 5;
    }
    if performance.image_optimization.optimized {
        score += 5;
    }

    score.min(100)
}

/// Builds the prioritized recommendation list, rule order fixed, capped at
/// [`MAX_URL_RECOMMENDATIONS`].
pub fn recommend_url(
    technical: &TechnicalReport,
    performance: &PerformanceReport,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !technical.canonical_tag.found {
        recommendations.push(
            "Consider adding a canonical link tag to help search engines understand your preferred URL version"
                .to_string(),
        );
    }

    if !technical.title_tag.found {
        recommendations.push(
            "Adding a title tag would significantly boost your search engine visibility".to_string(),
        );
    } else if !(30..=60).contains(&technical.title_tag.length) {
        recommendations.push(
            "Fine-tune your title tag length to 30-60 characters for optimal search results"
                .to_string(),
        );
    }

    if !technical.meta_description.found {
        recommendations.push(
            "A meta description would help improve your search result snippets and click-through rates"
                .to_string(),
        );
    } else if !(120..=160).contains(&technical.meta_description.length) {
        recommendations.push(
            "Optimize your meta description to 120-160 characters for the best search result display"
                .to_string(),
        );
    }

    if !technical.open_graph.missing.is_empty() {
        recommendations.push(format!(
            "Enhance social media sharing by adding these Open Graph tags: {}",
            technical.open_graph.missing.join(", ")
        ));
    }

    if !technical.schema_markup.found {
        recommendations.push(
            "Consider implementing Schema.org structured data to help search engines better understand your content"
                .to_string(),
        );
    }

    if !technical.robots_txt.found {
        recommendations
            .push("Adding a robots.txt file would help guide search engine crawlers".to_string());
    }

    if performance.response_time.ms > 500 {
        recommendations.push(
            "Improving server response time would enhance user experience (currently over 500ms)"
                .to_string(),
        );
    }

    if !performance.js_minified.found && performance.js_minified.count > 0 {
        recommendations
            .push("Minifying JavaScript files could help reduce loading times".to_string());
    }

    if !performance.css_minified.found && performance.css_minified.count > 0 {
        recommendations
            .push("Minifying CSS files would help optimize your page loading speed".to_string());
    }

    if !performance.image_optimization.optimized && performance.image_optimization.count > 0 {
        recommendations
            .push("Adding alt tags to images would improve accessibility and SEO".to_string());
    }

    if performance.request_count.count > 50 {
        recommendations
            .push("Reducing HTTP requests could help improve your page loading speed".to_string());
    }

    recommendations.truncate(MAX_URL_RECOMMENDATIONS);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RobotsProbe;
    use crate::{performance, technical};

    const WELL_FORMED: &str = r#"<html><head>
        <title>A perfectly sized page title for search results</title>
        <meta name="description" content="This meta description is written to land comfortably inside the optimal range of one hundred twenty to one hundred sixty characters, full stop.">
        <link rel="canonical" href="https://x.test/">
        <meta property="og:title" content="T">
        <meta property="og:type" content="article">
        <meta property="og:image" content="i.png">
        <meta property="og:url" content="https://x.test/">
        <script type="application/ld+json">{"@type": "Article"}</script>
        <script src="/app.min.js"></script>
        <link rel="stylesheet" href="/site.min.css">
    </head><body><img src="a.png" alt="a"></body></html>"#;

    #[test]
    fn perfect_page_scores_full_marks() {
        let robots = RobotsProbe {
            found: true,
            content: Some("User-agent: *".to_string()),
        };
        let tech = technical::scan(WELL_FORMED, &robots);
        let perf = performance::analyze(WELL_FORMED, 150);

        assert_eq!(tech.title_tag.length, 47);
        assert_eq!(score_url(&tech, &perf), 100);
        assert!(recommend_url(&tech, &perf).is_empty());
    }

    #[test]
    fn bare_page_scores_only_the_noindex_award() {
        let tech = technical::scan("<html><body></body></html>", &RobotsProbe::default());
        let perf = performance::analyze("<html><body></body></html>", 2_000);
        // No noindex directive (+5) and small HTML (+10) are the only awards.
        assert_eq!(score_url(&tech, &perf), 15);
    }

    #[test]
    fn response_time_tiers_are_mutually_exclusive() {
        let tech = technical::scan("<html></html>", &RobotsProbe::default());
        let fast = performance::analyze("<html></html>", 100);
        let medium = performance::analyze("<html></html>", 400);
        let slow = performance::analyze("<html></html>", 900);

        let base = score_url(&tech, &performance::analyze("<html></html>", 5_000));
        assert_eq!(score_url(&tech, &fast) - base, 15);
        assert_eq!(score_url(&tech, &medium) - base, 10);
        assert_eq!(score_url(&tech, &slow) - base, 5);
    }

    #[test]
    fn recommendations_cap_and_order() {
        let tech = technical::scan(
            r#"<html><head>
                <script src="/big.js"></script>
                <link rel="stylesheet" href="/site.css">
            </head><body><img src="a.png"></body></html>"#,
            &RobotsProbe::default(),
        );
        let perf = performance::analyze(
            r#"<html><head>
                <script src="/big.js"></script>
                <link rel="stylesheet" href="/site.css">
            </head><body><img src="a.png"></body></html>"#,
            900,
        );
        let recs = recommend_url(&tech, &perf);
        assert_eq!(recs.len(), MAX_URL_RECOMMENDATIONS);
        assert!(recs[0].contains("canonical"));
        assert!(recs[1].contains("title tag"));
        // Later rules (image alt coverage) are starved by the cap.
        assert!(!recs.iter().any(|r| r.contains("alt tags")));
    }
}
