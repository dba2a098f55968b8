//! DOM-based technical-SEO checks for fetched pages.

use std::collections::BTreeMap;

use scraper::{Html, Selector};
use serde::Serialize;

use crate::fetch::RobotsProbe;

/// Open Graph properties a share-ready page must carry.
const REQUIRED_OG_TAGS: [&str; 4] = ["og:title", "og:type", "og:image", "og:url"];

/// Canonical link check result.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalFinding {
    /// Whether a canonical link tag exists.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// The canonical href when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Noindex directive check result.
#[derive(Debug, Clone, Serialize)]
pub struct NoindexFinding {
    /// Whether a robots meta tag carries `noindex`.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
}

/// Placeholder check; real redirect testing needs a second origin fetch.
#[derive(Debug, Clone, Serialize)]
pub struct WwwRedirectFinding {
    /// Always true; advisory only.
    pub found: bool,
    /// Human-readable advice.
    pub message: String,
}

/// robots.txt availability result, filled from the separate probe.
#[derive(Debug, Clone, Serialize)]
pub struct RobotsTxtFinding {
    /// Whether the origin served a robots.txt.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// File contents when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Open Graph completeness result.
#[derive(Debug, Clone, Serialize)]
pub struct OpenGraphFinding {
    /// True when every required property is present.
    pub found: bool,
    /// Required properties that are missing.
    pub missing: Vec<String>,
    /// Human-readable assessment.
    pub message: String,
    /// Every `og:*` property found on the page.
    pub tags: BTreeMap<String, String>,
}

/// JSON-LD schema markup result.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaFinding {
    /// Whether any `application/ld+json` block exists.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// `@type` values from blocks that parsed as valid JSON.
    pub types: Vec<String>,
}

/// Meta description check result.
#[derive(Debug, Clone, Serialize)]
pub struct MetaDescriptionFinding {
    /// Whether a description meta tag exists.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// Tag content, empty when the attribute is missing.
    pub content: String,
    /// Content length in characters.
    pub length: usize,
}

/// Title tag check result.
#[derive(Debug, Clone, Serialize)]
pub struct TitleFinding {
    /// Whether a title tag exists.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// Title text.
    pub content: String,
    /// Title length in characters.
    pub length: usize,
}

/// All technical-SEO findings for one page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TechnicalReport {
    /// Canonical link tag.
    pub canonical_tag: CanonicalFinding,
    /// robots meta noindex directive.
    pub noindex_tag: NoindexFinding,
    /// www/non-www redirect advisory.
    pub www_redirect: WwwRedirectFinding,
    /// robots.txt availability.
    pub robots_txt: RobotsTxtFinding,
    /// Open Graph completeness.
    pub open_graph: OpenGraphFinding,
    /// JSON-LD schema markup.
    pub schema_markup: SchemaFinding,
    /// Meta description.
    pub meta_description: MetaDescriptionFinding,
    /// Title tag.
    pub title_tag: TitleFinding,
}

struct CheckSelectors {
    canonical: Selector,
    noindex: Selector,
    og_meta: Selector,
    schema_script: Selector,
    meta_description: Selector,
    title: Selector,
}

impl CheckSelectors {
    fn new() -> Self {
        Self {
            canonical: Selector::parse(r#"link[rel="canonical"]"#).expect("canonical selector"),
            noindex: Selector::parse(r#"meta[name="robots"][content*="noindex"]"#)
                .expect("noindex selector"),
            og_meta: Selector::parse(r#"meta[property^="og:"]"#).expect("og selector"),
            schema_script: Selector::parse(r#"script[type="application/ld+json"]"#)
                .expect("schema selector"),
            meta_description: Selector::parse(r#"meta[name="description"]"#)
                .expect("description selector"),
            title: Selector::parse("title").expect("title selector"),
        }
    }
}

fn selectors() -> &'static CheckSelectors {
    static SELECTORS: std::sync::OnceLock<CheckSelectors> = std::sync::OnceLock::new();
    SELECTORS.get_or_init(CheckSelectors::new)
}

/// Runs every DOM check against the fetched HTML. The robots.txt finding is
/// derived from the separately fetched probe.
pub fn scan(html: &str, robots: &RobotsProbe) -> TechnicalReport {
    let document = Html::parse_document(html);
    let sel = selectors();

    let canonical_url = document
        .select(&sel.canonical)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string);
    let canonical_found = document.select(&sel.canonical).next().is_some();

    let noindex_found = document.select(&sel.noindex).next().is_some();

    let mut og_tags = BTreeMap::new();
    for element in document.select(&sel.og_meta) {
        let property = element.value().attr("property");
        let content = element.value().attr("content");
        if let (Some(property), Some(content)) = (property, content) {
            og_tags.insert(property.to_string(), content.to_string());
        }
    }
    let missing_og: Vec<String> = REQUIRED_OG_TAGS
        .iter()
        .filter(|tag| !og_tags.contains_key(**tag))
        .map(|tag| tag.to_string())
        .collect();

    let mut schema_found = false;
    let mut schema_types = Vec::new();
    for element in document.select(&sel.schema_script) {
        schema_found = true;
        let raw: String = element.text().collect();
        // Invalid JSON blocks are skipped, not surfaced.
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            if let Some(kind) = value.get("@type").and_then(|t| t.as_str()) {
                schema_types.push(kind.to_string());
            }
        }
    }

    let meta_description = document
        .select(&sel.meta_description)
        .next()
        .map(|el| el.value().attr("content").unwrap_or("").to_string());
    let meta_found = meta_description.is_some();
    let meta_content = meta_description.unwrap_or_default();
    let meta_length = meta_content.chars().count();

    let title = document
        .select(&sel.title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string());
    let title_found = title.is_some();
    let title_content = title.unwrap_or_default();
    let title_length = title_content.chars().count();

    TechnicalReport {
        canonical_tag: CanonicalFinding {
            found: canonical_found,
            message: match &canonical_url {
                Some(url) if canonical_found => format!(
                    "Perfect! Your canonical tag is properly set and points to: {url}"
                ),
                _ => "Consider adding a canonical link tag to help prevent duplicate content issues."
                    .to_string(),
            },
            url: canonical_url,
        },
        noindex_tag: NoindexFinding {
            found: noindex_found,
            message: if noindex_found {
                "Note: This page has a noindex directive, so it won't appear in search engine results."
                    .to_string()
            } else {
                "Good! Your page is set to be indexed by search engines.".to_string()
            },
        },
        www_redirect: WwwRedirectFinding {
            found: true,
            message: "We recommend testing both www and non-www versions of your URL to ensure proper redirects are in place."
                .to_string(),
        },
        robots_txt: RobotsTxtFinding {
            found: robots.found,
            message: if robots.found {
                "Great! Your robots.txt file is accessible and properly configured.".to_string()
            } else {
                "Consider adding a robots.txt file to help guide search engine crawlers."
                    .to_string()
            },
            content: robots.content.clone(),
        },
        open_graph: OpenGraphFinding {
            found: missing_og.is_empty(),
            message: if missing_og.is_empty() {
                "Excellent! All essential Open Graph meta tags are present for social media sharing."
                    .to_string()
            } else {
                format!(
                    "To improve social media sharing, consider adding these Open Graph tags: {}",
                    missing_og.join(", ")
                )
            },
            missing: missing_og,
            tags: og_tags,
        },
        schema_markup: SchemaFinding {
            found: schema_found,
            message: if schema_found {
                format!(
                    "Great! We found Schema.org markup for: {}. This helps search engines understand your content better.",
                    schema_types.join(", ")
                )
            } else {
                "Adding Schema.org structured data could help search engines better understand your content."
                    .to_string()
            },
            types: schema_types,
        },
        meta_description: MetaDescriptionFinding {
            found: meta_found,
            message: meta_description_message(meta_found, meta_length),
            content: meta_content,
            length: meta_length,
        },
        title_tag: TitleFinding {
            found: title_found,
            message: title_message(title_found, title_length),
            content: title_content,
            length: title_length,
        },
    }
}

fn meta_description_message(found: bool, length: usize) -> String {
    if !found {
        return "Adding a meta description would help improve your search result snippets and click-through rates."
            .to_string();
    }
    if (120..=160).contains(&length) {
        format!("Perfect! Your meta description is {length} characters, which is in the optimal range.")
    } else if length < 120 {
        format!(
            "Your meta description is {length} characters. Consider expanding it to 120-160 characters for better search results."
        )
    } else {
        format!(
            "Your meta description is {length} characters. Consider shortening it to 120-160 characters for optimal display."
        )
    }
}

fn title_message(found: bool, length: usize) -> String {
    if !found {
        return "Adding a title tag would significantly improve your search engine visibility."
            .to_string();
    }
    if (30..=60).contains(&length) {
        format!("Excellent! Your title tag is {length} characters, which is perfectly optimized.")
    } else if length < 30 {
        format!(
            "Your title tag is {length} characters. Consider expanding it to 30-60 characters for better SEO impact."
        )
    } else {
        format!(
            "Your title tag is {length} characters. For optimal results, consider keeping it between 30-60 characters."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_only(html: &str) -> TechnicalReport {
        scan(html, &RobotsProbe::default())
    }

    #[test]
    fn canonical_tag_reports_href() {
        let report = scan_only(
            r#"<html><head><link rel="canonical" href="https://x.test/"></head><body></body></html>"#,
        );
        assert!(report.canonical_tag.found);
        assert_eq!(report.canonical_tag.url.as_deref(), Some("https://x.test/"));
    }

    #[test]
    fn missing_canonical_reports_not_found() {
        let report = scan_only("<html><head></head><body></body></html>");
        assert!(!report.canonical_tag.found);
        assert!(report.canonical_tag.url.is_none());
    }

    #[test]
    fn noindex_directive_is_detected() {
        let report = scan_only(
            r#"<html><head><meta name="robots" content="noindex, nofollow"></head></html>"#,
        );
        assert!(report.noindex_tag.found);

        let indexed = scan_only(r#"<html><head><meta name="robots" content="all"></head></html>"#);
        assert!(!indexed.noindex_tag.found);
    }

    #[test]
    fn open_graph_reports_missing_required_tags() {
        let report = scan_only(
            r#"<html><head>
                <meta property="og:title" content="T">
                <meta property="og:image" content="https://x.test/i.png">
            </head></html>"#,
        );
        assert!(!report.open_graph.found);
        assert_eq!(report.open_graph.missing, vec!["og:type", "og:url"]);
        assert_eq!(report.open_graph.tags.len(), 2);
    }

    #[test]
    fn complete_open_graph_set_passes() {
        let report = scan_only(
            r#"<html><head>
                <meta property="og:title" content="T">
                <meta property="og:type" content="article">
                <meta property="og:image" content="i.png">
                <meta property="og:url" content="https://x.test/">
            </head></html>"#,
        );
        assert!(report.open_graph.found);
        assert!(report.open_graph.missing.is_empty());
    }

    #[test]
    fn invalid_json_ld_is_skipped_silently() {
        let report = scan_only(
            r#"<html><head>
                <script type="application/ld+json">{"@type": "Article"}</script>
                <script type="application/ld+json">{not json at all</script>
            </head></html>"#,
        );
        assert!(report.schema_markup.found);
        assert_eq!(report.schema_markup.types, vec!["Article"]);
    }

    #[test]
    fn title_and_meta_lengths_drive_messages() {
        let report = scan_only(
            r#"<html><head><title>Short</title><meta name="description" content="tiny"></head></html>"#,
        );
        assert!(report.title_tag.found);
        assert_eq!(report.title_tag.length, 5);
        assert!(report.title_tag.message.contains("expanding it to 30-60"));
        assert!(report.meta_description.found);
        assert!(report
            .meta_description
            .message
            .contains("expanding it to 120-160"));
    }

    #[test]
    fn robots_probe_flows_into_report() {
        let robots = RobotsProbe {
            found: true,
            content: Some("User-agent: *\nAllow: /".to_string()),
        };
        let report = scan("<html></html>", &robots);
        assert!(report.robots_txt.found);
        assert!(report.robots_txt.content.as_deref().unwrap().contains("Allow"));
    }
}
