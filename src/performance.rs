//! DOM-derived performance proxies for fetched pages.
//!
//! These are static heuristics over one HTML document, not a real network
//! waterfall: request counts come from tag counts, minification from asset
//! file names, and latency from the single page fetch.

use scraper::{Html, Selector};
use serde::Serialize;

/// Kilobytes above which the HTML document exceeds the published average.
const HTML_SIZE_AVERAGE_KB: f64 = 33.0;

/// Asset-name substring the minification heuristic looks for.
const MINIFIED_MARKER: &str = ".min.";

/// Expires-header check; never verifiable from the document alone.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiresFinding {
    /// Always false.
    pub found: bool,
    /// Fixed explanation.
    pub message: String,
}

/// Minification heuristic for one asset class.
#[derive(Debug, Clone, Serialize)]
pub struct MinificationFinding {
    /// Whether any asset URL carries the `.min.` marker.
    pub found: bool,
    /// Human-readable assessment.
    pub message: String,
    /// Number of assets of this class referenced by the page.
    pub count: usize,
}

/// Estimated request volume.
#[derive(Debug, Clone, Serialize)]
pub struct RequestCountFinding {
    /// Scripts + stylesheets + images + the document itself.
    pub count: usize,
    /// Human-readable assessment.
    pub message: String,
}

/// Raw document weight.
#[derive(Debug, Clone, Serialize)]
pub struct HtmlSizeFinding {
    /// UTF-8 byte length of the body.
    pub bytes: usize,
    /// Size in kilobytes, one decimal.
    pub kilobytes: f64,
    /// Human-readable assessment.
    pub message: String,
}

/// Latency of the page fetch.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseTimeFinding {
    /// Milliseconds from send to full body read.
    pub ms: u64,
    /// Human-readable assessment.
    pub message: String,
}

/// Image alt-text coverage.
#[derive(Debug, Clone, Serialize)]
pub struct ImageOptimizationFinding {
    /// True only when every image has a non-empty alt and at least one exists.
    pub optimized: bool,
    /// Human-readable assessment.
    pub message: String,
    /// Number of images on the page.
    pub count: usize,
}

/// All performance findings for one page.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    /// Expires headers (unverifiable client-side).
    pub expires_headers: ExpiresFinding,
    /// JavaScript minification heuristic.
    pub js_minified: MinificationFinding,
    /// CSS minification heuristic.
    pub css_minified: MinificationFinding,
    /// Estimated request count.
    pub request_count: RequestCountFinding,
    /// HTML document weight.
    pub html_size: HtmlSizeFinding,
    /// Fetch latency.
    pub response_time: ResponseTimeFinding,
    /// Image alt coverage.
    pub image_optimization: ImageOptimizationFinding,
}

struct AssetSelectors {
    script_src: Selector,
    stylesheet: Selector,
    image: Selector,
}

impl AssetSelectors {
    fn new() -> Self {
        Self {
            script_src: Selector::parse("script[src]").expect("script selector"),
            stylesheet: Selector::parse(r#"link[rel="stylesheet"]"#).expect("stylesheet selector"),
            image: Selector::parse("img").expect("img selector"),
        }
    }
}

fn selectors() -> &'static AssetSelectors {
    static SELECTORS: std::sync::OnceLock<AssetSelectors> = std::sync::OnceLock::new();
    SELECTORS.get_or_init(AssetSelectors::new)
}

/// Derives every performance proxy from the document and fetch latency.
pub fn analyze(html: &str, response_time_ms: u64) -> PerformanceReport {
    let document = Html::parse_document(html);
    let sel = selectors();

    let mut js_count = 0usize;
    let mut js_minified = false;
    for script in document.select(&sel.script_src) {
        js_count += 1;
        if script
            .value()
            .attr("src")
            .is_some_and(|src| src.contains(MINIFIED_MARKER))
        {
            js_minified = true;
        }
    }

    let mut css_count = 0usize;
    let mut css_minified = false;
    for link in document.select(&sel.stylesheet) {
        css_count += 1;
        if link
            .value()
            .attr("href")
            .is_some_and(|href| href.contains(MINIFIED_MARKER))
        {
            css_minified = true;
        }
    }

    let mut image_count = 0usize;
    let mut images_without_alt = 0usize;
    for image in document.select(&sel.image) {
        image_count += 1;
        let alt_present = image
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty());
        if !alt_present {
            images_without_alt += 1;
        }
    }
    let optimized = images_without_alt == 0 && image_count > 0;

    // +1 for the HTML document itself.
    let total_requests = js_count + css_count + image_count + 1;

    let bytes = html.len();
    let kilobytes = (bytes as f64 / 1024.0 * 10.0).round() / 10.0;

    PerformanceReport {
        expires_headers: ExpiresFinding {
            found: false,
            message: "We're unable to check expires headers from client-side analysis, but this is a common optimization opportunity."
                .to_string(),
        },
        js_minified: MinificationFinding {
            found: js_minified,
            message: if js_minified {
                "Great! Your JavaScript files appear to be minified, which helps with loading speed."
                    .to_string()
            } else {
                "Consider minifying your JavaScript files to improve loading performance."
                    .to_string()
            },
            count: js_count,
        },
        css_minified: MinificationFinding {
            found: css_minified,
            message: if css_minified {
                "Excellent! Your CSS files appear to be minified for optimal performance."
                    .to_string()
            } else {
                "You might want to consider minifying your CSS files for better performance."
                    .to_string()
            },
            count: css_count,
        },
        request_count: RequestCountFinding {
            count: total_requests,
            message: request_count_message(total_requests),
        },
        html_size: HtmlSizeFinding {
            bytes,
            kilobytes,
            message: if kilobytes < HTML_SIZE_AVERAGE_KB {
                format!(
                    "Your HTML document is {kilobytes} KB, which is nicely under the average of 33 KB!"
                )
            } else {
                format!(
                    "Your HTML document is {kilobytes} KB. While this is above the 33 KB average, it's not necessarily problematic depending on your content."
                )
            },
        },
        response_time: ResponseTimeFinding {
            ms: response_time_ms,
            message: response_time_message(response_time_ms),
        },
        image_optimization: ImageOptimizationFinding {
            optimized,
            message: if optimized {
                "Well done! Your images are properly optimized with alt tags for accessibility."
                    .to_string()
            } else if image_count == 0 {
                "No images detected on this page.".to_string()
            } else {
                format!(
                    "{images_without_alt} of your images could benefit from alt tags for better accessibility and SEO."
                )
            },
            count: image_count,
        },
    }
}

fn request_count_message(total: usize) -> String {
    if total <= 30 {
        format!("Your page makes {total} requests, which is quite efficient!")
    } else if total <= 50 {
        format!("Your page makes {total} requests, which is reasonable but could potentially be optimized.")
    } else {
        format!("Your page makes {total} requests. Consider combining resources to reduce this number.")
    }
}

fn response_time_message(ms: u64) -> String {
    if ms < 200 {
        format!("Fantastic! Your response time of {ms}ms is excellent.")
    } else if ms < 500 {
        format!("Good work! Your response time of {ms}ms is solid.")
    } else if ms < 1000 {
        format!("Your response time of {ms}ms is acceptable, though there's room for improvement.")
    } else {
        format!("Your response time of {ms}ms could benefit from optimization.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_count_includes_the_document_itself() {
        let html = r#"<html><head>
            <script src="/app.js"></script>
            <link rel="stylesheet" href="/site.css">
        </head><body><img src="a.png" alt="a"></body></html>"#;
        let report = analyze(html, 100);
        assert_eq!(report.request_count.count, 4);
    }

    #[test]
    fn minification_heuristic_matches_min_marker() {
        let html = r#"<html><head>
            <script src="/vendor/app.min.js"></script>
            <script src="/other.js"></script>
            <link rel="stylesheet" href="/site.css">
        </head></html>"#;
        let report = analyze(html, 100);
        assert!(report.js_minified.found);
        assert_eq!(report.js_minified.count, 2);
        assert!(!report.css_minified.found);
        assert_eq!(report.css_minified.count, 1);
    }

    #[test]
    fn image_optimization_requires_alt_on_every_image() {
        let all_alt = analyze(
            r#"<html><body><img src="a.png" alt="a"><img src="b.png" alt="b"></body></html>"#,
            100,
        );
        assert!(all_alt.image_optimization.optimized);

        let empty_alt = analyze(
            r#"<html><body><img src="a.png" alt=""><img src="b.png" alt="b"></body></html>"#,
            100,
        );
        assert!(!empty_alt.image_optimization.optimized);

        let no_images = analyze("<html><body></body></html>", 100);
        assert!(!no_images.image_optimization.optimized);
        assert_eq!(
            no_images.image_optimization.message,
            "No images detected on this page."
        );
    }

    #[test]
    fn html_size_uses_utf8_byte_length() {
        let html = "<html><body>café</body></html>";
        let report = analyze(html, 100);
        assert_eq!(report.html_size.bytes, html.len());
        assert!(report.html_size.message.contains("under the average"));
    }

    #[test]
    fn response_time_tiers_are_exclusive() {
        assert!(response_time_message(150).contains("excellent"));
        assert!(response_time_message(350).contains("solid"));
        assert!(response_time_message(800).contains("acceptable"));
        assert!(response_time_message(1500).contains("benefit from optimization"));
    }
}
