//! Page retrieval for the URL-analysis pipeline.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::AnalysisError;

/// Hard deadline for fetching the analysis target.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; seolens/0.1)";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A fetched page body plus timing information.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL as requested.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub body: String,
    /// Wall clock from just before send to after the full body read.
    pub latency: Duration,
}

/// robots.txt probe outcome. Never an error: unreachable means "not found".
#[derive(Debug, Clone, Default)]
pub struct RobotsProbe {
    /// Whether a 2xx robots.txt was served.
    pub found: bool,
    /// File contents when found.
    pub content: Option<String>,
}

/// Builds the outbound client used for page and robots.txt fetches.
pub fn build_page_client() -> Result<Client, AnalysisError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .default_headers(headers)
        .build()
        .map_err(|err| AnalysisError::upstream("fetcher", err))
}

/// Fetches the analysis target, measuring latency across the full body read.
///
/// Non-2xx responses and transport failures are terminal; neither is retried.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, AnalysisError> {
    let start = Instant::now();
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|err| AnalysisError::FetchTarget {
            status: None,
            message: err.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AnalysisError::FetchTarget {
            status: Some(status.as_u16()),
            message: format!(
                "We encountered an issue accessing the URL: {status}. \
                 Please verify the URL is accessible and try again."
            ),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|err| AnalysisError::FetchTarget {
            status: Some(status.as_u16()),
            message: err.to_string(),
        })?;
    let latency = start.elapsed();

    Ok(FetchedPage {
        url: url.clone(),
        status: status.as_u16(),
        body,
        latency,
    })
}

/// Probes `{origin}/robots.txt`. Fetch failures of any kind report not-found.
pub async fn fetch_robots_txt(client: &Client, page_url: &Url) -> RobotsProbe {
    let Ok(robots_url) = page_url.join("/robots.txt") else {
        return RobotsProbe::default();
    };

    match client.get(robots_url).send().await {
        Ok(response) if response.status().is_success() => {
            let content = response.text().await.ok();
            RobotsProbe {
                found: content.is_some(),
                content,
            }
        }
        Ok(response) => {
            debug!(status = %response.status(), "robots.txt probe rejected");
            RobotsProbe::default()
        }
        Err(err) => {
            debug!("robots.txt probe failed: {err}");
            RobotsProbe::default()
        }
    }
}
