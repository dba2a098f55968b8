//! Client for the TextRazor-compatible text-annotation API.
//!
//! One request returns entities, topics, per-sentence words, and document
//! sentiment. All optional fields are defaulted here at the parse boundary so
//! downstream analysis never needs null checks.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::warn;

use crate::error::AnalysisError;

/// Default annotation endpoint.
pub const DEFAULT_ANNOTATOR_URL: &str = "https://api.textrazor.com/";
/// Defensive request timeout; the service has no documented upper bound.
pub const ANNOTATOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Additional attempts allowed after a 429 response.
const MAX_RATE_LIMIT_RETRIES: u32 = 2;

const EXTRACTORS: &str = "entities,topics,words,phrases,dependency-trees,sentiment,relations";

/// Named entity identified in the text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
    /// Surface form as it appears in the text.
    pub matched_text: String,
    /// Coarse type tags.
    pub r#type: Vec<String>,
    /// Freebase ontology tags, when enrichment is enabled.
    pub freebase_types: Vec<String>,
    /// DBpedia ontology tags, when enrichment is enabled.
    pub dbpedia_types: Vec<String>,
    /// Document relevance in [0, 1].
    pub relevance_score: f64,
    /// Recognition confidence in [0, 1].
    pub confidence_score: f64,
    /// Start offset of the match.
    pub starting_pos: usize,
    /// End offset of the match.
    pub ending_pos: usize,
}

/// Document-level subject label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Topic {
    /// Stable topic identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Assignment strength in [0, 1].
    pub score: f64,
    /// Link to the topic's encyclopedia page, when known.
    pub wiki_link: Option<String>,
}

/// Token-level annotation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Word {
    /// Token as written.
    pub token: String,
    /// Lemmatized form.
    pub lemma: String,
    /// Penn part-of-speech tag.
    pub part_of_speech: String,
    /// Start offset of the token.
    pub starting_pos: usize,
    /// End offset of the token.
    pub ending_pos: usize,
}

/// Sentence container; only its word list is consumed downstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sentence {
    /// Annotated tokens in order.
    pub words: Vec<Word>,
}

/// Whole-document sentiment estimate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    /// Polarity in [-1, 1].
    pub score: f64,
    /// Polarity label.
    pub label: String,
    /// Estimate confidence in [0, 1].
    pub confidence: f64,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            score: 0.0,
            label: "neutral".to_string(),
            confidence: 0.5,
        }
    }
}

/// Everything the annotation service reported for one document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnotatedDocument {
    /// Named entities in document order.
    pub entities: Vec<Entity>,
    /// Document topics in descending score order.
    pub topics: Vec<Topic>,
    /// Sentences with their annotated words.
    pub sentences: Vec<Sentence>,
    /// Whole-document sentiment, neutral when absent.
    pub sentiment: Sentiment,
}

impl AnnotatedDocument {
    /// Flattens per-sentence words into one ordered sequence.
    pub fn words(&self) -> Vec<Word> {
        self.sentences
            .iter()
            .flat_map(|s| s.words.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Envelope {
    response: AnnotatedDocument,
}

/// HTTP client for the annotation service.
#[derive(Clone)]
pub struct AnnotatorClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AnnotatorClient {
    /// Builds a new annotation client.
    pub fn new(api_key: String, base_url: String) -> Result<Self, AnalysisError> {
        if api_key.trim().is_empty() {
            return Err(AnalysisError::Config(
                "annotation API key not configured".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(ANNOTATOR_TIMEOUT)
            .build()
            .map_err(|err| AnalysisError::upstream("annotator", err))?;
        Ok(Self {
            client,
            endpoint: base_url,
            api_key,
        })
    }

    /// Annotates one document, retrying on rate limits per policy.
    ///
    /// 429 responses are retried up to two extra times with linearly
    /// increasing backoff; any other non-2xx status is terminal. A transport
    /// error is retried once unconditionally before propagating.
    pub async fn annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError> {
        let mut rate_retries = 0u32;
        let mut transport_retry_used = false;

        loop {
            let response = self
                .client
                .post(&self.endpoint)
                .header("x-textrazor-key", self.api_key.trim())
                .form(&[
                    ("text", text),
                    ("extractors", EXTRACTORS),
                    ("cleanup", "true"),
                    ("cleanup.mode", "cleanHTML"),
                ])
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let envelope: Envelope = resp
                            .json()
                            .await
                            .map_err(|err| AnalysisError::upstream("annotator", err))?;
                        return Ok(envelope.response);
                    }

                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if let Some(backoff) = rate_limit_backoff(status, rate_retries) {
                        rate_retries += 1;
                        warn!(
                            attempt = rate_retries,
                            "annotation service rate limited, backing off {:?}", backoff
                        );
                        sleep(backoff).await;
                        continue;
                    }
                    return Err(AnalysisError::Upstream {
                        service: "annotator",
                        message: format!("{status}: {body}"),
                    });
                }
                Err(err) if !transport_retry_used => {
                    transport_retry_used = true;
                    warn!("annotation request failed ({err}), retrying once");
                    sleep(Duration::from_secs(1)).await;
                }
                Err(err) => return Err(AnalysisError::upstream("annotator", err)),
            }
        }
    }
}

/// Backoff before the next attempt after a rate-limited response, if the
/// retry budget allows one. Linear: 1s, then 2s.
fn rate_limit_backoff(status: StatusCode, rate_retries: u32) -> Option<Duration> {
    if status == StatusCode::TOO_MANY_REQUESTS && rate_retries < MAX_RATE_LIMIT_RETRIES {
        Some(Duration::from_secs(u64::from(rate_retries) + 1))
    } else {
        None
    }
}
