use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use clap::Parser;
use seolens::annotator::{AnnotatorClient, DEFAULT_ANNOTATOR_URL};
use seolens::error::AnalysisError;
use seolens::fetch::build_page_client;
use seolens::keywords::{self, KeywordCandidate, KeywordCategory};
use seolens::metrics::ContentMetrics;
use seolens::optimizer::{OptimizationKind, OptimizerClient, DEFAULT_LLM_MODEL, DEFAULT_LLM_URL};
use seolens::rewrite::insert_keyword;
use seolens::scoring::{recommend_text, score_text, ScoreBreakdown, ScoreInputs};
use seolens::suggest::{analyze_target_keyword, meta_description, title_suggestions, TargetKeywordAnalysis};
use seolens::{audit_url, Readability, UrlAudit};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "seolens-api",
    about = "HTTP API for heuristic SEO content analysis and page audits"
)]
struct ApiCli {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "SEOLENS_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// API key for the text-annotation service.
    #[arg(long, env = "TEXTRAZOR_API_KEY")]
    annotator_key: Option<String>,

    /// Base URL for the text-annotation service.
    #[arg(long, env = "SEOLENS_ANNOTATOR_URL", default_value = DEFAULT_ANNOTATOR_URL)]
    annotator_url: String,

    /// API key for the LLM completion service.
    #[arg(long, env = "OPENAI_API_KEY")]
    llm_key: Option<String>,

    /// Base URL for OpenAI-compatible completion endpoints.
    #[arg(long, env = "SEOLENS_LLM_URL", default_value = DEFAULT_LLM_URL)]
    llm_url: String,

    /// Completion model identifier.
    #[arg(long, env = "SEOLENS_LLM_MODEL", default_value = DEFAULT_LLM_MODEL)]
    llm_model: String,

    /// Email address allowed to request LLM optimizations.
    #[arg(long, env = "ACCEPTED_EMAIL")]
    accepted_email: Option<String>,
}

#[derive(Clone)]
struct AppState {
    annotator: Option<AnnotatorClient>,
    optimizer: Option<OptimizerClient>,
    page_client: reqwest::Client,
    accepted_email: Option<String>,
}

// A legacy `url` member is accepted in this payload and ignored.
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: Option<String>,
    #[serde(default)]
    target_keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    word_count: usize,
    sentence_count: usize,
    paragraph_count: usize,
    avg_words_per_sentence: f64,
    avg_sentences_per_paragraph: f64,
    readability: Readability,
    keywords: Vec<KeywordCandidate>,
    keyword_density: Vec<KeywordDensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_keyword_analysis: Option<TargetKeywordAnalysis>,
    entities: Vec<EntitySummary>,
    topics: Vec<TopicSummary>,
    sentiment: SentimentSummary,
    content_structure: ContentStructureSummary,
    seo_analysis: SeoAnalysis,
    processing_info: ProcessingInfo,
}

#[derive(Debug, Serialize)]
struct KeywordDensity {
    keyword: String,
    density: f64,
    count: usize,
    category: KeywordCategory,
}

#[derive(Debug, Serialize)]
struct EntitySummary {
    text: String,
    r#type: String,
    relevance_score: f64,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct TopicSummary {
    label: String,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wiki_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct SentimentSummary {
    score: f64,
    label: String,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct ContentStructureSummary {
    has_headings: bool,
    heading_count: usize,
    list_count: usize,
    link_count: usize,
    image_count: usize,
    has_paragraphs: bool,
}

#[derive(Debug, Serialize)]
struct SeoAnalysis {
    score: u32,
    grade: &'static str,
    breakdown: ScoreBreakdown,
    title_suggestions: Vec<String>,
    meta_description_suggestion: String,
    recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProcessingInfo {
    annotator_entities: usize,
    annotator_topics: usize,
    annotator_words: usize,
    processed_at: String,
}

#[derive(Debug, Deserialize)]
struct OptimizeRequest {
    text: Option<String>,
    #[serde(default)]
    target_keyword: Option<String>,
    #[serde(default)]
    optimization_type: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct OptimizeResponse {
    optimization: String,
    r#type: &'static str,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeUrlRequest {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertKeywordRequest {
    text: Option<String>,
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct InsertKeywordResponse {
    updated_text: String,
}

#[derive(Debug, Deserialize)]
struct VerifyEmailRequest {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyEmailResponse {
    is_valid: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = ApiCli::parse();

    let annotator = match cli.annotator_key {
        Some(key) => Some(
            AnnotatorClient::new(key, cli.annotator_url.clone())
                .context("failed to build annotation client")?,
        ),
        None => {
            warn!("no annotation API key configured; text analysis will be rejected");
            None
        }
    };
    let optimizer = match cli.llm_key {
        Some(key) => Some(
            OptimizerClient::new(key, cli.llm_url.clone(), cli.llm_model.clone())
                .context("failed to build optimizer client")?,
        ),
        None => {
            warn!("no LLM API key configured; optimization will be rejected");
            None
        }
    };
    let page_client = build_page_client().context("failed to build page fetch client")?;

    let state = AppState {
        annotator,
        optimizer,
        page_client,
        accepted_email: cli.accepted_email,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/analyze", post(analyze_handler))
        .route("/v1/optimize", post(optimize_handler))
        .route("/v1/analyze-url", post(analyze_url_handler))
        .route("/v1/insert-keyword", post(insert_keyword_handler))
        .route("/v1/verify-email", post(verify_email_handler))
        .with_state(state);

    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    info!("seolens-api listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let text = request
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| bad_request("Text content is required"))?;
    seolens::metrics::validate_text_length(text)
        .map_err(|err| error_response("Failed to analyze text", err))?;

    let annotator = state.annotator.as_ref().ok_or_else(|| {
        error_response(
            "Failed to analyze text",
            AnalysisError::Config("annotation API key not configured".to_string()),
        )
    })?;
    let document = annotator
        .annotate(text)
        .await
        .map_err(|err| error_response("Failed to analyze text", err))?;

    let metrics = ContentMetrics::compute(text);
    let words = document.words();
    let all_keywords = keywords::extract_keywords(text, &document.entities, &words);
    let total_tokens = keywords::alphabetic_token_count(text);

    let top_keyword_density = all_keywords
        .first()
        .map(|k| k.frequency as f64 / total_tokens.max(1) as f64 * 100.0)
        .unwrap_or(0.0);
    let keyword_density: Vec<KeywordDensity> = all_keywords
        .iter()
        .take(10)
        .map(|k| KeywordDensity {
            keyword: k.text.clone(),
            density: k.frequency as f64 / total_tokens.max(1) as f64 * 100.0,
            count: k.frequency,
            category: k.category,
        })
        .collect();

    let inputs = ScoreInputs {
        keyword_count: all_keywords.len(),
        keyword_density: top_keyword_density,
        sentiment_score: document.sentiment.score,
    };
    let scored = score_text(&metrics, &inputs);
    let recommendations = recommend_text(
        &scored.breakdown,
        metrics.word_count,
        metrics.readability.flesch_score,
        all_keywords.len(),
    );
    let titles = title_suggestions(&all_keywords);
    let meta_suggestion = meta_description(text, &all_keywords);

    let target_keyword_analysis = request
        .target_keyword
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(|keyword| {
            analyze_target_keyword(text, keyword, metrics.word_count, metrics.paragraph_count)
        });

    let entities: Vec<EntitySummary> = document
        .entities
        .iter()
        .take(10)
        .map(|entity| EntitySummary {
            text: if entity.matched_text.is_empty() {
                "Unknown".to_string()
            } else {
                entity.matched_text.clone()
            },
            r#type: entity
                .dbpedia_types
                .first()
                .or_else(|| entity.freebase_types.first())
                .or_else(|| entity.r#type.first())
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            relevance_score: round2(entity.relevance_score),
            confidence: round2(entity.confidence_score),
        })
        .collect();

    let topics: Vec<TopicSummary> = document
        .topics
        .iter()
        .take(10)
        .map(|topic| TopicSummary {
            label: if !topic.label.is_empty() {
                topic.label.clone()
            } else if !topic.id.is_empty() {
                topic.id.clone()
            } else {
                "Unknown Topic".to_string()
            },
            score: round2(topic.score),
            wiki_link: topic.wiki_link.clone(),
        })
        .collect();

    info!(
        word_count = metrics.word_count,
        keywords = all_keywords.len(),
        score = scored.score,
        "text analysis complete"
    );

    let response = AnalyzeResponse {
        word_count: metrics.word_count,
        sentence_count: metrics.sentence_count,
        paragraph_count: metrics.paragraph_count,
        avg_words_per_sentence: round1(metrics.avg_words_per_sentence),
        avg_sentences_per_paragraph: round1(metrics.avg_sentences_per_paragraph),
        readability: metrics.readability.clone(),
        keywords: all_keywords.iter().take(15).cloned().collect(),
        keyword_density,
        target_keyword_analysis,
        entities,
        topics,
        sentiment: SentimentSummary {
            score: round2(document.sentiment.score),
            label: document.sentiment.label.clone(),
            confidence: round2(document.sentiment.confidence),
        },
        content_structure: ContentStructureSummary {
            has_headings: metrics.structure.heading_count > 0,
            heading_count: metrics.structure.heading_count,
            list_count: metrics.structure.list_count,
            link_count: metrics.structure.link_count,
            image_count: metrics.structure.image_count,
            has_paragraphs: metrics.paragraph_count > 1,
        },
        seo_analysis: SeoAnalysis {
            score: scored.score,
            grade: scored.grade,
            breakdown: scored.breakdown,
            title_suggestions: titles,
            meta_description_suggestion: meta_suggestion,
            recommendations,
        },
        processing_info: ProcessingInfo {
            annotator_entities: document.entities.len(),
            annotator_topics: document.topics.len(),
            annotator_words: words.len(),
            processed_at: Utc::now().to_rfc3339(),
        },
    };

    Ok(Json(response))
}

async fn optimize_handler(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let text = request
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| bad_request("Text content is required"))?;

    // Exact, case-sensitive comparison against the configured address.
    let authorized = match (&request.email, &state.accepted_email) {
        (Some(email), Some(accepted)) => email == accepted,
        _ => false,
    };
    if !authorized {
        return Err(bad_request("Invalid email provided"));
    }

    let optimizer = state.optimizer.as_ref().ok_or_else(|| {
        error_response(
            "Failed to generate AI optimization",
            AnalysisError::Config("LLM API key not configured".to_string()),
        )
    })?;

    let kind = OptimizationKind::parse(request.optimization_type.as_deref());
    let optimization = optimizer
        .optimize(text, request.target_keyword.as_deref(), kind)
        .await
        .map_err(|err| error_response("Failed to generate AI optimization", err))?;

    Ok(Json(OptimizeResponse {
        optimization,
        r#type: kind.as_str(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}

async fn analyze_url_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> Result<Json<UrlAudit>, ApiError> {
    let raw = request
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| bad_request("Please provide a valid URL to analyze"))?;
    let url: Url = raw.parse().map_err(|_| {
        bad_request("The provided URL format appears to be invalid. Please check and try again.")
    })?;

    let audit = audit_url(&state.page_client, &url)
        .await
        .map_err(|err| error_response("We encountered an issue while analyzing the URL", err))?;
    Ok(Json(audit))
}

async fn insert_keyword_handler(
    Json(request): Json<InsertKeywordRequest>,
) -> Result<Json<InsertKeywordResponse>, ApiError> {
    let (text, keyword) = match (request.text.as_deref(), request.keyword.as_deref()) {
        (Some(text), Some(keyword)) if !text.is_empty() && !keyword.is_empty() => (text, keyword),
        _ => return Err(bad_request("Text and keyword are required")),
    };

    Ok(Json(InsertKeywordResponse {
        updated_text: insert_keyword(text, keyword),
    }))
}

async fn verify_email_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    let email = request
        .email
        .as_deref()
        .ok_or_else(|| bad_request("Verification failed"))?;
    let accepted = state.accepted_email.as_deref().ok_or_else(|| {
        error_response(
            "Server configuration error",
            AnalysisError::Config("accepted email not configured".to_string()),
        )
    })?;

    let is_valid = email.trim().eq_ignore_ascii_case(accepted.trim());
    Ok(Json(VerifyEmailResponse { is_valid }))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
            details: None,
        }),
    )
}

fn error_response(context: &'static str, err: AnalysisError) -> ApiError {
    match err {
        AnalysisError::Validation(message) | AnalysisError::Authorization(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: message,
                details: None,
            }),
        ),
        AnalysisError::FetchTarget { message, .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: message,
                details: None,
            }),
        ),
        AnalysisError::Config(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: message,
                details: None,
            }),
        ),
        err @ AnalysisError::Upstream { .. } => {
            warn!("upstream failure: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: context.to_string(),
                    details: Some(err.to_string()),
                }),
            )
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
