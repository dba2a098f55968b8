#![warn(missing_docs)]
//! Core library entry points for the seolens SEO analysis service.

pub mod annotator;
pub mod audit;
pub mod error;
pub mod fetch;
pub mod keywords;
pub mod metrics;
pub mod optimizer;
pub mod performance;
pub mod rewrite;
pub mod scoring;
pub mod suggest;
pub mod technical;

pub use annotator::{AnnotatedDocument, AnnotatorClient, Entity, Sentiment, Topic, Word};
pub use audit::{audit_url, UrlAudit};
pub use error::AnalysisError;
pub use fetch::{FetchedPage, RobotsProbe};
pub use keywords::{extract_keywords, KeywordCandidate, KeywordCategory};
pub use metrics::{ContentMetrics, Readability};
pub use optimizer::{OptimizationKind, OptimizerClient};
pub use rewrite::insert_keyword;
pub use scoring::{score_text, ScoreBreakdown, ScoreInputs, TextScore};
