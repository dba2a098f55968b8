//! Request-level error taxonomy shared by both analysis pipelines.

use std::error::Error;
use std::fmt;

/// Errors surfaced while servicing an analysis request.
#[derive(Debug)]
pub enum AnalysisError {
    /// Malformed or out-of-range input; user-correctable.
    Validation(String),
    /// Caller is not on the authorized-email allowlist.
    Authorization(String),
    /// A required server secret is missing.
    Config(String),
    /// An upstream service (annotation or LLM API) failed after retries.
    Upstream {
        /// Short name of the failing service.
        service: &'static str,
        /// Underlying failure description.
        message: String,
    },
    /// The analysis target itself was unreachable or returned a non-2xx status.
    FetchTarget {
        /// HTTP status when the target responded at all.
        status: Option<u16>,
        /// Underlying failure description.
        message: String,
    },
}

impl AnalysisError {
    /// Builds an upstream error from any displayable cause.
    pub fn upstream(service: &'static str, err: impl fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Authorization(msg) => write!(f, "{msg}"),
            Self::Config(msg) => write!(f, "{msg}"),
            Self::Upstream { service, message } => write!(f, "{service} error: {message}"),
            Self::FetchTarget {
                status: Some(status),
                message,
            } => write!(f, "target returned {status}: {message}"),
            Self::FetchTarget {
                status: None,
                message,
            } => write!(f, "target unreachable: {message}"),
        }
    }
}

impl Error for AnalysisError {}
