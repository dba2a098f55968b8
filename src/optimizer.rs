//! LLM-backed content optimization suggestions.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Default chat-completions base URL.
pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1";
/// Default completion model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

const LLM_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: usize = 1500;
const TEMPERATURE: f32 = 0.7;
const SYSTEM_PROMPT: &str =
    "You are an expert SEO content optimizer. Provide actionable, specific recommendations.";

/// Which optimization angle the caller requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationKind {
    /// Keyword research and placement suggestions.
    Keywords,
    /// Rewritten content with SEO improvements.
    Content,
    /// Title, description, and other meta elements.
    Meta,
    /// Heading hierarchy and section structure.
    Structure,
    /// Everything at once.
    General,
}

impl OptimizationKind {
    /// Maps the request string onto a kind; unknown values get the
    /// comprehensive treatment.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("keywords") => Self::Keywords,
            Some("content") => Self::Content,
            Some("meta") => Self::Meta,
            Some("structure") => Self::Structure,
            _ => Self::General,
        }
    }

    /// Stable name echoed back in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Content => "content",
            Self::Meta => "meta",
            Self::Structure => "structure",
            Self::General => "default",
        }
    }

    fn build_prompt(&self, text: &str, target_keyword: Option<&str>) -> String {
        let keyword_line = target_keyword
            .map(|k| format!("\nTarget keyword: \"{k}\""))
            .unwrap_or_default();

        match self {
            Self::Keywords => format!(
                "Analyze this content and suggest 10-15 high-value SEO keywords that should be naturally integrated. Focus on long-tail keywords and semantic variations.\n\n\
                 Content: \"{text}\"{keyword_line}\n\n\
                 Provide keywords in this format:\n\
                 - Primary keywords (3-5): [list]\n\
                 - Long-tail keywords (5-7): [list]\n\
                 - Semantic variations (3-5): [list]\n\n\
                 Also suggest where each keyword type should be placed (title, headings, body, meta description)."
            ),
            Self::Content => format!(
                "Optimize this content for SEO while maintaining readability and value. Focus on:\n\
                 1. Natural keyword integration\n\
                 2. Improved structure with headings\n\
                 3. Better readability\n\
                 4. Enhanced user engagement\n\n\
                 Original content: \"{text}\"{keyword_line}\n\n\
                 Provide the optimized version with clear improvements marked."
            ),
            Self::Meta => format!(
                "Create SEO-optimized meta elements for this content:\n\n\
                 Content: \"{text}\"{keyword_line}\n\n\
                 Provide:\n\
                 1. 3 compelling title options (50-60 characters)\n\
                 2. 2 meta descriptions (150-160 characters)\n\
                 3. 5-8 relevant meta keywords\n\
                 4. Suggested URL slug\n\
                 5. Open Graph title and description"
            ),
            Self::Structure => format!(
                "Analyze and improve the content structure for better SEO:\n\n\
                 Content: \"{text}\"\n\n\
                 Provide:\n\
                 1. Suggested heading hierarchy (H1, H2, H3)\n\
                 2. Content sections that should be added\n\
                 3. Internal linking opportunities\n\
                 4. Call-to-action placements\n\
                 5. FAQ section suggestions\n\
                 6. Schema markup recommendations"
            ),
            Self::General => format!(
                "Provide comprehensive SEO optimization suggestions for this content:\n\n\
                 Content: \"{text}\"{keyword_line}\n\n\
                 Include:\n\
                 1. Keyword optimization opportunities\n\
                 2. Content structure improvements\n\
                 3. Readability enhancements\n\
                 4. Meta tag suggestions\n\
                 5. Technical SEO recommendations"
            ),
        }
    }
}

/// Chat-completions client for optimization suggestions.
#[derive(Clone)]
pub struct OptimizerClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OptimizerClient {
    /// Builds a new optimizer client.
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, AnalysisError> {
        if api_key.trim().is_empty() {
            return Err(AnalysisError::Config(
                "LLM API key not configured".to_string(),
            ));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| AnalysisError::Config("invalid LLM API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(LLM_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|err| AnalysisError::upstream("optimizer", err))?;
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model,
        })
    }

    /// Requests optimization suggestions for one document.
    pub async fn optimize(
        &self,
        text: &str,
        target_keyword: Option<&str>,
        kind: OptimizationKind,
    ) -> Result<String, AnalysisError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: kind.build_prompt(text, target_keyword),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| AnalysisError::upstream("optimizer", err))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AnalysisError::Upstream {
                service: "optimizer",
                message: format!("{status}: {text}"),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| AnalysisError::upstream("optimizer", err))?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(AnalysisError::Upstream {
                service: "optimizer",
                message: "response missing completion content".to_string(),
            });
        }
        Ok(answer)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_types_fall_back_to_general() {
        assert_eq!(OptimizationKind::parse(Some("keywords")), OptimizationKind::Keywords);
        assert_eq!(OptimizationKind::parse(Some("bogus")), OptimizationKind::General);
        assert_eq!(OptimizationKind::parse(None), OptimizationKind::General);
    }

    #[test]
    fn prompts_embed_content_and_target_keyword() {
        let prompt =
            OptimizationKind::Keywords.build_prompt("my article body", Some("rust hosting"));
        assert!(prompt.contains("my article body"));
        assert!(prompt.contains("Target keyword: \"rust hosting\""));

        let without = OptimizationKind::Meta.build_prompt("my article body", None);
        assert!(!without.contains("Target keyword"));
    }

    #[test]
    fn structure_prompt_ignores_target_keyword() {
        let prompt = OptimizationKind::Structure.build_prompt("body", Some("kw"));
        assert!(!prompt.contains("Target keyword"));
        assert!(prompt.contains("heading hierarchy"));
    }

    #[test]
    fn completion_response_parses_first_choice() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Add headings."}}]}"#,
        )
        .expect("parse");
        assert_eq!(parsed.choices[0].message.content, "Add headings.");
    }
}
