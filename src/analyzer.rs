//! Sentence analysis with an LLM, falling back to fixed templates.
//!
//! The analyzer uses its own "SentenceAnalyzer" persona, separate from the
//! DocsBuddy chat persona, and keeps answers short (`ai.analyzer_max_tokens`).
//! When no credential is configured or the call fails, [`SentenceAnalyzer::analyze`]
//! returns a deterministic templated response built from the sentence
//! itself, so callers always get a well-formed [`SentenceAnalysis`].

use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::completion::AiError;
use crate::config::AiConfig;
use crate::models::{ChatMessage, SentenceAnalysis};
use crate::traits::{CompletionClient, CompletionRequest};

pub const DEFAULT_ANALYSIS_TYPE: &str = "summarize";

pub const FALLBACK_NOTE: &str = "AI analysis not available. Using fallback response. \
Add OPENAI_API_KEY to your .env.local for AI-powered analysis.";

/// Known analysis styles. Unknown names are passed to the model verbatim
/// and use the summarize template when falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Summarize,
    Simplify,
    Explain,
}

impl AnalysisKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "summarize" => Some(Self::Summarize),
            "simplify" => Some(Self::Simplify),
            "explain" => Some(Self::Explain),
            _ => None,
        }
    }
}

pub struct SentenceAnalyzer {
    client: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl SentenceAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>, config: &AiConfig) -> Self {
        Self {
            client,
            model: config.analyzer_model.clone(),
            max_tokens: config.analyzer_max_tokens,
            temperature: config.analyzer_temperature,
        }
    }

    /// Analyze `sentence`, never failing.
    pub async fn analyze(&self, sentence: &str, analysis_type: &str) -> SentenceAnalysis {
        match self.try_analyze(sentence, analysis_type).await {
            Ok(analysis) => analysis,
            Err(e) => self.fallback(sentence, analysis_type, &e),
        }
    }

    /// Templated result standing in for a failed model call.
    pub fn fallback(&self, sentence: &str, analysis_type: &str, err: &AiError) -> SentenceAnalysis {
        match err {
            AiError::MissingCredential => {
                tracing::debug!("sentence analysis using fallback: no credential")
            }
            other => tracing::warn!(error = %other, "sentence analysis failed, using fallback"),
        }
        fallback_analysis(sentence, analysis_type)
    }

    /// Analyze `sentence` with the model, surfacing the upstream error.
    pub async fn try_analyze(
        &self,
        sentence: &str,
        analysis_type: &str,
    ) -> Result<SentenceAnalysis, AiError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: system_prompt(analysis_type),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!("Please analyze this sentence: \"{}\"", sentence),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.client.complete(request).await?;

        Ok(SentenceAnalysis {
            response,
            analysis_type: analysis_type.to_string(),
            original_sentence: sentence.to_string(),
            timestamp: now(),
            is_ai: true,
            is_fallback: false,
            note: None,
        })
    }
}

/// Current time as RFC 3339 with millisecond precision.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn system_prompt(analysis_type: &str) -> String {
    format!(
        "You are SentenceAnalyzer, a specialized AI that analyzes and processes text sentences. \
You are different from the main documentation assistant and focus specifically on:

- Summarizing complex sentences into simple, clear language
- Breaking down technical jargon into understandable terms
- Identifying key concepts and main ideas
- Providing alternative phrasings and explanations
- Highlighting important points and relationships

Your responses should be:
- Concise and focused (2-3 sentences max)
- Clear and easy to understand
- Helpful for learning and comprehension
- Different in tone from a general documentation assistant

Current analysis type: {}",
        analysis_type
    )
}

/// Templated response text for `analysis_type`.
pub fn fallback_response(sentence: &str, analysis_type: &str) -> String {
    match AnalysisKind::parse(analysis_type).unwrap_or(AnalysisKind::Summarize) {
        AnalysisKind::Summarize => {
            let lower = sentence.to_lowercase();
            let topic = if lower.contains("api") {
                "API development"
            } else if lower.contains("function") {
                "programming functions"
            } else {
                "general content"
            };
            format!(
                "This sentence \"{}\" appears to be about {}. It's a clear statement that could benefit from additional context or examples.",
                sentence, topic
            )
        }
        AnalysisKind::Simplify => format!(
            "The sentence \"{}\" is straightforward and easy to understand. It communicates its message clearly without unnecessary complexity.",
            sentence
        ),
        AnalysisKind::Explain => format!(
            "This sentence \"{}\" presents information in a direct manner. It's well-structured and conveys its meaning effectively.",
            sentence
        ),
    }
}

/// Offline analysis result.
pub fn fallback_analysis(sentence: &str, analysis_type: &str) -> SentenceAnalysis {
    SentenceAnalysis {
        response: fallback_response(sentence, analysis_type),
        analysis_type: analysis_type.to_string(),
        original_sentence: sentence.to_string(),
        timestamp: now(),
        is_ai: false,
        is_fallback: true,
        note: Some(FALLBACK_NOTE.to_string()),
    }
}
