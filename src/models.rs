//! Core data models returned by the lookup and analysis endpoints.
//!
//! Field names serialize in camelCase because the browser UI consumes
//! these records directly.

use serde::{Deserialize, Serialize};

/// An external link shown under a lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

impl Resource {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Encyclopedia summary attached to a lookup when the probe succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikipediaSummary {
    pub title: String,
    pub extract: String,
    pub url: String,
}

/// Whether an AI-backed path is usable in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    #[serde(rename = "hasOpenAI")]
    pub has_openai: bool,
    #[serde(rename = "hasAnyAI")]
    pub has_any_ai: bool,
    pub status: AiAvailability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiAvailability {
    Online,
    Offline,
}

/// The part of a lookup produced by exactly one of glossary, dictionary
/// or fallback, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRecord {
    pub word: String,
    pub pronunciation: String,
    pub part_of_speech: String,
    pub definitions: Vec<String>,
    pub example_usage: String,
    pub synonyms: Vec<String>,
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
}

/// Normalized result of a term lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRecord {
    /// The term exactly as the user selected it.
    pub term: String,
    pub word: String,
    pub pronunciation: String,
    pub part_of_speech: String,
    pub definitions: Vec<String>,
    pub example_usage: String,
    pub synonyms: Vec<String>,
    pub resources: Vec<Resource>,
    pub related_terms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikipedia: Option<WikipediaSummary>,
    pub ai_status: AiStatus,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
}

impl LookupRecord {
    pub fn assemble(
        term: &str,
        base: BaseRecord,
        wikipedia: Option<WikipediaSummary>,
        related_terms: Vec<String>,
        ai_status: AiStatus,
    ) -> Self {
        Self {
            term: term.to_string(),
            word: base.word,
            pronunciation: base.pronunciation,
            part_of_speech: base.part_of_speech,
            definitions: base.definitions,
            example_usage: base.example_usage,
            synonyms: base.synonyms,
            resources: base.resources,
            related_terms,
            wikipedia,
            ai_status,
            is_fallback: base.is_fallback,
        }
    }
}

/// Result of a sentence analysis, from the model or the offline template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceAnalysis {
    pub response: String,
    pub analysis_type: String,
    pub original_sentence: String,
    /// RFC 3339 timestamp of when the analysis was produced.
    pub timestamp: String,
    #[serde(rename = "isAI", skip_serializing_if = "std::ops::Not::not")]
    pub is_ai: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One turn of a chat conversation as sent by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_base(is_fallback: bool) -> BaseRecord {
        BaseRecord {
            word: "API".to_string(),
            pronunciation: "N/A".to_string(),
            part_of_speech: "noun".to_string(),
            definitions: vec!["one".to_string()],
            example_usage: "No example available".to_string(),
            synonyms: vec![],
            resources: vec![Resource::new("Docs", "https://example.com")],
            is_fallback,
        }
    }

    fn offline() -> AiStatus {
        AiStatus {
            has_openai: false,
            has_any_ai: false,
            status: AiAvailability::Offline,
        }
    }

    #[test]
    fn test_lookup_record_json_shape() {
        let record = LookupRecord::assemble("api", sample_base(false), None, vec![], offline());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["term"], "api");
        assert_eq!(json["word"], "API");
        assert_eq!(json["partOfSpeech"], "noun");
        assert_eq!(json["exampleUsage"], "No example available");
        assert_eq!(json["aiStatus"]["hasOpenAI"], false);
        assert_eq!(json["aiStatus"]["hasAnyAI"], false);
        assert_eq!(json["aiStatus"]["status"], "offline");
        assert!(json.get("wikipedia").is_none());
        assert!(json.get("isFallback").is_none());
        assert!(json["relatedTerms"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_fallback_flag_serialized_when_set() {
        let record = LookupRecord::assemble("x", sample_base(true), None, vec![], offline());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["isFallback"], true);
    }

    #[test]
    fn test_analysis_flags() {
        let analysis = SentenceAnalysis {
            response: "r".to_string(),
            analysis_type: "summarize".to_string(),
            original_sentence: "s".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            is_ai: true,
            is_fallback: false,
            note: None,
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["isAI"], true);
        assert_eq!(json["originalSentence"], "s");
        assert!(json.get("isFallback").is_none());
        assert!(json.get("note").is_none());
    }
}
