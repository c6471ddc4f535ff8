//! Follow-up lookups on assistant replies.
//!
//! The chat UI runs every DocsBuddy reply through [`lookup_response`] to
//! decide which extra panels to show:
//!
//! ```text
//!   reply ──▶ analyze_response ──┬─ has code  ──▶ language + fenced blocks
//!                                ├─ has docs  ──▶ topics (reply + user query)
//!                                └─ has tools ──▶ `npm install x`, `pip install y`, ...
//!                                        │
//!                                        ▼
//!                               insights + suggestions
//! ```
//!
//! Everything here is keyword and pattern matching over the text; nothing
//! leaves the process.

use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::analyzer::now;

/// Replies longer than this many characters are `intermediate`.
pub const INTERMEDIATE_CHARS: usize = 500;
/// Replies longer than this many characters are `advanced`.
pub const ADVANCED_CHARS: usize = 1000;

const COMMON_TOPICS: &[&str] = &[
    "api",
    "rest",
    "graphql",
    "authentication",
    "database",
    "testing",
    "deployment",
    "security",
];

static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([A-Za-z0-9_]+)?\n((?s:.*?))```").expect("code block pattern is valid")
});

/// Install commands, in reporting order.
static INSTALL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"npm install ([A-Za-z0-9_]+)",
        r"yarn add ([A-Za-z0-9_]+)",
        r"pip install ([A-Za-z0-9_]+)",
        r"gem install ([A-Za-z0-9_]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("install pattern is valid"))
    .collect()
});

// ============ Records ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

/// Which kinds of content a reply contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAnalysis {
    pub has_code: bool,
    pub has_documentation: bool,
    pub has_tools: bool,
    pub has_examples: bool,
    pub has_best_practices: bool,
    pub complexity: Complexity,
}

/// A fenced code block found in a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePattern {
    /// Info string of the fence, or `unknown`.
    pub language: String,
    pub code: String,
    /// Byte offset of the opening fence.
    pub start_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeReferences {
    pub language: String,
    pub patterns: Vec<CodePattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentationLinks {
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsAndLibraries {
    pub mentioned_tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookups {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_references: Option<CodeReferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_links: Option<DocumentationLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_and_libraries: Option<ToolsAndLibraries>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CodeQuality,
    Documentation,
    Tools,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    TestCode,
    ReadDocs,
    EvaluateTools,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub action: SuggestedAction,
    pub description: String,
    pub priority: Priority,
}

/// Everything the UI shows under an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLookup {
    pub timestamp: String,
    pub response_id: String,
    pub analysis: ResponseAnalysis,
    pub lookups: Lookups,
    pub insights: Vec<Insight>,
    pub suggestions: Vec<Suggestion>,
}

// ============ Lookup ============

/// Analyze `response` and gather the lookups its content calls for.
///
/// `user_query` only feeds topic detection.
pub fn lookup_response(response: &str, user_query: &str) -> ResponseLookup {
    let analysis = analyze_response(response);

    let lookups = Lookups {
        code_references: analysis.has_code.then(|| CodeReferences {
            language: detect_code_language(response).to_string(),
            patterns: extract_code_patterns(response),
        }),
        documentation_links: analysis.has_documentation.then(|| DocumentationLinks {
            topics: extract_topics(response, user_query),
        }),
        tools_and_libraries: analysis.has_tools.then(|| ToolsAndLibraries {
            mentioned_tools: extract_mentioned_tools(response),
        }),
    };

    let insights = generate_insights(&lookups);
    let suggestions = generate_suggestions(&analysis);
    tracing::debug!(
        insights = insights.len(),
        complexity = ?analysis.complexity,
        "response lookup complete"
    );

    ResponseLookup {
        timestamp: now(),
        response_id: response_id(),
        analysis,
        lookups,
        insights,
        suggestions,
    }
}

pub fn analyze_response(response: &str) -> ResponseAnalysis {
    let has_any = |needles: &[&str]| needles.iter().any(|n| response.contains(n));
    let length = response.chars().count();

    ResponseAnalysis {
        has_code: has_any(&["```", "function", "const ", "let "]),
        has_documentation: has_any(&["documentation", "docs", "guide", "tutorial"]),
        has_tools: has_any(&["npm", "package", "library", "framework"]),
        has_examples: has_any(&["example", "instance", "case"]),
        has_best_practices: has_any(&["best practice", "recommended", "should", "avoid"]),
        complexity: if length > ADVANCED_CHARS {
            Complexity::Advanced
        } else if length > INTERMEDIATE_CHARS {
            Complexity::Intermediate
        } else {
            Complexity::Basic
        },
    }
}

/// Guess the language of code in `text` from a few telltale tokens.
pub fn detect_code_language(text: &str) -> &'static str {
    if text.contains("function") && text.contains("const") {
        "javascript"
    } else if text.contains("def ") || text.contains("import ") {
        "python"
    } else if text.contains("public class") || text.contains("public static") {
        "java"
    } else if text.contains("<?php") || text.contains('$') {
        "php"
    } else {
        "unknown"
    }
}

pub fn extract_code_patterns(text: &str) -> Vec<CodePattern> {
    CODE_BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let fence = caps.get(0)?;
            Some(CodePattern {
                language: caps
                    .get(1)
                    .map_or("unknown", |m| m.as_str())
                    .to_string(),
                code: caps.get(2)?.as_str().trim().to_string(),
                start_index: fence.start(),
            })
        })
        .collect()
}

/// Common documentation topics mentioned in the reply or the question.
pub fn extract_topics(text: &str, user_query: &str) -> Vec<String> {
    let combined = format!("{} {}", text, user_query).to_lowercase();
    COMMON_TOPICS
        .iter()
        .filter(|topic| combined.contains(*topic))
        .map(|topic| topic.to_string())
        .collect()
}

/// Package names from install commands, grouped by package manager.
pub fn extract_mentioned_tools(text: &str) -> Vec<String> {
    INSTALL_RES
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn generate_insights(lookups: &Lookups) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(code) = &lookups.code_references {
        insights.push(Insight {
            kind: InsightKind::CodeQuality,
            message: format!(
                "The response includes {} code patterns. Consider reviewing best practices for {}.",
                code.patterns.len(),
                code.language
            ),
            priority: Priority::Medium,
        });
    }

    if let Some(docs) = &lookups.documentation_links {
        let message = if docs.topics.is_empty() {
            "The response points to documentation.".to_string()
        } else {
            format!(
                "Found {} documentation topics: {}.",
                docs.topics.len(),
                docs.topics.join(", ")
            )
        };
        insights.push(Insight {
            kind: InsightKind::Documentation,
            message,
            priority: Priority::High,
        });
    }

    if let Some(tools) = &lookups.tools_and_libraries {
        insights.push(Insight {
            kind: InsightKind::Tools,
            message: format!(
                "Response mentions {} tools. Check compatibility and alternatives.",
                tools.mentioned_tools.len()
            ),
            priority: Priority::Medium,
        });
    }

    insights
}

fn generate_suggestions(analysis: &ResponseAnalysis) -> Vec<Suggestion> {
    let candidates = [
        (
            analysis.has_code,
            SuggestedAction::TestCode,
            "Test the provided code examples in your development environment",
            Priority::High,
        ),
        (
            analysis.has_documentation,
            SuggestedAction::ReadDocs,
            "Review the suggested documentation for deeper understanding",
            Priority::Medium,
        ),
        (
            analysis.has_tools,
            SuggestedAction::EvaluateTools,
            "Evaluate the mentioned tools for your specific use case",
            Priority::Medium,
        ),
    ];

    candidates
        .into_iter()
        .filter(|(applies, ..)| *applies)
        .map(|(_, action, description, priority)| Suggestion {
            action,
            description: description.to_string(),
            priority,
        })
        .collect()
}

/// `lookup_<epoch millis>_<9 random lowercase alphanumerics>`.
fn response_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("lookup_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_flags() {
        let analysis = analyze_response(
            "Install the library, then read the docs. For example you should avoid globals.",
        );
        assert!(!analysis.has_code);
        assert!(analysis.has_documentation);
        assert!(analysis.has_tools);
        assert!(analysis.has_examples);
        assert!(analysis.has_best_practices);
        assert_eq!(analysis.complexity, Complexity::Basic);
    }

    #[test]
    fn test_analyze_plain_reply() {
        let analysis = analyze_response("Sure, happy to help.");
        assert!(!analysis.has_code);
        assert!(!analysis.has_documentation);
        assert!(!analysis.has_tools);
        assert!(!analysis.has_examples);
        assert!(!analysis.has_best_practices);
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(analyze_response(&"a".repeat(500)).complexity, Complexity::Basic);
        assert_eq!(
            analyze_response(&"a".repeat(501)).complexity,
            Complexity::Intermediate
        );
        assert_eq!(
            analyze_response(&"a".repeat(1000)).complexity,
            Complexity::Intermediate
        );
        assert_eq!(
            analyze_response(&"a".repeat(1001)).complexity,
            Complexity::Advanced
        );
        // Characters, not bytes.
        assert_eq!(analyze_response(&"é".repeat(400)).complexity, Complexity::Basic);
    }

    #[test]
    fn test_detect_code_language() {
        assert_eq!(
            detect_code_language("const f = function() {}"),
            "javascript"
        );
        assert_eq!(detect_code_language("def main():\n    pass"), "python");
        assert_eq!(detect_code_language("import os"), "python");
        assert_eq!(detect_code_language("public class Foo {}"), "java");
        assert_eq!(detect_code_language("echo $name;"), "php");
        assert_eq!(detect_code_language("plain words"), "unknown");
        // `function` alone is not enough for javascript.
        assert_eq!(detect_code_language("a function"), "unknown");
    }

    #[test]
    fn test_extract_code_patterns() {
        let text = "Try:\n```js\nconst a = 1;\n```\nor\n```\n  echo hi  \n```";
        let patterns = extract_code_patterns(text);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].language, "js");
        assert_eq!(patterns[0].code, "const a = 1;");
        assert_eq!(patterns[0].start_index, 5);
        assert_eq!(patterns[1].language, "unknown");
        assert_eq!(patterns[1].code, "echo hi");
    }

    #[test]
    fn test_extract_code_patterns_needs_newline_after_fence() {
        assert!(extract_code_patterns("inline ```code``` only").is_empty());
    }

    #[test]
    fn test_extract_topics_uses_query() {
        let topics = extract_topics("Add a REST endpoint.", "How do I test my Database?");
        assert_eq!(topics, ["rest", "database"]);
    }

    #[test]
    fn test_extract_mentioned_tools_in_manager_order() {
        let text = "pip install requests\nnpm install express\nnpm install cors\n\
                    gem install rails\nyarn add lodash";
        assert_eq!(
            extract_mentioned_tools(text),
            ["express", "cors", "lodash", "requests", "rails"]
        );
    }

    #[test]
    fn test_lookup_response_composes_sections() {
        let reply = "Run `npm install axios`, then see the docs:\n```js\nconst x = 1;\n```";
        let lookup = lookup_response(reply, "api client");

        let code = lookup.lookups.code_references.as_ref().unwrap();
        assert_eq!(code.patterns.len(), 1);
        let docs = lookup.lookups.documentation_links.as_ref().unwrap();
        assert_eq!(docs.topics, ["api"]);
        let tools = lookup.lookups.tools_and_libraries.as_ref().unwrap();
        assert_eq!(tools.mentioned_tools, ["axios"]);

        let kinds: Vec<InsightKind> = lookup.insights.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [
                InsightKind::CodeQuality,
                InsightKind::Documentation,
                InsightKind::Tools
            ]
        );
        assert_eq!(
            lookup.insights[0].message,
            "The response includes 1 code patterns. Consider reviewing best practices for unknown."
        );
        assert_eq!(lookup.suggestions[0].action, SuggestedAction::TestCode);
        assert_eq!(lookup.suggestions[0].priority, Priority::High);
        assert_eq!(lookup.suggestions.len(), 3);
    }

    #[test]
    fn test_lookup_response_plain_reply_is_empty() {
        let lookup = lookup_response("Sure, happy to help.", "");
        assert_eq!(lookup.lookups, Lookups::default());
        assert!(lookup.insights.is_empty());
        assert!(lookup.suggestions.is_empty());
    }

    #[test]
    fn test_response_id_shape() {
        let id = response_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "lookup");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_serialized_shape() {
        let lookup = lookup_response("```py\nimport os\n```", "");
        let json = serde_json::to_value(&lookup).unwrap();
        assert_eq!(json["analysis"]["hasCode"], true);
        assert_eq!(json["analysis"]["complexity"], "basic");
        assert_eq!(json["lookups"]["codeReferences"]["language"], "python");
        assert_eq!(json["lookups"]["codeReferences"]["patterns"][0]["startIndex"], 0);
        assert!(json["lookups"].get("toolsAndLibraries").is_none());
        assert_eq!(json["insights"][0]["type"], "code_quality");
        assert_eq!(json["suggestions"][0]["action"], "test_code");
        assert!(json["responseId"].as_str().unwrap().starts_with("lookup_"));
    }
}
