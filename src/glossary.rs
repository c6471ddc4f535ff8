//! Local technical glossary, related-terms table and term extraction.
//!
//! The glossary answers lookups for a handful of pre-authored programming
//! terms without any network access. Matching is exact first, then loose
//! substring containment in either direction; the first entry in table
//! order wins, so `"api gateway middleware"` resolves to `api`.

use crate::models::{BaseRecord, Resource};

struct GlossaryEntry {
    key: &'static str,
    word: &'static str,
    pronunciation: &'static str,
    part_of_speech: &'static str,
    definitions: &'static [&'static str],
    example_usage: &'static str,
    synonyms: &'static [&'static str],
    resources: &'static [(&'static str, &'static str)],
}

impl GlossaryEntry {
    fn to_record(&self) -> BaseRecord {
        BaseRecord {
            word: self.word.to_string(),
            pronunciation: self.pronunciation.to_string(),
            part_of_speech: self.part_of_speech.to_string(),
            definitions: self.definitions.iter().map(|d| d.to_string()).collect(),
            example_usage: self.example_usage.to_string(),
            synonyms: self.synonyms.iter().map(|s| s.to_string()).collect(),
            resources: self
                .resources
                .iter()
                .map(|(title, url)| Resource::new(*title, *url))
                .collect(),
            is_fallback: false,
        }
    }
}

// Order matters: it is the tie-break for substring matches.
const GLOSSARY: &[GlossaryEntry] = &[
    GlossaryEntry {
        key: "api",
        word: "API",
        pronunciation: "ˈeɪpiːaɪ",
        part_of_speech: "noun",
        definitions: &[
            "Application Programming Interface - a set of rules and protocols for building software applications",
            "A way for different software programs to communicate with each other",
            "A collection of tools and functions that developers can use to build applications",
        ],
        example_usage: "The API allows third-party developers to integrate with our platform",
        synonyms: &["interface", "endpoint", "service", "protocol", "connector"],
        resources: &[
            ("REST API Tutorial", "https://restfulapi.net/"),
            ("OpenAPI Specification", "https://swagger.io/specification/"),
        ],
    },
    GlossaryEntry {
        key: "function",
        word: "Function",
        pronunciation: "ˈfʌŋkʃən",
        part_of_speech: "noun",
        definitions: &[
            "A reusable block of code that performs a specific task",
            "A named section of a program that can be called to execute code",
            "A mathematical relationship between inputs and outputs",
        ],
        example_usage: "The function processes user input and returns formatted data",
        synonyms: &["method", "procedure", "routine", "subroutine", "handler"],
        resources: &[
            (
                "MDN Web Docs - Functions",
                "https://developer.mozilla.org/en-US/docs/Web/JavaScript/Guide/Functions",
            ),
            ("JavaScript.info - Functions", "https://javascript.info/function-basics"),
        ],
    },
    GlossaryEntry {
        key: "database",
        word: "Database",
        pronunciation: "ˈdeɪtəbeɪs",
        part_of_speech: "noun",
        definitions: &[
            "A structured collection of data stored electronically",
            "An organized collection of information that can be easily accessed, managed, and updated",
            "A system for storing and retrieving data in a structured format",
        ],
        example_usage: "The database stores user profiles and authentication data",
        synonyms: &["data store", "repository", "data warehouse", "data bank"],
        resources: &[
            ("SQL Tutorial", "https://www.w3schools.com/sql/"),
            ("MongoDB Documentation", "https://docs.mongodb.com/"),
        ],
    },
    GlossaryEntry {
        key: "authentication",
        word: "Authentication",
        pronunciation: "ɔːˌθɛntɪˈkeɪʃən",
        part_of_speech: "noun",
        definitions: &[
            "The process of verifying the identity of a user or system",
            "A security measure that confirms who someone is before granting access",
            "The act of proving or showing something to be true, genuine, or valid",
        ],
        example_usage: "The authentication system uses JWT tokens for secure access",
        synonyms: &[
            "verification",
            "validation",
            "identification",
            "confirmation",
            "certification",
        ],
        resources: &[
            ("OAuth 2.0 Guide", "https://oauth.net/2/"),
            ("JWT.io", "https://jwt.io/"),
        ],
    },
    GlossaryEntry {
        key: "middleware",
        word: "Middleware",
        pronunciation: "ˈmɪdəlweə",
        part_of_speech: "noun",
        definitions: &[
            "Software that acts as a bridge between different applications or components",
            "A layer of software that provides common services to applications",
            "Software that runs between the operating system and applications",
        ],
        example_usage: "The middleware intercepts requests and applies authentication filters",
        synonyms: &["intermediary", "bridge", "adapter", "connector", "interface"],
        resources: &[
            (
                "Express.js Middleware",
                "https://expressjs.com/en/guide/using-middleware.html",
            ),
            (
                "ASP.NET Core Middleware",
                "https://docs.microsoft.com/en-us/aspnet/core/fundamentals/middleware/",
            ),
        ],
    },
    GlossaryEntry {
        key: "endpoint",
        word: "Endpoint",
        pronunciation: "ˈendpɔɪnt",
        part_of_speech: "noun",
        definitions: &[
            "A specific URL or URI that an API exposes for a particular service",
            "The entry point for a web service or API",
            "A point of termination or completion",
        ],
        example_usage: "The API endpoint /users returns a list of all users",
        synonyms: &["URL", "URI", "route", "path", "service"],
        resources: &[
            (
                "REST API Design",
                "https://restfulapi.net/rest-api-design-tutorial-with-example/",
            ),
            (
                "API Endpoints Guide",
                "https://swagger.io/docs/specification/paths-and-operations/",
            ),
        ],
    },
];

/// Keyword associations for the "related terms" strip.
const RELATED_TERMS: &[(&str, &[&str])] = &[
    (
        "api",
        &["endpoint", "rest", "graphql", "authentication", "authorization"],
    ),
    (
        "function",
        &["method", "procedure", "callback", "closure", "parameter"],
    ),
    (
        "database",
        &["query", "table", "index", "transaction", "schema"],
    ),
    (
        "authentication",
        &["login", "password", "token", "session", "oauth"],
    ),
    ("endpoint", &["url", "route", "method", "request", "response"]),
    (
        "middleware",
        &["pipeline", "request", "handler", "interceptor", "filter"],
    ),
];

pub const MAX_RELATED_TERMS: usize = 5;

/// Vocabulary used to pick lookup candidates out of free text.
const TECHNICAL_VOCABULARY: &[&str] = &[
    "api",
    "function",
    "database",
    "authentication",
    "endpoint",
    "rest",
    "graphql",
    "javascript",
    "python",
    "react",
    "node",
    "express",
    "mongodb",
    "sql",
    "authorization",
    "jwt",
    "oauth",
    "cors",
    "middleware",
];

/// In-memory table of pre-authored technical definitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TechnicalGlossary;

impl TechnicalGlossary {
    pub fn new() -> Self {
        Self
    }

    /// Find a glossary entry for `term`.
    ///
    /// Exact key match on the trimmed, lowercased term first; otherwise the
    /// first entry whose key contains the term or is contained in it.
    pub fn find(&self, term: &str) -> Option<BaseRecord> {
        let normalized = term.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(entry) = GLOSSARY.iter().find(|e| e.key == normalized) {
            return Some(entry.to_record());
        }

        GLOSSARY
            .iter()
            .find(|e| normalized.contains(e.key) || e.key.contains(normalized.as_str()))
            .map(GlossaryEntry::to_record)
    }

    /// Keys in tie-break order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        GLOSSARY.iter().map(|e| e.key)
    }
}

/// Related terms for the first keyword contained in `term`, capped at
/// [`MAX_RELATED_TERMS`].
pub fn related_terms(term: &str) -> Vec<String> {
    let lower = term.to_lowercase();
    RELATED_TERMS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, related)| {
            related
                .iter()
                .take(MAX_RELATED_TERMS)
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Pick words out of `text` that are worth offering as lookups.
///
/// Words are compared after stripping non-word characters and lowercasing;
/// the original words are returned in order of appearance.
pub fn extract_lookup_terms(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| {
            let clean: String = word
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase();
            clean.len() > 2 && TECHNICAL_VOCABULARY.contains(&clean.as_str())
        })
        .map(str::to_string)
        .collect()
}
