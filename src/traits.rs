//! Extension traits for lookup sources and completion backends.
//!
//! Every external collaborator sits behind one of these traits so the
//! aggregator, analyzer and chat can be assembled from substitutes:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            TermLookupAggregator             │
//! │  ┌──────────┐ ┌────────────┐ ┌───────────┐  │
//! │  │Glossary  │ │ Dictionary │ │ Wikipedia │  │
//! │  │(local)   │ │ (HTTP)     │ │ (HTTP)    │  │
//! │  └──────────┘ └────────────┘ └───────────┘  │
//! │   DefinitionSource ────────▶  SummarySource │
//! └─────────────────────────────────────────────┘
//!
//! ┌──────────────────┐     ┌──────────────────┐
//! │ SentenceAnalyzer │────▶│ CompletionClient │◀──── DocsBuddyChat
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use async_trait::async_trait;
//! use docsbuddy::models::BaseRecord;
//! use docsbuddy::traits::DefinitionSource;
//!
//! /// A source that never knows anything.
//! pub struct EmptySource;
//!
//! #[async_trait]
//! impl DefinitionSource for EmptySource {
//!     fn name(&self) -> &str { "empty" }
//!     async fn fetch(&self, _term: &str) -> Option<BaseRecord> { None }
//! }
//! ```

use async_trait::async_trait;

use crate::completion::AiError;
use crate::glossary::TechnicalGlossary;
use crate::models::{BaseRecord, ChatMessage, WikipediaSummary};

/// A source of base definitions for a term.
///
/// Implementations absorb their own failures: a network error, timeout,
/// non-success status or malformed payload is reported as `None`, never
/// as an error. The aggregator only asks the next source.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Short identifier used in log lines (e.g. `"dictionary"`).
    fn name(&self) -> &str;

    /// Look up `term`, returning `None` when this source has nothing.
    async fn fetch(&self, term: &str) -> Option<BaseRecord>;
}

/// A source of encyclopedia-style summaries.
#[async_trait]
pub trait SummarySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, term: &str) -> Option<WikipediaSummary>;
}

/// Parameters for a single chat-completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    /// Prior turns, oldest first. The final user turn goes last.
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// An opaque text-completion backend: given a prompt, return text or fail.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError>;
}

#[async_trait]
impl DefinitionSource for TechnicalGlossary {
    fn name(&self) -> &str {
        "glossary"
    }

    async fn fetch(&self, term: &str) -> Option<BaseRecord> {
        self.find(term)
    }
}
