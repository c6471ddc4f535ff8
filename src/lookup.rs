//! Term lookup aggregation.
//!
//! [`TermLookupAggregator::lookup`] merges the configured sources into one
//! [`LookupRecord`]:
//!
//! ```text
//!   term ──┬──▶ glossary ──miss──▶ dictionary ──miss──▶ fallback ──┐
//!          │                                                       ├──▶ record
//!          └──▶ wikipedia (best effort, concurrent) ───────────────┘
//!                                   + related terms + aiStatus
//! ```
//!
//! Base sources are tried strictly in order and the first hit wins. The
//! Wikipedia probe runs alongside base resolution and never affects which
//! base was chosen. Lookups cannot fail: when every source comes up empty
//! the result is a fallback record with `isFallback: true`.

use anyhow::Result;
use std::sync::Arc;

use crate::config::LookupConfig;
use crate::dictionary::{DictionaryApi, NO_EXAMPLE, UNKNOWN};
use crate::glossary::{related_terms, TechnicalGlossary};
use crate::models::{AiStatus, BaseRecord, LookupRecord, Resource, WikipediaSummary};
use crate::traits::{DefinitionSource, SummarySource};
use crate::wikipedia::WikipediaApi;

pub const FALLBACK_DEFINITIONS: [&str; 3] = [
    "Unable to fetch definition at this time. Please check your internet connection.",
    "This term may be technical or domain-specific.",
    "Try selecting a different word or phrase.",
];

pub struct TermLookupAggregator {
    sources: Vec<Box<dyn DefinitionSource>>,
    summary: Option<Box<dyn SummarySource>>,
    ai_status: AiStatus,
}

impl TermLookupAggregator {
    /// An aggregator with no sources; every lookup yields a fallback.
    pub fn new(ai_status: AiStatus) -> Self {
        Self {
            sources: Vec::new(),
            summary: None,
            ai_status,
        }
    }

    /// The standard chain: glossary, dictionary API, Wikipedia.
    pub fn from_config(config: &LookupConfig, ai_status: AiStatus) -> Result<Self> {
        Ok(Self::new(ai_status)
            .with_source(Box::new(TechnicalGlossary::new()))
            .with_source(Box::new(DictionaryApi::new(config)?))
            .with_summary(Box::new(WikipediaApi::new(config)?)))
    }

    /// Append a base source. Sources are consulted in registration order.
    pub fn with_source(mut self, source: Box<dyn DefinitionSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_summary(mut self, summary: Box<dyn SummarySource>) -> Self {
        self.summary = Some(summary);
        self
    }

    pub async fn lookup(&self, term: &str) -> LookupRecord {
        let (base, wikipedia) = tokio::join!(self.resolve_base(term), self.probe_summary(term));

        LookupRecord::assemble(term, base, wikipedia, related_terms(term), self.ai_status)
    }

    async fn resolve_base(&self, term: &str) -> BaseRecord {
        for source in &self.sources {
            if let Some(record) = source.fetch(term).await {
                tracing::debug!(term, source = source.name(), "lookup resolved");
                return ensure_definitions(record);
            }
            tracing::debug!(term, source = source.name(), "no result, trying next source");
        }

        tracing::info!(term, "no source had a definition, using fallback");
        fallback_record(term)
    }

    async fn probe_summary(&self, term: &str) -> Option<WikipediaSummary> {
        match &self.summary {
            Some(summary) => summary.fetch(term).await,
            None => None,
        }
    }
}

/// Substitute sources may return an empty list; records never do.
fn ensure_definitions(mut record: BaseRecord) -> BaseRecord {
    if record.definitions.is_empty() {
        record
            .definitions
            .push(crate::dictionary::NO_DEFINITION.to_string());
    }
    record
}

/// Record returned when no source produced real data.
pub fn fallback_record(term: &str) -> BaseRecord {
    let encoded = urlencoding::encode(term);
    BaseRecord {
        word: term.to_string(),
        pronunciation: UNKNOWN.to_string(),
        part_of_speech: "noun".to_string(),
        definitions: FALLBACK_DEFINITIONS.iter().map(|d| d.to_string()).collect(),
        example_usage: NO_EXAMPLE.to_string(),
        synonyms: vec!["term".to_string(), "word".to_string(), "phrase".to_string()],
        resources: vec![
            Resource::new(
                "Google Search",
                format!("https://www.google.com/search?q={}", encoded),
            ),
            Resource::new(
                "Merriam-Webster",
                format!("https://www.merriam-webster.com/dictionary/{}", encoded),
            ),
        ],
        is_fallback: true,
    }
}

/// Fallback lookup record, for callers that never reached an aggregator.
pub fn fallback_lookup(term: &str, ai_status: AiStatus) -> LookupRecord {
    LookupRecord::assemble(
        term,
        fallback_record(term),
        None,
        related_terms(term),
        ai_status,
    )
}

/// Shared handle used by the server and CLI.
pub type SharedAggregator = Arc<TermLookupAggregator>;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Failing;

    #[async_trait]
    impl DefinitionSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        async fn fetch(&self, _term: &str) -> Option<BaseRecord> {
            None
        }
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
        record: Option<BaseRecord>,
    }

    #[async_trait]
    impl DefinitionSource for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        async fn fetch(&self, _term: &str) -> Option<BaseRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.record.clone()
        }
    }

    struct FixedSummary(Option<WikipediaSummary>);

    #[async_trait]
    impl SummarySource for FixedSummary {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn fetch(&self, _term: &str) -> Option<WikipediaSummary> {
            self.0.clone()
        }
    }

    /// A slow source that answers with no definitions.
    struct SlowEmptySource;

    #[async_trait]
    impl DefinitionSource for SlowEmptySource {
        fn name(&self) -> &str {
            "slow-empty"
        }
        async fn fetch(&self, term: &str) -> Option<BaseRecord> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut record = fallback_record(term);
            record.is_fallback = false;
            record.definitions = vec![];
            Some(record)
        }
    }

    fn offline() -> AiStatus {
        AiStatus::from_credential(false)
    }

    fn summary() -> WikipediaSummary {
        WikipediaSummary {
            title: "API".to_string(),
            extract: "An interface.".to_string(),
            url: "https://en.wikipedia.org/wiki/API".to_string(),
        }
    }

    #[tokio::test]
    async fn test_glossary_hit_without_network() {
        let aggregator = TermLookupAggregator::new(offline())
            .with_source(Box::new(TechnicalGlossary::new()))
            .with_source(Box::new(Failing));

        let record = aggregator.lookup("API").await;
        assert_eq!(record.term, "API");
        assert_eq!(record.word, "API");
        assert_eq!(record.part_of_speech, "noun");
        assert_eq!(record.definitions.len(), 3);
        assert!(record.synonyms.contains(&"interface".to_string()));
        assert!(!record.is_fallback);
        assert_eq!(
            record.related_terms,
            ["endpoint", "rest", "graphql", "authentication", "authorization"]
        );
    }

    #[tokio::test]
    async fn test_later_sources_skipped_after_hit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = TermLookupAggregator::new(offline())
            .with_source(Box::new(TechnicalGlossary::new()))
            .with_source(Box::new(Counting {
                calls: calls.clone(),
                record: None,
            }));

        aggregator.lookup("database").await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        aggregator.lookup("banana").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let aggregator = TermLookupAggregator::new(offline())
            .with_source(Box::new(TechnicalGlossary::new()))
            .with_source(Box::new(Failing))
            .with_summary(Box::new(FixedSummary(None)));

        let record = aggregator.lookup("xyzzyunknown123").await;
        assert!(record.is_fallback);
        assert_eq!(record.word, "xyzzyunknown123");
        assert!(record.definitions[0].contains("check your internet connection"));
        assert_eq!(record.definitions, FALLBACK_DEFINITIONS);
        assert!(record
            .resources
            .iter()
            .any(|r| r.url == "https://www.google.com/search?q=xyzzyunknown123"));
        assert!(record.wikipedia.is_none());
        assert!(record.related_terms.is_empty());
    }

    #[tokio::test]
    async fn test_wikipedia_is_additive() {
        let without = TermLookupAggregator::new(offline())
            .with_source(Box::new(Failing))
            .with_summary(Box::new(FixedSummary(None)));
        let with = TermLookupAggregator::new(offline())
            .with_source(Box::new(Failing))
            .with_summary(Box::new(FixedSummary(Some(summary()))));

        let a = without.lookup("api gateway").await;
        let b = with.lookup("api gateway").await;
        assert_eq!(a.is_fallback, b.is_fallback);
        assert_eq!(a.definitions, b.definitions);
        assert!(a.wikipedia.is_none());
        assert_eq!(b.wikipedia, Some(summary()));
    }

    #[tokio::test]
    async fn test_empty_definitions_are_filled() {
        let aggregator = TermLookupAggregator::new(offline())
            .with_source(Box::new(SlowEmptySource))
            .with_summary(Box::new(FixedSummary(Some(summary()))));

        let record = aggregator.lookup("thing").await;
        assert!(!record.is_fallback);
        assert_eq!(record.definitions, [crate::dictionary::NO_DEFINITION]);
        assert!(record.wikipedia.is_some());
    }

    #[tokio::test]
    async fn test_ai_status_is_copied_from_aggregator() {
        let aggregator = TermLookupAggregator::new(AiStatus::from_credential(true));
        let record = aggregator.lookup("anything").await;
        assert!(record.ai_status.is_online());
        assert!(record.is_fallback);
    }

    #[test]
    fn test_fallback_record_encodes_term() {
        let record = fallback_record("rust & c++");
        assert_eq!(
            record.resources[0].url,
            "https://www.google.com/search?q=rust%20%26%20c%2B%2B"
        );
    }
}
