//! Public dictionary API adapter.
//!
//! Issues one `GET {dictionary_url}/{term}` per lookup and maps the first
//! entry's first meaning into a [`BaseRecord`]. The whole request, body
//! included, is bounded by `lookup.dictionary_timeout_ms`.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::LookupConfig;
use crate::models::{BaseRecord, Resource};
use crate::traits::DefinitionSource;

pub const NO_DEFINITION: &str = "No definition available";
pub const NO_EXAMPLE: &str = "No example available";
pub const UNKNOWN: &str = "N/A";

const MAX_SYNONYMS: usize = 5;

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<Phonetic>,
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
struct Phonetic {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meaning {
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<Definition>,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// HTTP client for a dictionaryapi.dev-compatible endpoint.
pub struct DictionaryApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DictionaryApi {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.dictionary_url.trim_end_matches('/').to_string(),
            timeout: config.dictionary_timeout(),
        })
    }

    async fn request(&self, term: &str) -> Result<Vec<Entry>> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(term));
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Dictionary API returned {}", status);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DefinitionSource for DictionaryApi {
    fn name(&self) -> &str {
        "dictionary"
    }

    async fn fetch(&self, term: &str) -> Option<BaseRecord> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        match tokio::time::timeout(self.timeout, self.request(term)).await {
            Ok(Ok(entries)) => {
                let record = entries.into_iter().next().map(|e| map_entry(term, e));
                if record.is_none() {
                    tracing::debug!(term, "dictionary returned no entries");
                }
                record
            }
            Ok(Err(e)) => {
                tracing::warn!(term, error = %e, "dictionary lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    term,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "dictionary lookup timed out"
                );
                None
            }
        }
    }
}

fn map_entry(term: &str, entry: Entry) -> BaseRecord {
    let pronunciation = entry
        .phonetic
        .filter(|p| !p.is_empty())
        .or_else(|| {
            entry
                .phonetics
                .into_iter()
                .filter_map(|p| p.text)
                .find(|t| !t.is_empty())
        })
        .unwrap_or_else(|| UNKNOWN.to_string());

    let meaning = entry.meanings.into_iter().next();

    let (part_of_speech, definitions, example_usage, synonyms) = match meaning {
        Some(meaning) => {
            let first = meaning.definitions.first();
            let example = first
                .and_then(|d| d.example.clone())
                .unwrap_or_else(|| NO_EXAMPLE.to_string());

            let mut synonyms: Vec<String> = first.map(|d| d.synonyms.clone()).unwrap_or_default();
            if synonyms.is_empty() {
                synonyms = meaning.synonyms;
            }
            synonyms.truncate(MAX_SYNONYMS);

            let definitions: Vec<String> = meaning
                .definitions
                .into_iter()
                .filter_map(|d| d.definition)
                .filter(|d| !d.trim().is_empty())
                .collect();

            (
                meaning
                    .part_of_speech
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                definitions,
                example,
                synonyms,
            )
        }
        None => (UNKNOWN.to_string(), Vec::new(), NO_EXAMPLE.to_string(), Vec::new()),
    };

    let definitions = if definitions.is_empty() {
        vec![NO_DEFINITION.to_string()]
    } else {
        definitions
    };

    let encoded = urlencoding::encode(term);
    BaseRecord {
        word: entry.word.unwrap_or_else(|| term.to_string()),
        pronunciation,
        part_of_speech,
        definitions,
        example_usage,
        synonyms,
        resources: vec![
            Resource::new(
                "Merriam-Webster",
                format!("https://www.merriam-webster.com/dictionary/{}", encoded),
            ),
            Resource::new(
                "Oxford Dictionary",
                format!(
                    "https://www.oxfordlearnersdictionaries.com/definition/english/{}",
                    encoded
                ),
            ),
        ],
        is_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<Entry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_map_full_entry() {
        let entries = parse(
            r#"[{
                "word": "serendipity",
                "phonetic": "/ˌsɛɹənˈdɪpɪti/",
                "meanings": [{
                    "partOfSpeech": "noun",
                    "definitions": [
                        {"definition": "A pleasant surprise.", "example": "It was pure serendipity.",
                         "synonyms": ["chance", "fluke", "luck", "fortune", "accident", "coincidence"]},
                        {"definition": "The faculty of making fortunate discoveries."}
                    ]
                }]
            }]"#,
        );
        let record = map_entry("serendipity", entries.into_iter().next().unwrap());
        assert_eq!(record.word, "serendipity");
        assert_eq!(record.pronunciation, "/ˌsɛɹənˈdɪpɪti/");
        assert_eq!(record.part_of_speech, "noun");
        assert_eq!(record.definitions.len(), 2);
        assert_eq!(record.example_usage, "It was pure serendipity.");
        assert_eq!(record.synonyms.len(), 5);
        assert_eq!(record.resources[0].title, "Merriam-Webster");
        assert!(!record.is_fallback);
    }

    #[test]
    fn test_map_sparse_entry() {
        let entries = parse(r#"[{"word": "zzz", "phonetics": [{"audio": ""}, {"text": "/z/"}]}]"#);
        let record = map_entry("zzz", entries.into_iter().next().unwrap());
        assert_eq!(record.pronunciation, "/z/");
        assert_eq!(record.part_of_speech, UNKNOWN);
        assert_eq!(record.definitions, [NO_DEFINITION]);
        assert_eq!(record.example_usage, NO_EXAMPLE);
        assert!(record.synonyms.is_empty());
    }

    #[test]
    fn test_meaning_level_synonyms_used_when_definition_has_none() {
        let entries = parse(
            r#"[{"word": "fast", "meanings": [{"partOfSpeech": "adjective",
                "definitions": [{"definition": "Moving quickly."}],
                "synonyms": ["quick", "rapid"]}]}]"#,
        );
        let record = map_entry("fast", entries.into_iter().next().unwrap());
        assert_eq!(record.synonyms, ["quick", "rapid"]);
        assert_eq!(record.pronunciation, UNKNOWN);
    }

    #[test]
    fn test_resource_urls_are_encoded() {
        let entries = parse(r#"[{"word": "ice cream"}]"#);
        let record = map_entry("ice cream", entries.into_iter().next().unwrap());
        assert_eq!(
            record.resources[0].url,
            "https://www.merriam-webster.com/dictionary/ice%20cream"
        );
    }
}
