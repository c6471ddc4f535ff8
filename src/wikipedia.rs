//! Wikipedia REST summary adapter.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::LookupConfig;
use crate::models::WikipediaSummary;
use crate::traits::SummarySource;

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    #[serde(default)]
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    #[serde(default)]
    page: Option<String>,
}

pub struct WikipediaApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WikipediaApi {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.wikipedia_url.trim_end_matches('/').to_string(),
            timeout: config.wikipedia_timeout(),
        })
    }

    async fn request(&self, term: &str) -> Result<Summary> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(term));
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Wikipedia API returned {}", status);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SummarySource for WikipediaApi {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn fetch(&self, term: &str) -> Option<WikipediaSummary> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        match tokio::time::timeout(self.timeout, self.request(term)).await {
            Ok(Ok(summary)) => to_summary(term, summary),
            Ok(Err(e)) => {
                tracing::debug!(term, error = %e, "wikipedia lookup failed");
                None
            }
            Err(_) => {
                tracing::debug!(term, "wikipedia lookup timed out");
                None
            }
        }
    }
}

/// A summary is only useful with a non-empty extract.
fn to_summary(term: &str, summary: Summary) -> Option<WikipediaSummary> {
    let extract = summary.extract.filter(|e| !e.trim().is_empty())?;
    let url = summary
        .content_urls
        .and_then(|c| c.desktop)
        .and_then(|d| d.page)
        .unwrap_or_else(|| format!("https://en.wikipedia.org/wiki/{}", urlencoding::encode(term)));

    Some(WikipediaSummary {
        title: summary.title.unwrap_or_else(|| term.to_string()),
        extract,
        url,
    })
}
