use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::models::similarity_report::ExternalMatch;
use crate::utils::sequence::sequence_ratio;

/// Looks a chunk of text up on the web and reports at most one source for it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, chunk: &str) -> Result<Option<ExternalMatch>>;
}

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Clone)]
pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchClient {
    pub fn new(api_key: String, engine_id: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            engine_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, chunk: &str) -> Result<Option<ExternalMatch>> {
        let query = format!("\"{}\"", chunk.replace('"', ""));
        let url = Url::parse_with_params(
            GOOGLE_CSE_URL,
            &[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query.as_str()),
                ("num", "3"),
            ],
        )
        .map_err(|e| Error::Internal(format!("invalid search url: {}", e)))?;

        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Collaborator(format!(
                "search status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body: SearchResponse = res.json().await?;
        Ok(best_match(chunk, body.items))
    }
}

/// Scores each hit's snippet against the chunk and keeps the closest one.
fn best_match(chunk: &str, items: Vec<SearchItem>) -> Option<ExternalMatch> {
    let needle = normalize(chunk);
    items
        .into_iter()
        .filter(|item| !item.link.is_empty())
        .map(|item| {
            let score = sequence_ratio(&needle, &normalize(&item.snippet));
            ExternalMatch {
                source_id: item.link,
                source_title: item.title,
                matched_text: chunk.to_string(),
                similarity_score: score,
            }
        })
        .max_by(|a, b| a.similarity_score.total_cmp(&b.similarity_score))
}

// snippets are whitespace-collapsed and may carry ellipses
fn normalize(text: &str) -> String {
    text.replace('\u{2026}', " ")
        .replace("...", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
