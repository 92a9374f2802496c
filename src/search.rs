//! SerpAPI client for news and image search.
//!
//! News search is scoped to the past day and sorted by date; image search is
//! used by the image resolver to look for a full-size picture per article.
//! Both share one `reqwest::Client` with no timeout.

use crate::config::Config;
use crate::error::{NewsError, Result};
use crate::models::{text_field, Article};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

/// Past day, sorted by date.
const NEWS_TIME_FILTER: &str = "qdr:d,sbd:1";
const LANGUAGE: &str = "en";
const COUNTRY: &str = "us";
const SAFE_SEARCH: &str = "active";
/// Image results requested per high-res lookup.
const IMAGE_RESULTS: &str = "5";

#[derive(Debug, Clone)]
pub struct Searcher {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl Searcher {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint.clone(),
            api_key: config.serpapi_api_key.clone(),
        }
    }

    /// Fetch up to `count` recent news articles for `topic`.
    ///
    /// Never fails: transport and decoding errors are logged and produce an
    /// empty list.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_news(&self, topic: &str, count: u32) -> Vec<Article> {
        match self.search_news(topic, count).await {
            Ok(articles) => {
                info!(count = articles.len(), "Fetched news articles");
                articles
            }
            Err(e) => {
                error!(error = %e, "News search failed; continuing with no articles");
                Vec::new()
            }
        }
    }

    /// Run the news search, surfacing failures to the caller.
    pub async fn search_news(&self, topic: &str, count: u32) -> Result<Vec<Article>> {
        let num = count.to_string();
        let query = format!("{topic} news");
        let body = self
            .get(&[
                ("engine", "google"),
                ("q", query.as_str()),
                ("tbm", "nws"),
                ("num", num.as_str()),
                ("tbs", NEWS_TIME_FILTER),
                ("hl", LANGUAGE),
                ("gl", COUNTRY),
                ("safe", SAFE_SEARCH),
            ])
            .await?;

        let articles = results_array(&body, "news_results")
            .iter()
            .take(count as usize)
            .map(Article::from_news_result)
            .collect();
        Ok(articles)
    }

    /// Return image URLs for `query`, at most `limit` of them.
    ///
    /// Each result contributes its full-size `original` URL, or its `link`
    /// when no original is given. Preview `thumbnail`s are never used.
    pub async fn search_images(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let body = self
            .get(&[
                ("engine", "google"),
                ("q", query),
                ("tbm", "isch"),
                ("num", IMAGE_RESULTS),
                ("ijn", "0"),
                ("hl", LANGUAGE),
                ("gl", COUNTRY),
                ("safe", SAFE_SEARCH),
            ])
            .await?;

        let urls = results_array(&body, "images_results")
            .iter()
            .take(limit)
            .filter_map(|r| text_field(r, "original").or_else(|| text_field(r, "link")))
            .collect();
        Ok(urls)
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&text, 300),
            });
        }
        debug!(bytes = text.len(), "Search response received");
        Ok(serde_json::from_str(&text)?)
    }
}

/// The array under `key`, or an empty slice if absent or not an array.
fn results_array<'a>(body: &'a Value, key: &str) -> &'a [Value] {
    body.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
